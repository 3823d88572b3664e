//! Per-platform metric summaries for a reporting period

use crate::platforms::active_platforms;
use delidash_common::{MetricKind, MetricValues, Period, SalesDataset};
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Which metrics a summary covers: all four or a single kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MetricSelector {
    All,
    One(MetricKind),
}

impl MetricSelector {
    /// The metric kinds covered, in canonical column order
    pub fn kinds(self) -> Vec<MetricKind> {
        match self {
            MetricSelector::All => MetricKind::ALL.to_vec(),
            MetricSelector::One(kind) => vec![kind],
        }
    }
}

/// Summed metrics of one platform over a period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformSummary {
    pub platform: String,
    pub values: MetricValues,
}

/// Summary of one period across its active platforms.
///
/// Rows always carry all four summed metrics; the selector governs
/// which platforms are listed. A single-metric summary omits platforms
/// whose selected metric sums to zero, while an all-metric summary
/// keeps them as zero rows. Totals cover every active platform either
/// way.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub period: Period,
    pub selector: MetricSelector,
    pub rows: Vec<PlatformSummary>,
    pub totals: MetricValues,
}

#[instrument(skip(dataset), fields(period = %period.label()))]
pub fn summarize(dataset: &SalesDataset, period: Period, selector: MetricSelector) -> SummaryTable {
    let platforms = active_platforms(&dataset.schema, &period);

    let mut sums: HashMap<&str, MetricValues> = platforms
        .iter()
        .map(|platform| (platform.as_str(), MetricValues::default()))
        .collect();
    for record in dataset.records_in(&period) {
        for (platform, values) in &record.platforms {
            // Platforms outside the active set, like stale retired
            // columns, are not counted
            if let Some(sum) = sums.get_mut(platform.as_str()) {
                sum.add(values);
            }
        }
    }

    let mut totals = MetricValues::default();
    let mut rows = Vec::new();
    for platform in &platforms {
        let values = sums.remove(platform.as_str()).unwrap_or_default();
        totals.add(&values);
        let include = match selector {
            MetricSelector::All => true,
            MetricSelector::One(kind) => values.get(kind) != 0.0,
        };
        if include {
            rows.push(PlatformSummary {
                platform: platform.clone(),
                values,
            });
        }
    }
    debug!(platforms = rows.len(), "summarized period");

    SummaryTable {
        period,
        selector,
        rows,
        totals,
    }
}

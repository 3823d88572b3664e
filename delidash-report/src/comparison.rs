//! Difference and growth between two summarized periods

use crate::summary::SummaryTable;
use delidash_common::{MetricKind, MetricValues, Period};
use serde::Serialize;

/// One metric compared across the two periods.
///
/// `difference` is comparison minus primary. Growth is the comparison
/// value relative to the primary, as a percentage; when the primary is
/// zero it is zero by convention rather than an error. Values are kept
/// at full precision, rounding happens at render time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricDelta {
    pub primary: f64,
    pub comparison: f64,
    pub difference: f64,
    pub growth_pct: f64,
}

impl MetricDelta {
    pub fn new(primary: f64, comparison: f64) -> Self {
        let difference = comparison - primary;
        let growth_pct = if primary == 0.0 {
            0.0
        } else {
            (comparison / primary - 1.0) * 100.0
        };
        Self {
            primary,
            comparison,
            difference,
            growth_pct,
        }
    }
}

/// One platform's summed metrics in both periods
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub platform: String,
    pub primary: MetricValues,
    pub comparison: MetricValues,
}

impl ComparisonRow {
    /// Delta of one metric for this platform
    pub fn delta(&self, kind: MetricKind) -> MetricDelta {
        MetricDelta::new(self.primary.get(kind), self.comparison.get(kind))
    }
}

/// Two periods aligned platform by platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub primary_period: Period,
    pub comparison_period: Period,
    pub rows: Vec<ComparisonRow>,
    pub primary_totals: MetricValues,
    pub comparison_totals: MetricValues,
}

impl ComparisonTable {
    /// Delta of one metric across all platforms
    pub fn total_delta(&self, kind: MetricKind) -> MetricDelta {
        MetricDelta::new(
            self.primary_totals.get(kind),
            self.comparison_totals.get(kind),
        )
    }
}

/// Align two summaries by platform.
///
/// The row set is the union of both summaries' platforms; a platform
/// listed on only one side reads as zero on the other. Which platforms
/// are listed at all is decided by the summaries themselves, so a
/// single-metric pair carries only platforms with activity somewhere.
pub fn compare(primary: &SummaryTable, comparison: &SummaryTable) -> ComparisonTable {
    let mut platforms: Vec<String> = primary
        .rows
        .iter()
        .chain(comparison.rows.iter())
        .map(|row| row.platform.clone())
        .collect();
    platforms.sort();
    platforms.dedup();

    let values_for = |table: &SummaryTable, platform: &str| {
        table
            .rows
            .iter()
            .find(|row| row.platform == platform)
            .map(|row| row.values)
            .unwrap_or_default()
    };
    let rows = platforms
        .into_iter()
        .map(|platform| {
            let primary_values = values_for(primary, &platform);
            let comparison_values = values_for(comparison, &platform);
            ComparisonRow {
                platform,
                primary: primary_values,
                comparison: comparison_values,
            }
        })
        .collect();

    ComparisonTable {
        primary_period: primary.period,
        comparison_period: comparison.period,
        rows,
        primary_totals: primary.totals,
        comparison_totals: comparison.totals,
    }
}

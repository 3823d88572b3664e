//! Reporting period derivation
//!
//! A month is selectable only when at least one metric column sums to a
//! strictly positive value over its records. Months that exist in the
//! sheet but carry nothing but zeros never appear in the picker.

use delidash_common::{ComparisonBasis, MetricKind, MetricValues, Month, SalesDataset};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Months with activity, ascending
pub fn valid_months(dataset: &SalesDataset) -> Vec<Month> {
    let mut sums: BTreeMap<Month, HashMap<&str, MetricValues>> = BTreeMap::new();
    for record in &dataset.records {
        let month = sums.entry(record.month()).or_default();
        for (platform, values) in &record.platforms {
            month.entry(platform.as_str()).or_default().add(values);
        }
    }

    let months: Vec<Month> = sums
        .into_iter()
        .filter(|(_, platforms)| platforms.values().any(has_positive_column))
        .map(|(month, _)| month)
        .collect();
    debug!(months = months.len(), "derived valid months");
    months
}

/// Default selection: the most recent month with activity
pub fn latest_valid_month(dataset: &SalesDataset) -> Option<Month> {
    valid_months(dataset).pop()
}

/// Pick the comparison month for a primary month under the configured
/// default. Only months from `valid` are ever returned, so the caller
/// cannot end up comparing against a month with no data.
pub fn resolve_comparison(
    valid: &[Month],
    primary: Month,
    basis: ComparisonBasis,
) -> Option<Month> {
    match basis {
        ComparisonBasis::None => None,
        ComparisonBasis::PreviousMonth => {
            valid.iter().copied().filter(|month| *month < primary).max()
        }
        ComparisonBasis::SameMonthLastYear => {
            let target = primary.previous_year();
            valid.contains(&target).then_some(target)
        }
    }
}

fn has_positive_column(values: &MetricValues) -> bool {
    MetricKind::ALL.into_iter().any(|kind| values.get(kind) > 0.0)
}

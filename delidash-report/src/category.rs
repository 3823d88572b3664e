//! Category ranking within a period

use crate::platforms::active_platforms;
use delidash_common::{MetricKind, Period, SalesDataset};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// One category's summed value over the period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: String,
    pub value: f64,
}

/// Categories ranked by one metric, highest first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRanking {
    pub period: Period,
    pub metric: MetricKind,
    pub rows: Vec<CategoryRow>,
    /// Sum over every categorized record, including rows cut by the limit
    pub total: f64,
}

/// Rank menu categories by a metric summed across the active platforms.
///
/// Records without a category are left out, as are categories summing
/// to exactly zero. Ties rank alphabetically so the order is stable.
pub fn category_ranking(
    dataset: &SalesDataset,
    period: Period,
    metric: MetricKind,
    limit: usize,
) -> CategoryRanking {
    let platforms = active_platforms(&dataset.schema, &period);

    let mut sums: HashMap<String, f64> = HashMap::new();
    for record in dataset.records_in(&period) {
        let category = match record.category.as_deref() {
            Some(category) if !category.is_empty() => category,
            _ => continue,
        };
        let mut value = 0.0;
        for platform in &platforms {
            value += record.value(platform, metric);
        }
        *sums.entry(category.to_string()).or_insert(0.0) += value;
    }

    let total = sums.values().sum();
    let mut rows: Vec<CategoryRow> = sums
        .into_iter()
        .filter(|(_, value)| *value != 0.0)
        .map(|(category, value)| CategoryRow { category, value })
        .collect();
    rows.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    rows.truncate(limit);
    debug!(categories = rows.len(), "ranked categories");

    CategoryRanking {
        period,
        metric,
        rows,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use delidash_common::{MetricValues, Month, SalesRecord, SchemaColumn, SheetSchema};

    fn record(day: u32, category: Option<&str>, values: &[(&str, f64)]) -> SalesRecord {
        let mut platforms = HashMap::new();
        for (platform, gross_sales) in values {
            platforms.insert(
                platform.to_string(),
                MetricValues {
                    gross_sales: *gross_sales,
                    ..MetricValues::default()
                },
            );
        }
        SalesRecord {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            category: category.map(str::to_string),
            platforms,
        }
    }

    fn dataset(platforms: &[&str], records: Vec<SalesRecord>) -> SalesDataset {
        let columns = platforms
            .iter()
            .enumerate()
            .map(|(index, platform)| SchemaColumn {
                platform: platform.to_string(),
                kind: MetricKind::GrossSales,
                index: index + 1,
            })
            .collect();
        SalesDataset::new(SheetSchema::new(0, Some(1), columns), records)
    }

    #[test]
    fn test_ranking_is_descending() {
        let data = dataset(
            &["uber", "wolt"],
            vec![
                record(1, Some("からあげ"), &[("uber", 300.0), ("wolt", 100.0)]),
                record(2, Some("カレー"), &[("uber", 900.0)]),
                record(3, Some("からあげ"), &[("uber", 100.0)]),
                record(4, Some("サラダ"), &[("wolt", 50.0)]),
            ],
        );

        let ranking = category_ranking(
            &data,
            Period::Month(Month::new(2024, 5)),
            MetricKind::GrossSales,
            10,
        );

        let names: Vec<&str> = ranking
            .rows
            .iter()
            .map(|row| row.category.as_str())
            .collect();
        assert_eq!(names, ["カレー", "からあげ", "サラダ"]);
        assert_eq!(ranking.rows[1].value, 500.0);
        assert_eq!(ranking.total, 1450.0);
    }

    #[test]
    fn test_limit_truncates_but_total_does_not_shrink() {
        let data = dataset(
            &["uber"],
            vec![
                record(1, Some("a"), &[("uber", 30.0)]),
                record(2, Some("b"), &[("uber", 20.0)]),
                record(3, Some("c"), &[("uber", 10.0)]),
            ],
        );
        let ranking = category_ranking(
            &data,
            Period::Month(Month::new(2024, 5)),
            MetricKind::GrossSales,
            2,
        );
        assert_eq!(ranking.rows.len(), 2);
        assert_eq!(ranking.total, 60.0);
    }

    #[test]
    fn test_uncategorized_and_zero_categories_left_out() {
        let data = dataset(
            &["uber"],
            vec![
                record(1, None, &[("uber", 500.0)]),
                record(2, Some("からあげ"), &[("uber", 100.0)]),
                record(3, Some("ゼロ"), &[("uber", 0.0)]),
            ],
        );
        let ranking = category_ranking(
            &data,
            Period::Month(Month::new(2024, 5)),
            MetricKind::GrossSales,
            10,
        );
        assert_eq!(ranking.rows.len(), 1);
        assert_eq!(ranking.rows[0].category, "からあげ");
        assert_eq!(ranking.total, 100.0);
    }

    #[test]
    fn test_retired_platform_excluded_from_category_sums() {
        let data = dataset(
            &["menu", "uber"],
            vec![SalesRecord {
                date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
                category: Some("からあげ".to_string()),
                platforms: {
                    let mut platforms = HashMap::new();
                    platforms.insert(
                        "menu".to_string(),
                        MetricValues {
                            gross_sales: 400.0,
                            ..MetricValues::default()
                        },
                    );
                    platforms.insert(
                        "uber".to_string(),
                        MetricValues {
                            gross_sales: 100.0,
                            ..MetricValues::default()
                        },
                    );
                    platforms
                },
            }],
        );
        let ranking = category_ranking(
            &data,
            Period::Month(Month::new(2024, 12)),
            MetricKind::GrossSales,
            10,
        );
        assert_eq!(ranking.rows[0].value, 100.0);
    }

    #[test]
    fn test_ties_rank_alphabetically() {
        let data = dataset(
            &["uber"],
            vec![
                record(1, Some("b"), &[("uber", 10.0)]),
                record(2, Some("a"), &[("uber", 10.0)]),
            ],
        );
        let ranking = category_ranking(
            &data,
            Period::Month(Month::new(2024, 5)),
            MetricKind::GrossSales,
            10,
        );
        assert_eq!(ranking.rows[0].category, "a");
        assert_eq!(ranking.rows[1].category, "b");
    }
}

//! Active platform resolution

use delidash_common::{Month, Period, SheetSchema};

/// Delivery service that shut down; its columns linger in the sheet
pub const RETIRED_PLATFORM: &str = "menu";

/// Last month the retired platform's figures count. The service ended
/// in autumn 2024, and any values recorded in its columns for later
/// periods are stale entries to be ignored, not reported.
pub const RETIRED_PLATFORM_FINAL_MONTH: Month = Month {
    year: 2024,
    month: 10,
};

/// Platforms reportable for a period, in the schema's sorted order
pub fn active_platforms(schema: &SheetSchema, period: &Period) -> Vec<String> {
    schema
        .platforms()
        .iter()
        .filter(|platform| !is_retired(platform, period))
        .cloned()
        .collect()
}

fn is_retired(platform: &str, period: &Period) -> bool {
    platform.eq_ignore_ascii_case(RETIRED_PLATFORM)
        && period.starts_after(RETIRED_PLATFORM_FINAL_MONTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use delidash_common::{MetricKind, SchemaColumn};

    fn schema_with(platforms: &[&str]) -> SheetSchema {
        let columns = platforms
            .iter()
            .enumerate()
            .map(|(index, platform)| SchemaColumn {
                platform: platform.to_string(),
                kind: MetricKind::GrossSales,
                index: index + 1,
            })
            .collect();
        SheetSchema::new(0, None, columns)
    }

    #[test]
    fn test_retired_platform_dropped_after_final_month() {
        let schema = schema_with(&["menu", "uber", "wolt"]);

        let november = Period::Month(Month::new(2024, 11));
        assert_eq!(
            active_platforms(&schema, &november),
            ["uber".to_string(), "wolt".to_string()]
        );

        let next_year = Period::Month(Month::new(2025, 3));
        assert_eq!(
            active_platforms(&schema, &next_year),
            ["uber".to_string(), "wolt".to_string()]
        );
    }

    #[test]
    fn test_retired_platform_kept_through_final_month() {
        let schema = schema_with(&["menu", "uber"]);

        for month in [Month::new(2024, 9), Month::new(2024, 10)] {
            assert_eq!(
                active_platforms(&schema, &Period::Month(month)),
                ["menu".to_string(), "uber".to_string()]
            );
        }
    }

    #[test]
    fn test_range_straddling_the_cutoff_keeps_the_platform() {
        let schema = schema_with(&["menu", "uber"]);
        let straddling = Period::Range {
            start: NaiveDate::from_ymd_opt(2024, 10, 25).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 11, 5).unwrap(),
        };
        assert!(active_platforms(&schema, &straddling).contains(&"menu".to_string()));

        let after = Period::Range {
            start: NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 11, 30).unwrap(),
        };
        assert!(!active_platforms(&schema, &after).contains(&"menu".to_string()));
    }

    #[test]
    fn test_other_platforms_unaffected() {
        let schema = schema_with(&["uber", "wolt"]);
        let far_future = Period::Month(Month::new(2030, 1));
        assert_eq!(active_platforms(&schema, &far_future).len(), 2);
    }
}

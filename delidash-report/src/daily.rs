//! Daily breakdown of one metric with weekday, weather and holiday
//! annotations

use crate::platforms::active_platforms;
use chrono::NaiveDate;
use delidash_common::{weekday_label, MetricKind, Period, SalesDataset};
use delidash_data::{HolidayProvider, WeatherObservation, WeatherProvider};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// One platform's value on one day
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayCell {
    pub platform: String,
    pub value: f64,
    /// First day reaching this platform column's maximum
    pub is_max: bool,
    /// First day reaching this platform column's minimum
    pub is_min: bool,
}

/// One calendar day of the breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayRow {
    pub date: NaiveDate,
    /// One of the seven Japanese weekday labels
    pub weekday: &'static str,
    pub cells: Vec<DayCell>,
    pub total: f64,
    pub weather: Option<WeatherObservation>,
    pub holiday: Option<String>,
}

/// Daily values of one metric over a period, one row per distinct date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBreakdown {
    pub period: Period,
    pub metric: MetricKind,
    pub platforms: Vec<String>,
    pub rows: Vec<DayRow>,
}

/// Build the day-by-day view of one metric.
///
/// Only dates present in the data produce rows; days the sheet does not
/// mention are absent, not zero rows. Rows come out in date order with
/// the weather and holiday slots empty, to be filled by [`enrich`].
#[instrument(skip(dataset), fields(period = %period.label()))]
pub fn daily_breakdown(dataset: &SalesDataset, period: Period, metric: MetricKind) -> DailyBreakdown {
    let platforms = active_platforms(&dataset.schema, &period);

    let mut days: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
    for record in dataset.records_in(&period) {
        let values = days
            .entry(record.date)
            .or_insert_with(|| vec![0.0; platforms.len()]);
        for (index, platform) in platforms.iter().enumerate() {
            values[index] += record.value(platform, metric);
        }
    }

    let mut rows: Vec<DayRow> = days
        .into_iter()
        .map(|(date, values)| {
            let total = values.iter().sum();
            let cells = platforms
                .iter()
                .zip(values)
                .map(|(platform, value)| DayCell {
                    platform: platform.clone(),
                    value,
                    is_max: false,
                    is_min: false,
                })
                .collect();
            DayRow {
                date,
                weekday: weekday_label(date),
                cells,
                total,
                weather: None,
                holiday: None,
            }
        })
        .collect();

    mark_extremes(&mut rows);
    debug!(days = rows.len(), "built daily breakdown");

    DailyBreakdown {
        period,
        metric,
        platforms,
        rows,
    }
}

/// Mark each platform column's maximum and minimum, independently per
/// column. Ties go to the earliest day, and a constant column marks its
/// first day as both.
fn mark_extremes(rows: &mut [DayRow]) {
    let columns = rows.first().map(|row| row.cells.len()).unwrap_or(0);
    for column in 0..columns {
        let mut max_at = 0usize;
        let mut max_value = f64::NEG_INFINITY;
        let mut min_at = 0usize;
        let mut min_value = f64::INFINITY;
        for (index, row) in rows.iter().enumerate() {
            let value = row.cells[column].value;
            if value > max_value {
                max_value = value;
                max_at = index;
            }
            if value < min_value {
                min_value = value;
                min_at = index;
            }
        }
        rows[max_at].cells[column].is_max = true;
        rows[min_at].cells[column].is_min = true;
    }
}

/// Fill the weather and holiday slots of every row.
///
/// Both providers are best effort: a failed or empty lookup leaves the
/// slot blank and the breakdown is still usable.
pub async fn enrich(
    breakdown: &mut DailyBreakdown,
    weather: &dyn WeatherProvider,
    holidays: &dyn HolidayProvider,
) {
    for row in &mut breakdown.rows {
        let (observation, holiday) =
            futures::future::join(weather.lookup(row.date), holidays.lookup(row.date)).await;
        row.weather = observation;
        row.holiday = holiday;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use delidash_common::{MetricValues, Month, SalesRecord, SchemaColumn, SheetSchema};
    use delidash_data::{NoHolidays, NoWeather, StaticHolidayProvider, StaticWeatherProvider};
    use std::collections::HashMap;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn record(day: NaiveDate, values: &[(&str, f64)]) -> SalesRecord {
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
            date: day,
            category: None,
            platforms,
        }
    }

    fn may_dataset() -> SalesDataset {
        let columns = vec![
            SchemaColumn {
                platform: "uber".to_string(),
                kind: MetricKind::GrossSales,
                index: 1,
            },
            SchemaColumn {
                platform: "wolt".to_string(),
                kind: MetricKind::GrossSales,
                index: 2,
            },
        ];
        SalesDataset::new(
            SheetSchema::new(0, None, columns),
            vec![
                record(date(2024, 5, 1), &[("uber", 100.0), ("wolt", 40.0)]),
                record(date(2024, 5, 3), &[("uber", 250.0), ("wolt", 10.0)]),
                // Second record on the same day, summed into one row
                record(date(2024, 5, 3), &[("uber", 50.0)]),
                record(date(2024, 5, 5), &[("uber", 80.0), ("wolt", 40.0)]),
            ],
        )
    }

    #[test]
    fn test_one_row_per_distinct_date() {
        let breakdown = daily_breakdown(
            &may_dataset(),
            Period::Month(Month::new(2024, 5)),
            MetricKind::GrossSales,
        );

        let dates: Vec<NaiveDate> = breakdown.rows.iter().map(|row| row.date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 5, 1), date(2024, 5, 3), date(2024, 5, 5)]
        );

        let may_3 = &breakdown.rows[1];
        assert_eq!(may_3.cells[0].value, 300.0);
        assert_eq!(may_3.total, 310.0);
    }

    #[test]
    fn test_weekday_labels() {
        let breakdown = daily_breakdown(
            &may_dataset(),
            Period::Month(Month::new(2024, 5)),
            MetricKind::GrossSales,
        );
        // 2024-05-01 was a Wednesday, 2024-05-05 a Sunday
        assert_eq!(breakdown.rows[0].weekday, "水");
        assert_eq!(breakdown.rows[2].weekday, "日");
    }

    #[test]
    fn test_extreme_markers_per_column() {
        let breakdown = daily_breakdown(
            &may_dataset(),
            Period::Month(Month::new(2024, 5)),
            MetricKind::GrossSales,
        );

        let column = |index: usize| -> Vec<(bool, bool)> {
            breakdown
                .rows
                .iter()
                .map(|row| (row.cells[index].is_max, row.cells[index].is_min))
                .collect()
        };

        // uber: 100, 300, 80
        assert_eq!(column(0), vec![(false, false), (true, false), (false, true)]);
        // wolt: 40, 10, 40 — tie for maximum goes to the first day
        assert_eq!(column(1), vec![(true, false), (false, true), (false, false)]);
    }

    #[test]
    fn test_constant_column_marks_first_day_twice() {
        let columns = vec![SchemaColumn {
            platform: "uber".to_string(),
            kind: MetricKind::GrossSales,
            index: 1,
        }];
        let data = SalesDataset::new(
            SheetSchema::new(0, None, columns),
            vec![
                record(date(2024, 5, 1), &[("uber", 0.0)]),
                record(date(2024, 5, 2), &[("uber", 0.0)]),
            ],
        );
        let breakdown = daily_breakdown(
            &data,
            Period::Month(Month::new(2024, 5)),
            MetricKind::GrossSales,
        );
        assert!(breakdown.rows[0].cells[0].is_max);
        assert!(breakdown.rows[0].cells[0].is_min);
        assert!(!breakdown.rows[1].cells[0].is_max);
        assert!(!breakdown.rows[1].cells[0].is_min);
    }

    #[test]
    fn test_empty_period_has_no_rows() {
        let breakdown = daily_breakdown(
            &may_dataset(),
            Period::Month(Month::new(2023, 8)),
            MetricKind::GrossSales,
        );
        assert!(breakdown.rows.is_empty());
    }

    #[tokio::test]
    async fn test_enrich_fills_available_annotations() {
        let mut breakdown = daily_breakdown(
            &may_dataset(),
            Period::Month(Month::new(2024, 5)),
            MetricKind::GrossSales,
        );

        let weather = StaticWeatherProvider::new().with(
            date(2024, 5, 1),
            WeatherObservation {
                condition: Some("晴れ".to_string()),
                tmax: Some(21.0),
                tmin: Some(11.0),
                tavg: Some(16.0),
            },
        );
        let holidays = StaticHolidayProvider::new().with(date(2024, 5, 3), "憲法記念日");

        enrich(&mut breakdown, &weather, &holidays).await;

        assert_eq!(
            breakdown.rows[0].weather.as_ref().unwrap().condition.as_deref(),
            Some("晴れ")
        );
        assert_eq!(breakdown.rows[0].holiday, None);
        assert_eq!(breakdown.rows[1].weather, None);
        assert_eq!(breakdown.rows[1].holiday.as_deref(), Some("憲法記念日"));
    }

    #[tokio::test]
    async fn test_enrich_with_no_providers_leaves_slots_empty() {
        let mut breakdown = daily_breakdown(
            &may_dataset(),
            Period::Month(Month::new(2024, 5)),
            MetricKind::GrossSales,
        );
        enrich(&mut breakdown, &NoWeather, &NoHolidays).await;

        assert!(breakdown
            .rows
            .iter()
            .all(|row| row.weather.is_none() && row.holiday.is_none()));
    }
}

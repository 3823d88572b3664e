//! End-to-end reporting scenarios over an in-memory dataset

use chrono::NaiveDate;
use delidash_common::{
    MetricKind, MetricValues, Month, Period, SalesDataset, SalesRecord, SchemaColumn, SheetSchema,
};
use delidash_data::{StaticHolidayProvider, StaticWeatherProvider, WeatherObservation};
use delidash_report::{
    active_platforms, compare, daily_breakdown, enrich, summarize, valid_months, MetricSelector,
};
use std::collections::HashMap;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn record(day: NaiveDate, values: &[(&str, f64)]) -> SalesRecord {
    let mut platforms = HashMap::new();
    for (platform, net_sales) in values {
        platforms.insert(
            platform.to_string(),
            MetricValues {
                net_sales: *net_sales,
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

fn dataset(platforms: &[&str], records: Vec<SalesRecord>) -> SalesDataset {
    let columns = platforms
        .iter()
        .enumerate()
        .map(|(index, platform)| SchemaColumn {
            platform: platform.to_string(),
            kind: MetricKind::NetSales,
            index: index + 1,
        })
        .collect();
    SalesDataset::new(SheetSchema::new(0, None, columns), records)
}

/// Two months of Uber and Wolt activity as one dataset
fn spring_dataset() -> SalesDataset {
    dataset(
        &["uber", "wolt"],
        vec![
            record(date(2024, 4, 10), &[("uber", 150.0)]),
            record(date(2024, 5, 2), &[("uber", 100.0), ("wolt", 50.0)]),
            record(date(2024, 5, 9), &[("uber", 200.0), ("wolt", 0.0)]),
        ],
    )
}

#[test]
fn summarize_then_compare_two_months() {
    let data = spring_dataset();
    let may = Period::Month(Month::new(2024, 5));
    let april = Period::Month(Month::new(2024, 4));

    let may_summary = summarize(&data, may, MetricSelector::All);
    let uber = &may_summary.rows[0];
    assert_eq!(uber.platform, "uber");
    assert_eq!(uber.values.net_sales, 300.0);
    let wolt = &may_summary.rows[1];
    assert_eq!(wolt.values.net_sales, 50.0);

    let april_summary = summarize(&data, april, MetricSelector::All);
    let table = compare(&may_summary, &april_summary);

    let uber = table.rows.iter().find(|row| row.platform == "uber").unwrap();
    let delta = uber.delta(MetricKind::NetSales);
    assert_eq!(delta.difference, -150.0);
    assert_eq!(delta.growth_pct, -50.0);
}

#[test]
fn summary_does_not_depend_on_row_order() {
    let mut shuffled = spring_dataset();
    shuffled.records.reverse();
    let may = Period::Month(Month::new(2024, 5));

    assert_eq!(
        summarize(&spring_dataset(), may, MetricSelector::All),
        summarize(&shuffled, may, MetricSelector::All)
    );
}

#[test]
fn months_without_activity_never_become_selectable() {
    let data = dataset(
        &["uber"],
        vec![
            record(date(2023, 7, 15), &[("uber", 10.0)]),
            // August 2023 exists only as zero rows
            record(date(2023, 8, 1), &[("uber", 0.0)]),
            record(date(2023, 9, 1), &[("uber", 20.0)]),
        ],
    );

    let months = valid_months(&data);
    assert!(!months.contains(&Month::new(2023, 8)));
    assert_eq!(months, vec![Month::new(2023, 7), Month::new(2023, 9)]);
}

#[test]
fn retired_platform_ignored_in_december_even_with_data() {
    let data = dataset(
        &["menu", "uber"],
        vec![record(
            date(2024, 12, 10),
            &[("menu", 500.0), ("uber", 100.0)],
        )],
    );
    let december = Period::Month(Month::new(2024, 12));

    assert_eq!(
        active_platforms(&data.schema, &december),
        ["uber".to_string()]
    );

    let summary = summarize(&data, december, MetricSelector::All);
    assert!(summary.rows.iter().all(|row| row.platform != "menu"));
    assert_eq!(summary.totals.net_sales, 100.0);
}

#[test]
fn daily_rows_match_distinct_dates() {
    let data = dataset(
        &["uber"],
        vec![
            record(date(2024, 5, 1), &[("uber", 10.0)]),
            record(date(2024, 5, 1), &[("uber", 20.0)]),
            record(date(2024, 5, 7), &[("uber", 30.0)]),
        ],
    );
    let breakdown = daily_breakdown(
        &data,
        Period::Month(Month::new(2024, 5)),
        MetricKind::NetSales,
    );

    assert_eq!(breakdown.rows.len(), 2);
    assert_eq!(breakdown.rows[0].cells[0].value, 30.0);
}

#[tokio::test]
async fn daily_breakdown_with_annotations() {
    let data = spring_dataset();
    let mut breakdown = daily_breakdown(
        &data,
        Period::Month(Month::new(2024, 5)),
        MetricKind::NetSales,
    );

    let weather = StaticWeatherProvider::new().with(
        date(2024, 5, 2),
        WeatherObservation {
            condition: Some("くもり".to_string()),
            tmax: Some(19.0),
            tmin: Some(9.0),
            tavg: Some(14.0),
        },
    );
    let holidays = StaticHolidayProvider::new().with(date(2024, 5, 9), "テスト休業日");

    enrich(&mut breakdown, &weather, &holidays).await;

    assert_eq!(
        breakdown.rows[0].weather.as_ref().and_then(|w| w.tavg),
        Some(14.0)
    );
    assert_eq!(breakdown.rows[0].holiday, None);
    assert_eq!(breakdown.rows[1].weather, None);
    assert_eq!(breakdown.rows[1].holiday.as_deref(), Some("テスト休業日"));
}

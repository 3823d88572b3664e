//! Plain-text rendering of report tables
//!
//! Values are rounded and marked here only; everything upstream stays
//! at full precision.

use delidash_common::Month;
use delidash_report::{
    CategoryRanking, ComparisonTable, DailyBreakdown, DayCell, DayRow, MetricSelector,
    SummaryTable,
};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

type RenderResult = Result<String, std::fmt::Error>;

/// List of selectable months, newest last
pub fn period_list(months: &[Month]) -> RenderResult {
    let mut out = String::new();
    writeln!(out, "対象月 ({}件)", months.len())?;
    for month in months {
        writeln!(out, "  {}", month)?;
    }
    Ok(out)
}

/// Platform totals, one column per selected metric
pub fn summary_table(table: &SummaryTable) -> RenderResult {
    let mut out = String::new();
    writeln!(out, "{} プラットフォーム別集計", table.period.label())?;
    writeln!(out)?;

    let kinds = table.selector.kinds();
    write!(out, "{}", align_left("プラットフォーム", 18))?;
    for kind in &kinds {
        write!(out, "{}", align_right(kind.display_name(), 14))?;
    }
    writeln!(out)?;

    for row in &table.rows {
        write!(out, "{}", align_left(&row.platform, 18))?;
        for kind in &kinds {
            write!(out, "{}", align_right(&format_amount(row.values.get(*kind)), 14))?;
        }
        writeln!(out)?;
    }

    write!(out, "{}", align_left("合計", 18))?;
    for kind in &kinds {
        write!(out, "{}", align_right(&format_amount(table.totals.get(*kind)), 14))?;
    }
    writeln!(out)?;
    Ok(out)
}

/// Two periods side by side, one block per selected metric
pub fn comparison_table(table: &ComparisonTable, selector: MetricSelector) -> RenderResult {
    let mut out = String::new();
    writeln!(
        out,
        "{} と {} の比較",
        table.primary_period.label(),
        table.comparison_period.label()
    )?;

    for kind in selector.kinds() {
        writeln!(out)?;
        writeln!(out, "[{}]", kind.display_name())?;
        write!(out, "{}", align_left("プラットフォーム", 18))?;
        write!(out, "{}", align_right(&table.primary_period.label(), 12))?;
        write!(out, "{}", align_right(&table.comparison_period.label(), 12))?;
        write!(out, "{}", align_right("差分", 12))?;
        writeln!(out, "{}", align_right("増減率", 14))?;

        for row in &table.rows {
            let delta = row.delta(kind);
            write!(out, "{}", align_left(&row.platform, 18))?;
            write!(out, "{}", align_right(&format_amount(delta.primary), 12))?;
            write!(out, "{}", align_right(&format_amount(delta.comparison), 12))?;
            write!(out, "{}", align_right(&format_amount(delta.difference), 12))?;
            writeln!(out, "{}", align_right(&growth_label(delta.growth_pct), 14))?;
        }

        let total = table.total_delta(kind);
        write!(out, "{}", align_left("合計", 18))?;
        write!(out, "{}", align_right(&format_amount(total.primary), 12))?;
        write!(out, "{}", align_right(&format_amount(total.comparison), 12))?;
        write!(out, "{}", align_right(&format_amount(total.difference), 12))?;
        writeln!(out, "{}", align_right(&growth_label(total.growth_pct), 14))?;
    }
    Ok(out)
}

/// Day-by-day table with weekday, extreme markers and annotations
pub fn daily_table(breakdown: &DailyBreakdown) -> RenderResult {
    let mut out = String::new();
    writeln!(
        out,
        "{} 日別推移 ({})",
        breakdown.period.label(),
        breakdown.metric.display_name()
    )?;
    writeln!(out)?;

    write!(out, "{}{}", align_left("日付", 12), align_left("曜日", 6))?;
    for platform in &breakdown.platforms {
        write!(out, "{}", align_right(platform, 12))?;
    }
    write!(out, "{}", align_right("合計", 12))?;
    writeln!(
        out,
        "  {}{}{}",
        align_left("天気", 10),
        align_left("気温", 12),
        "祝日"
    )?;

    for row in &breakdown.rows {
        write!(
            out,
            "{}{}",
            align_left(&row.date.to_string(), 12),
            align_left(row.weekday, 6)
        )?;
        for cell in &row.cells {
            let value = format!("{}{}", format_amount(cell.value), extreme_marker(cell));
            write!(out, "{}", align_right(&value, 12))?;
        }
        write!(out, "{}", align_right(&format_amount(row.total), 12))?;
        let (condition, temperature) = weather_cells(row);
        writeln!(
            out,
            "  {}{}{}",
            align_left(&condition, 10),
            align_left(&temperature, 12),
            row.holiday.as_deref().unwrap_or("")
        )?;
    }
    Ok(out)
}

/// Category ranking with each category's share of the period total
pub fn category_table(ranking: &CategoryRanking) -> RenderResult {
    let mut out = String::new();
    writeln!(
        out,
        "{} カテゴリランキング ({})",
        ranking.period.label(),
        ranking.metric.display_name()
    )?;
    writeln!(out)?;

    writeln!(
        out,
        "{}{}{}{}",
        align_left("順位", 6),
        align_left("カテゴリ", 20),
        align_right("金額", 12),
        align_right("構成比", 10)
    )?;
    for (index, row) in ranking.rows.iter().enumerate() {
        let share = if ranking.total != 0.0 {
            row.value / ranking.total * 100.0
        } else {
            0.0
        };
        writeln!(
            out,
            "{}{}{}{:>9.1}%",
            align_left(&(index + 1).to_string(), 6),
            align_left(&row.category, 20),
            align_right(&format_amount(row.value), 12),
            share
        )?;
    }
    Ok(out)
}

/// Growth with a direction marker, one decimal for display
fn growth_label(growth_pct: f64) -> String {
    if growth_pct > 0.0 {
        format!("▲ {:+.1}%", growth_pct)
    } else if growth_pct < 0.0 {
        format!("▽ {:+.1}%", growth_pct)
    } else {
        format!("{:+.1}%", growth_pct)
    }
}

fn extreme_marker(cell: &DayCell) -> &'static str {
    match (cell.is_max, cell.is_min) {
        (true, true) => "▲▽",
        (true, false) => "▲",
        (false, true) => "▽",
        (false, false) => "",
    }
}

/// Pad to a terminal-cell width rather than a char count: CJK text
/// occupies two cells per character, so `{:<N}` misaligns mixed columns.
fn align_left(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    format!("{}{:padding$}", text, "")
}

fn align_right(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.width());
    format!("{:padding$}{}", "", text)
}

fn weather_cells(row: &DayRow) -> (String, String) {
    match &row.weather {
        Some(observation) => {
            let condition = observation.condition.clone().unwrap_or_default();
            let temperature = match (observation.tmax, observation.tmin) {
                (Some(tmax), Some(tmin)) => format!("{:.1}/{:.1}", tmax, tmin),
                (Some(tmax), None) => format!("{:.1}/-", tmax),
                (None, Some(tmin)) => format!("-/{:.1}", tmin),
                (None, None) => observation
                    .tavg
                    .map(|tavg| format!("平均 {:.1}", tavg))
                    .unwrap_or_default(),
            };
            (condition, temperature)
        }
        None => (String::new(), String::new()),
    }
}

/// Whole amounts get thousands separators, fractional ones one decimal
fn format_amount(value: f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() < 1e-9 {
        group_thousands(rounded as i64)
    } else {
        format!("{:.1}", value)
    }
}

fn group_thousands(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{}{}", sign, grouped)
}

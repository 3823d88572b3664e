//! Core data model shared across the delidash crates

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::DelidashError;

/// The four metric families tracked per delivery platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Sales excluding tax
    NetSales,
    /// Sales including tax
    GrossSales,
    /// Sales placed through the platform app
    AppSales,
    /// Number of orders
    OrderCount,
}

impl MetricKind {
    /// All metric kinds in canonical column order
    pub const ALL: [MetricKind; 4] = [
        MetricKind::NetSales,
        MetricKind::GrossSales,
        MetricKind::AppSales,
        MetricKind::OrderCount,
    ];

    /// Column suffix used in the source workbook headers
    pub fn column_suffix(self) -> &'static str {
        match self {
            MetricKind::NetSales => "税抜",
            MetricKind::GrossSales => "税込",
            MetricKind::AppSales => "アプリ",
            MetricKind::OrderCount => "件数",
        }
    }

    /// Resolve a workbook column suffix to a metric kind
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.column_suffix() == suffix)
    }

    /// Short keyword used on the command line and in configuration
    pub fn keyword(self) -> &'static str {
        match self {
            MetricKind::NetSales => "net",
            MetricKind::GrossSales => "gross",
            MetricKind::AppSales => "app",
            MetricKind::OrderCount => "orders",
        }
    }

    /// Parse a configuration/CLI keyword into a metric kind
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim() {
            "net" | "net_sales" => Some(MetricKind::NetSales),
            "gross" | "gross_sales" => Some(MetricKind::GrossSales),
            "app" | "app_sales" => Some(MetricKind::AppSales),
            "orders" | "order_count" => Some(MetricKind::OrderCount),
            _ => None,
        }
    }

    /// Human-readable column header for rendered tables
    pub fn display_name(self) -> &'static str {
        match self {
            MetricKind::NetSales => "税抜売上",
            MetricKind::GrossSales => "税込売上",
            MetricKind::AppSales => "アプリ売上",
            MetricKind::OrderCount => "注文件数",
        }
    }
}

/// Values for all four metrics of one platform; absent columns stay zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricValues {
    pub net_sales: f64,
    pub gross_sales: f64,
    pub app_sales: f64,
    pub order_count: f64,
}

impl MetricValues {
    /// Value for a single metric kind
    pub fn get(&self, kind: MetricKind) -> f64 {
        match kind {
            MetricKind::NetSales => self.net_sales,
            MetricKind::GrossSales => self.gross_sales,
            MetricKind::AppSales => self.app_sales,
            MetricKind::OrderCount => self.order_count,
        }
    }

    /// Set the value for a single metric kind
    pub fn set(&mut self, kind: MetricKind, value: f64) {
        match kind {
            MetricKind::NetSales => self.net_sales = value,
            MetricKind::GrossSales => self.gross_sales = value,
            MetricKind::AppSales => self.app_sales = value,
            MetricKind::OrderCount => self.order_count = value,
        }
    }

    /// Accumulate another set of values into this one
    pub fn add(&mut self, other: &MetricValues) {
        self.net_sales += other.net_sales;
        self.gross_sales += other.gross_sales;
        self.app_sales += other.app_sales;
        self.order_count += other.order_count;
    }

    /// True when every metric is exactly zero
    pub fn is_zero(&self) -> bool {
        MetricKind::ALL.into_iter().all(|kind| self.get(kind) == 0.0)
    }
}

/// A calendar month, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Month {
    pub year: i32,
    pub month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The month a date falls in
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First calendar day of the month
    pub fn first_day(self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last calendar day of the month, leap years included
    pub fn last_day(self) -> NaiveDate {
        let (next_year, next_month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(next_year, next_month, 1)
            .and_then(|first| first.pred_opt())
            .unwrap_or(NaiveDate::MIN)
    }

    /// The immediately preceding calendar month
    pub fn previous(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// The same calendar month one year earlier
    pub fn previous_year(self) -> Self {
        Self {
            year: self.year - 1,
            month: self.month,
        }
    }

    /// Whether a date falls inside this month
    pub fn contains(self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for Month {
    type Err = DelidashError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid =
            || DelidashError::validation_field(format!("invalid month '{}'", value), "period");
        let (year_part, month_part) = value.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let month: u32 = month_part.parse().map_err(|_| invalid())?;
        if !(1..=12).contains(&month) {
            return Err(invalid());
        }
        Ok(Self { year, month })
    }
}

/// A reporting period: a whole month or an inclusive date range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Month(Month),
    Range { start: NaiveDate, end: NaiveDate },
}

impl Period {
    /// Whether a date falls inside the period
    pub fn contains(&self, date: NaiveDate) -> bool {
        match self {
            Period::Month(month) => month.contains(date),
            Period::Range { start, end } => *start <= date && date <= *end,
        }
    }

    /// Whether the period lies entirely after the given month
    pub fn starts_after(&self, month: Month) -> bool {
        match self {
            Period::Month(own) => *own > month,
            Period::Range { start, .. } => *start > month.last_day(),
        }
    }

    /// Display label for rendered tables
    pub fn label(&self) -> String {
        match self {
            Period::Month(month) => month.to_string(),
            Period::Range { start, end } => format!("{} – {}", start, end),
        }
    }
}

impl From<Month> for Period {
    fn from(month: Month) -> Self {
        Period::Month(month)
    }
}

/// Default comparison period selection, configurable per deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonBasis {
    /// No comparison unless one is requested explicitly
    None,
    /// Most recent valid month before the primary period
    #[default]
    PreviousMonth,
    /// Same calendar month one year earlier
    SameMonthLastYear,
}

impl ComparisonBasis {
    /// Configuration/CLI keyword for this basis
    pub fn keyword(self) -> &'static str {
        match self {
            ComparisonBasis::None => "none",
            ComparisonBasis::PreviousMonth => "previous-month",
            ComparisonBasis::SameMonthLastYear => "same-month-last-year",
        }
    }

    /// Parse a configuration/CLI keyword into a comparison basis
    pub fn from_keyword(value: &str) -> Option<Self> {
        match value.trim() {
            "none" => Some(ComparisonBasis::None),
            "previous-month" => Some(ComparisonBasis::PreviousMonth),
            "same-month-last-year" => Some(ComparisonBasis::SameMonthLastYear),
            _ => None,
        }
    }
}

/// One metric column discovered in the source sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    /// Platform token, the header text before the first underscore
    pub platform: String,
    pub kind: MetricKind,
    /// Zero-based column index in the source sheet
    pub index: usize,
}

/// Typed column layout of the source sheet, built once at load time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSchema {
    date_column: usize,
    category_column: Option<usize>,
    columns: Vec<SchemaColumn>,
    platforms: Vec<String>,
}

impl SheetSchema {
    /// Assemble a schema from discovered columns; platform names are
    /// deduplicated and sorted for deterministic presentation order.
    pub fn new(
        date_column: usize,
        category_column: Option<usize>,
        columns: Vec<SchemaColumn>,
    ) -> Self {
        let mut platforms: Vec<String> = Vec::new();
        for column in &columns {
            if !platforms.contains(&column.platform) {
                platforms.push(column.platform.clone());
            }
        }
        platforms.sort();
        Self {
            date_column,
            category_column,
            columns,
            platforms,
        }
    }

    /// Zero-based index of the date column
    pub fn date_column(&self) -> usize {
        self.date_column
    }

    /// Zero-based index of the optional category column
    pub fn category_column(&self) -> Option<usize> {
        self.category_column
    }

    /// All discovered metric columns
    pub fn columns(&self) -> &[SchemaColumn] {
        &self.columns
    }

    /// Platform names, sorted
    pub fn platforms(&self) -> &[String] {
        &self.platforms
    }

    /// Column index for a (platform, metric) pair, if the sheet has it
    pub fn column_for(&self, platform: &str, kind: MetricKind) -> Option<usize> {
        self.columns
            .iter()
            .find(|column| column.platform == platform && column.kind == kind)
            .map(|column| column.index)
    }
}

/// One loaded sheet row: a date with per-platform metric values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub date: NaiveDate,
    /// Menu category, when the sheet carries a カテゴリ column
    pub category: Option<String>,
    pub platforms: HashMap<String, MetricValues>,
}

impl SalesRecord {
    /// The month this record falls in
    pub fn month(&self) -> Month {
        Month::from_date(self.date)
    }

    /// Metric value for a platform; missing platforms and columns read as zero
    pub fn value(&self, platform: &str, kind: MetricKind) -> f64 {
        self.platforms
            .get(platform)
            .map(|values| values.get(kind))
            .unwrap_or(0.0)
    }
}

/// An immutable loaded dataset: discovered schema plus all usable rows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesDataset {
    pub schema: SheetSchema,
    pub records: Vec<SalesRecord>,
}

impl SalesDataset {
    pub fn new(schema: SheetSchema, records: Vec<SalesRecord>) -> Self {
        Self { schema, records }
    }

    /// Records whose date falls inside the period
    pub fn records_in<'a>(
        &'a self,
        period: &'a Period,
    ) -> impl Iterator<Item = &'a SalesRecord> + 'a {
        self.records
            .iter()
            .filter(move |record| period.contains(record.date))
    }
}

//! Spreadsheet ingestion for xlsx workbooks and csv exports
//!
//! Loading is all-or-nothing: structural problems (missing file, missing
//! worksheet, unusable header) surface once as an error and are never
//! retried. Individual rows degrade instead of failing the load: rows
//! without a parseable date are dropped with a warning, and blank or
//! non-numeric metric cells read as zero.

use crate::schema::discover_schema;
use calamine::{open_workbook_auto, Data, Reader};
use chrono::NaiveDate;
use delidash_common::{
    parse_flexible_date, MetricValues, Result, SalesDataset, SalesRecord, SheetSchema,
};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Errors raised while loading a spreadsheet; all fatal, none retried
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// Source file does not exist
    #[error("Spreadsheet not found: {path}")]
    NotFound { path: String },

    /// File extension is not one we can read
    #[error("Unsupported spreadsheet format: .{extension}")]
    UnsupportedFormat { extension: String },

    /// Workbook does not contain the configured worksheet
    #[error("Worksheet '{name}' not found")]
    SheetNotFound { name: String },

    /// Sheet has no header row
    #[error("Header row is missing or empty")]
    MissingHeader,

    /// Header row has no date column
    #[error("Date column '{expected}' not found in header")]
    MissingDateColumn { expected: String },

    /// Header row has no recognizable metric columns
    #[error("No metric columns recognized in header")]
    NoMetricColumns,

    /// Workbook-level read failure
    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// CSV-level read failure
    #[error("Failed to read csv: {0}")]
    Csv(#[from] csv::Error),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DataLoadError> for delidash_common::DelidashError {
    fn from(err: DataLoadError) -> Self {
        let message = err.to_string();
        delidash_common::DelidashError::DataLoad {
            message,
            source: Some(Box::new(err)),
        }
    }
}

/// Loads the sales sheet into a typed dataset
#[derive(Debug, Clone)]
pub struct SpreadsheetLoader {
    sheet_name: String,
}

impl Default for SpreadsheetLoader {
    fn default() -> Self {
        Self {
            sheet_name: "Master".to_string(),
        }
    }
}

impl SpreadsheetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a worksheet other than the default `Master`
    pub fn with_sheet(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Load a dataset from an xlsx workbook or a csv export, chosen by
    /// file extension
    #[instrument(skip(self, path))]
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<SalesDataset> {
        let path = path.as_ref();
        debug!(path = %path.display(), sheet = %self.sheet_name, "loading spreadsheet");

        if !path.exists() {
            return Err(DataLoadError::NotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let dataset = match extension.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => self.load_workbook(path)?,
            "csv" => self.load_csv(path)?,
            _ => return Err(DataLoadError::UnsupportedFormat { extension }.into()),
        };

        info!(
            records = dataset.records.len(),
            platforms = dataset.schema.platforms().len(),
            "dataset loaded"
        );
        Ok(dataset)
    }

    fn load_workbook(&self, path: &Path) -> std::result::Result<SalesDataset, DataLoadError> {
        let mut workbook = open_workbook_auto(path)?;

        if !workbook
            .sheet_names()
            .iter()
            .any(|name| name == &self.sheet_name)
        {
            return Err(DataLoadError::SheetNotFound {
                name: self.sheet_name.clone(),
            });
        }

        let range = workbook.worksheet_range(&self.sheet_name)?;
        let mut rows = range.rows();

        let headers: Vec<String> = rows
            .next()
            .ok_or(DataLoadError::MissingHeader)?
            .iter()
            .map(cell_text)
            .collect();
        let schema = discover_schema(&headers)?;

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for row in rows {
            match excel_date(row.get(schema.date_column())) {
                Some(date) => records.push(build_record(
                    &schema,
                    date,
                    row,
                    |cell| excel_number(cell),
                    |cell| cell_text(cell),
                )),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(dropped, "dropped rows without a parseable date");
        }

        Ok(SalesDataset::new(schema, records))
    }

    fn load_csv(&self, path: &Path) -> std::result::Result<SalesDataset, DataLoadError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;

        // Excel csv exports regularly carry a BOM on the first header
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        if headers.is_empty() {
            return Err(DataLoadError::MissingHeader);
        }
        let schema = discover_schema(&headers)?;

        let mut records = Vec::new();
        let mut dropped = 0usize;
        for result in reader.records() {
            let row = result?;
            let cells: Vec<&str> = row.iter().collect();
            match cells
                .get(schema.date_column())
                .and_then(|cell| parse_flexible_date(cell))
            {
                Some(date) => records.push(build_record(
                    &schema,
                    date,
                    &cells,
                    |cell| parse_number(cell),
                    |cell| cell.trim().to_string(),
                )),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            warn!(dropped, "dropped rows without a parseable date");
        }

        Ok(SalesDataset::new(schema, records))
    }
}

/// Assemble one record from a row of cells. Every platform in the schema
/// gets an entry, so absent columns read as zero downstream.
fn build_record<C>(
    schema: &SheetSchema,
    date: NaiveDate,
    cells: &[C],
    value_of: impl Fn(&C) -> Option<f64>,
    text_of: impl Fn(&C) -> String,
) -> SalesRecord {
    let mut platforms: HashMap<String, MetricValues> = HashMap::new();
    for platform in schema.platforms() {
        platforms.insert(platform.clone(), MetricValues::default());
    }
    for column in schema.columns() {
        let value = cells
            .get(column.index)
            .and_then(|cell| value_of(cell))
            .unwrap_or(0.0);
        if let Some(values) = platforms.get_mut(&column.platform) {
            values.set(column.kind, value);
        }
    }

    let category = schema
        .category_column()
        .and_then(|index| cells.get(index))
        .map(|cell| text_of(cell))
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    SalesRecord {
        date,
        category,
        platforms,
    }
}

/// Text content of a cell, empty for blanks
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(text) => text.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// Date from a workbook cell: native datetime cells or date-like strings
fn excel_date(cell: Option<&Data>) -> Option<NaiveDate> {
    match cell? {
        Data::DateTime(value) => value.as_datetime().map(|datetime| datetime.date()),
        Data::DateTimeIso(text) => parse_flexible_date(text),
        Data::String(text) => parse_flexible_date(text),
        _ => None,
    }
}

/// Numeric content of a metric cell; blanks and non-numeric text are absent
fn excel_number(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(value) => Some(*value),
        Data::Int(value) => Some(*value as f64),
        Data::String(text) => parse_number(text),
        _ => None,
    }
}

/// Parse a numeric cell that may carry thousands separators
fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use delidash_common::{DelidashError, MetricKind};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp file");
        file
    }

    #[test]
    fn test_csv_load_end_to_end() {
        let csv = "日付,カテゴリ,uber_税抜,uber_税込,uber_件数,wolt_税込\n\
                   2024-05-01,からあげ,1000,1100,3,500\n\
                   2024-05-02,,\"2,000\",2200,5,\n\
                   not-a-date,カレー,900,990,2,100\n\
                   2024-05-02,カレー,300,330,1,200\n";
        let file = write_csv(csv);

        let dataset = SpreadsheetLoader::new().load(file.path()).unwrap();

        // The unparseable-date row is dropped, not an error
        assert_eq!(dataset.records.len(), 3);
        assert_eq!(
            dataset.schema.platforms(),
            ["uber".to_string(), "wolt".to_string()]
        );

        let first = &dataset.records[0];
        assert_eq!(first.category.as_deref(), Some("からあげ"));
        assert_eq!(first.value("uber", MetricKind::GrossSales), 1100.0);
        assert_eq!(first.value("uber", MetricKind::OrderCount), 3.0);
        // Column absent from the sheet reads as zero
        assert_eq!(first.value("wolt", MetricKind::NetSales), 0.0);

        let second = &dataset.records[1];
        assert_eq!(second.category, None);
        // Thousands separators parse, blank cells read as zero
        assert_eq!(second.value("uber", MetricKind::NetSales), 2000.0);
        assert_eq!(second.value("wolt", MetricKind::GrossSales), 0.0);
    }

    #[test]
    fn test_csv_missing_date_column() {
        let file = write_csv("uber_税込,wolt_税込\n100,200\n");
        let result = SpreadsheetLoader::new().load(file.path());
        assert!(matches!(result, Err(DelidashError::DataLoad { .. })));
    }

    #[test]
    fn test_csv_without_metric_columns() {
        let file = write_csv("日付,メモ\n2024-05-01,test\n");
        let result = SpreadsheetLoader::new().load(file.path());
        assert!(matches!(result, Err(DelidashError::DataLoad { .. })));
    }

    #[test]
    fn test_bom_header_is_tolerated() {
        let csv = "\u{feff}日付,uber_税込\n2024-05-01,100\n";
        let file = write_csv(csv);
        let dataset = SpreadsheetLoader::new().load(file.path()).unwrap();
        assert_eq!(dataset.records.len(), 1);
        assert_eq!(
            dataset.records[0].value("uber", MetricKind::GrossSales),
            100.0
        );
    }

    #[test]
    fn test_missing_file() {
        let result = SpreadsheetLoader::new().load("/nonexistent/sales.xlsx");
        assert!(matches!(result, Err(DelidashError::DataLoad { .. })));
    }

    #[test]
    fn test_unsupported_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".pdf")
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(b"not a spreadsheet")
            .expect("Failed to write temp file");
        let result = SpreadsheetLoader::new().load(file.path());
        assert!(matches!(result, Err(DelidashError::DataLoad { .. })));
    }

    #[test]
    fn test_excel_cell_conversions() {
        assert_eq!(excel_number(&Data::Float(12.5)), Some(12.5));
        assert_eq!(excel_number(&Data::Int(7)), Some(7.0));
        assert_eq!(excel_number(&Data::String("1,234".to_string())), Some(1234.0));
        assert_eq!(excel_number(&Data::String("n/a".to_string())), None);
        assert_eq!(excel_number(&Data::Empty), None);

        let date = excel_date(Some(&Data::String("2024/5/1".to_string())));
        assert_eq!(date, chrono::NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(excel_date(Some(&Data::Empty)), None);
        assert_eq!(excel_date(None), None);

        assert_eq!(cell_text(&Data::String("  からあげ ".to_string())), "からあげ");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("100"), Some(100.0));
        assert_eq!(parse_number(" 1,234.5 "), Some(1234.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("  "), None);
        assert_eq!(parse_number("abc"), None);
    }
}

//! Convention-based column discovery for the sales sheet
//!
//! Headers follow the `{platform}_{suffix}` convention of the source
//! workbook, e.g. `uber_税込`. The platform is the token before the first
//! underscore; the suffix selects the metric. Columns that do not follow
//! the convention are ignored, so extra bookkeeping columns in the sheet
//! are harmless.

use crate::loader::DataLoadError;
use delidash_common::{MetricKind, SchemaColumn, SheetSchema};
use tracing::debug;

/// Header of the date column
pub const DATE_COLUMN: &str = "日付";

/// Header of the optional category column
pub const CATEGORY_COLUMN: &str = "カテゴリ";

/// Discover the typed column layout from a header row. Built once at load
/// time; everything downstream works against the returned mapping.
pub fn discover_schema(headers: &[String]) -> Result<SheetSchema, DataLoadError> {
    let mut date_column = None;
    let mut category_column = None;
    let mut columns = Vec::new();

    for (index, header) in headers.iter().enumerate() {
        let header = header.trim();
        if header.is_empty() {
            continue;
        }
        if header == DATE_COLUMN {
            date_column = Some(index);
            continue;
        }
        if header == CATEGORY_COLUMN {
            category_column = Some(index);
            continue;
        }

        let Some((_, suffix)) = header.rsplit_once('_') else {
            debug!(header, "column without platform_suffix convention, ignoring");
            continue;
        };
        let Some(kind) = MetricKind::from_suffix(suffix) else {
            debug!(header, "unrecognized metric suffix, ignoring");
            continue;
        };
        let platform = header.split('_').next().unwrap_or(header);
        if platform.is_empty() {
            debug!(header, "empty platform token, ignoring");
            continue;
        }
        columns.push(SchemaColumn {
            platform: platform.to_string(),
            kind,
            index,
        });
    }

    let date_column = date_column.ok_or_else(|| DataLoadError::MissingDateColumn {
        expected: DATE_COLUMN.to_string(),
    })?;
    if columns.is_empty() {
        return Err(DataLoadError::NoMetricColumns);
    }

    Ok(SheetSchema::new(date_column, category_column, columns))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_discovers_platforms_and_metrics() {
        let schema = discover_schema(&headers(&[
            "日付",
            "カテゴリ",
            "uber_税抜",
            "uber_税込",
            "uber_アプリ",
            "uber_件数",
            "wolt_税込",
            "menu_税込",
        ]))
        .unwrap();

        assert_eq!(schema.date_column(), 0);
        assert_eq!(schema.category_column(), Some(1));
        assert_eq!(
            schema.platforms(),
            ["menu".to_string(), "uber".to_string(), "wolt".to_string()]
        );
        assert_eq!(schema.column_for("uber", MetricKind::GrossSales), Some(3));
        assert_eq!(schema.column_for("uber", MetricKind::OrderCount), Some(5));
        assert_eq!(schema.column_for("wolt", MetricKind::GrossSales), Some(6));
        assert_eq!(schema.column_for("wolt", MetricKind::NetSales), None);
    }

    #[test]
    fn test_ignores_unrecognized_columns() {
        let schema = discover_schema(&headers(&[
            "日付",
            "メモ",
            "uber_税込",
            "uber_手数料",
            "天気",
        ]))
        .unwrap();

        assert_eq!(schema.columns().len(), 1);
        assert_eq!(schema.platforms(), ["uber".to_string()]);
    }

    #[test]
    fn test_missing_date_column() {
        let result = discover_schema(&headers(&["uber_税込", "wolt_税込"]));
        assert!(matches!(
            result,
            Err(DataLoadError::MissingDateColumn { .. })
        ));
    }

    #[test]
    fn test_no_metric_columns() {
        let result = discover_schema(&headers(&["日付", "カテゴリ", "メモ"]));
        assert!(matches!(result, Err(DataLoadError::NoMetricColumns)));
    }

    #[test]
    fn test_category_column_is_optional() {
        let schema = discover_schema(&headers(&["日付", "uber_税込"])).unwrap();
        assert_eq!(schema.category_column(), None);
    }
}

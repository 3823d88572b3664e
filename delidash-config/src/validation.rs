//! Validation utilities for configuration keywords

use delidash_common::{ComparisonBasis, MetricKind};
use validator::ValidationError;

/// Validate a metric keyword (net, gross, app, orders)
pub fn validate_metric_keyword(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("empty_metric_keyword"));
    }

    match MetricKind::from_keyword(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("unknown_metric_keyword")),
    }
}

/// Validate a comparison basis keyword (none, previous-month, same-month-last-year)
pub fn validate_comparison_keyword(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::new("empty_comparison_keyword"));
    }

    match ComparisonBasis::from_keyword(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("unknown_comparison_keyword")),
    }
}

/// Validate a log level; full EnvFilter directives pass through untouched
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if level.is_empty() {
        return Err(ValidationError::new("empty_log_level"));
    }

    // Directives like "delidash_report=debug" are handed to EnvFilter as-is
    if level.contains('=') || level.contains(',') {
        return Ok(());
    }

    match level {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ValidationError::new("invalid_log_level")),
    }
}

//! Application configuration structures

use delidash_common::{ComparisonBasis, MetricKind};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Config {
    /// Source spreadsheet configuration
    #[serde(default)]
    #[validate]
    pub data: DataConfig,

    /// Report defaults
    #[serde(default)]
    #[validate]
    pub report: ReportConfig,

    /// Weather annotation configuration
    #[serde(default)]
    #[validate]
    pub weather: WeatherConfig,

    /// Holiday annotation configuration
    #[serde(default)]
    #[validate]
    pub holidays: HolidayConfig,

    /// Logging configuration
    #[serde(default)]
    #[validate]
    pub logging: LoggingConfig,
}

/// Source spreadsheet configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct DataConfig {
    /// Path to the source workbook or CSV export
    #[validate(length(min = 1, message = "Data path cannot be empty"))]
    pub path: String,

    /// Worksheet holding the sales rows
    #[validate(length(min = 1, message = "Sheet name cannot be empty"))]
    pub sheet: String,

    /// Number of loaded datasets kept in memory
    #[validate(range(min = 1, max = 64, message = "Cache capacity must be between 1 and 64"))]
    pub cache_capacity: u64,

    /// Seconds a cached dataset stays fresh before it is reloaded
    #[validate(range(min = 1, max = 86400, message = "Cache TTL must be between 1 and 86400 seconds"))]
    pub cache_ttl_seconds: u64,
}

/// Report defaults applied when the command line leaves them out
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ReportConfig {
    /// Metric shown when none is requested (net, gross, app, orders)
    #[validate(custom(function = "crate::validation::validate_metric_keyword", message = "Unknown metric keyword"))]
    pub default_metric: String,

    /// Comparison period applied when none is requested
    /// (none, previous-month, same-month-last-year)
    #[validate(custom(function = "crate::validation::validate_comparison_keyword", message = "Unknown comparison keyword"))]
    pub default_comparison: String,

    /// Rows shown in the category ranking
    #[validate(range(min = 1, max = 100, message = "Category limit must be between 1 and 100"))]
    pub category_limit: usize,
}

/// Weather annotation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct WeatherConfig {
    /// Whether daily breakdowns are annotated with weather
    pub enabled: bool,

    /// Observation point latitude
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    /// Observation point longitude
    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub longitude: f64,

    /// Per-request timeout in seconds; lookups fail open on expiry
    #[validate(range(min = 1, max = 60, message = "Timeout must be between 1 and 60 seconds"))]
    pub timeout_seconds: u64,

    /// Optional pre-exported daily weather CSV used instead of the API
    #[validate(length(min = 1, message = "Weather file path cannot be empty if specified"))]
    pub file: Option<String>,
}

/// Holiday annotation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct HolidayConfig {
    /// Path to a holiday calendar CSV (`date,name` per row)
    #[validate(length(min = 1, message = "Holiday file path cannot be empty if specified"))]
    pub file: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error) or an EnvFilter directive
    #[validate(custom(function = "crate::validation::validate_log_level", message = "Log level must be one of: trace, debug, info, warn, error"))]
    pub level: String,

    /// Optional log file path
    #[validate(length(min = 1, message = "Log file path cannot be empty if specified"))]
    pub file: Option<String>,

    /// Emit newline-delimited JSON instead of the human format
    pub json_format: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            report: ReportConfig::default(),
            weather: WeatherConfig::default(),
            holidays: HolidayConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Comprehensive validation of the entire configuration
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: "sales.xlsx".to_string(),
            sheet: "Master".to_string(),
            cache_capacity: 8,
            cache_ttl_seconds: 300,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            default_metric: "gross".to_string(),
            default_comparison: "previous-month".to_string(),
            category_limit: 10,
        }
    }
}

impl ReportConfig {
    /// Parsed default metric; the keyword is checked at validation time
    pub fn default_metric_kind(&self) -> MetricKind {
        MetricKind::from_keyword(&self.default_metric).unwrap_or(MetricKind::GrossSales)
    }

    /// Parsed default comparison basis; the keyword is checked at validation time
    pub fn default_comparison_basis(&self) -> ComparisonBasis {
        ComparisonBasis::from_keyword(&self.default_comparison).unwrap_or_default()
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        // Sapporo city centre, where the shops operate
        Self {
            enabled: false,
            latitude: 43.06206,
            longitude: 141.35444,
            timeout_seconds: 3,
            file: None,
        }
    }
}

impl Default for HolidayConfig {
    fn default() -> Self {
        Self { file: None }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Convert to the runtime logging configuration
    pub fn to_runtime(&self) -> delidash_common::logging::LoggingConfig {
        delidash_common::logging::LoggingConfig {
            level: self.level.clone(),
            json_format: self.json_format,
            file_path: self.file.clone(),
            include_spans: false,
        }
    }
}

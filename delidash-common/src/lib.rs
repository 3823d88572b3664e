//! Common error types, data model and utilities for delidash

pub mod calendar;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use calendar::{format_date_with_weekday, parse_flexible_date, weekday_label, WEEKDAY_LABELS};
pub use error::{DelidashError, Result};
pub use logging::{init_default_logging, init_logging, LoggingConfig};
pub use types::*;

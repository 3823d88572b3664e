//! Configuration management for delidash

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{
    Config, DataConfig, HolidayConfig, LoggingConfig, ReportConfig, WeatherConfig,
};

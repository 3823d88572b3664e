//! Configuration loading utilities

use crate::Config;
use delidash_common::Result as DelidashResult;
use std::env;
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    ParseError(#[from] serde_yaml::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for delidash_common::DelidashError {
    fn from(err: ConfigError) -> Self {
        delidash_common::DelidashError::config(err.to_string())
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a YAML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        // Read and parse the YAML file
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config: Config = serde_yaml::from_str(&content)?;

        // Apply environment variable overrides
        Self::apply_env_overrides(&mut config)?;

        // Validate the final configuration
        config.validate_all().map_err(ConfigError::ValidationError)?;

        Ok(config)
    }

    /// Load configuration from the default locations, falling back to defaults
    pub fn load() -> DelidashResult<Config> {
        let config = if let Ok(config_path) = env::var("DELIDASH_CONFIG_PATH") {
            Self::load_config(&config_path)?
        } else if Path::new("delidash.yaml").exists() {
            Self::load_config("delidash.yaml")?
        } else if Path::new("delidash.yml").exists() {
            Self::load_config("delidash.yml")?
        } else {
            // No config file found, use defaults with env overrides
            let mut config = Config::default();
            Self::apply_env_overrides(&mut config)?;
            config.validate_all().map_err(ConfigError::ValidationError)?;
            config
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> DelidashResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides(config, |var| env::var(var).ok())
    }

    /// Apply overrides supplied by an arbitrary lookup, so the mapping is
    /// testable without touching process environment
    fn apply_overrides(
        config: &mut Config,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        // Data source overrides
        if let Some(path) = lookup("DELIDASH_DATA_PATH") {
            config.data.path = path;
        }

        if let Some(sheet) = lookup("DELIDASH_DATA_SHEET") {
            config.data.sheet = sheet;
        }

        if let Some(capacity) = lookup("DELIDASH_CACHE_CAPACITY") {
            config.data.cache_capacity = parse_override("DELIDASH_CACHE_CAPACITY", &capacity)?;
        }

        if let Some(ttl) = lookup("DELIDASH_CACHE_TTL") {
            config.data.cache_ttl_seconds = parse_override("DELIDASH_CACHE_TTL", &ttl)?;
        }

        // Report default overrides
        if let Some(metric) = lookup("DELIDASH_DEFAULT_METRIC") {
            config.report.default_metric = metric;
        }

        if let Some(comparison) = lookup("DELIDASH_DEFAULT_COMPARISON") {
            config.report.default_comparison = comparison;
        }

        if let Some(limit) = lookup("DELIDASH_CATEGORY_LIMIT") {
            config.report.category_limit = parse_override("DELIDASH_CATEGORY_LIMIT", &limit)?;
        }

        // Weather provider overrides
        if let Some(enabled) = lookup("DELIDASH_WEATHER_ENABLED") {
            config.weather.enabled = parse_override("DELIDASH_WEATHER_ENABLED", &enabled)?;
        }

        if let Some(latitude) = lookup("DELIDASH_WEATHER_LATITUDE") {
            config.weather.latitude = parse_override("DELIDASH_WEATHER_LATITUDE", &latitude)?;
        }

        if let Some(longitude) = lookup("DELIDASH_WEATHER_LONGITUDE") {
            config.weather.longitude = parse_override("DELIDASH_WEATHER_LONGITUDE", &longitude)?;
        }

        if let Some(timeout) = lookup("DELIDASH_WEATHER_TIMEOUT") {
            config.weather.timeout_seconds = parse_override("DELIDASH_WEATHER_TIMEOUT", &timeout)?;
        }

        if let Some(file) = lookup("DELIDASH_WEATHER_FILE") {
            config.weather.file = Some(file);
        }

        // Holiday provider overrides
        if let Some(file) = lookup("DELIDASH_HOLIDAY_FILE") {
            config.holidays.file = Some(file);
        }

        // Logging overrides
        if let Some(level) = lookup("DELIDASH_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(file) = lookup("DELIDASH_LOG_FILE") {
            config.logging.file = Some(file);
        }

        Ok(())
    }
}

/// Parse an override value, attributing failures to the variable name
fn parse_override<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().map_err(|e: T::Err| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}

//! Weather lookups for the daily breakdown
//!
//! Weather is decoration, not data: every provider fails open, logging
//! the problem and returning `None` so the report renders with a blank
//! weather cell instead of aborting.

use async_trait::async_trait;
use chrono::NaiveDate;
use delidash_common::{parse_flexible_date, DelidashError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// One day of weather for a report row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Sky condition label, already localized
    pub condition: Option<String>,
    /// Daily maximum temperature in degrees Celsius
    pub tmax: Option<f64>,
    /// Daily minimum temperature in degrees Celsius
    pub tmin: Option<f64>,
    /// Daily mean temperature in degrees Celsius
    pub tavg: Option<f64>,
}

/// Source of per-day weather observations
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Weather for one date, or `None` when it cannot be determined
    async fn lookup(&self, date: NaiveDate) -> Option<WeatherObservation>;
}

/// Provider used when weather is disabled
#[derive(Debug, Default, Clone)]
pub struct NoWeather;

#[async_trait]
impl WeatherProvider for NoWeather {
    async fn lookup(&self, _date: NaiveDate) -> Option<WeatherObservation> {
        None
    }
}

/// Fixed in-memory observations, for tests and offline demos
#[derive(Debug, Default, Clone)]
pub struct StaticWeatherProvider {
    observations: HashMap<NaiveDate, WeatherObservation>,
}

impl StaticWeatherProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, date: NaiveDate, observation: WeatherObservation) -> Self {
        self.observations.insert(date, observation);
        self
    }
}

#[async_trait]
impl WeatherProvider for StaticWeatherProvider {
    async fn lookup(&self, date: NaiveDate) -> Option<WeatherObservation> {
        self.observations.get(&date).cloned()
    }
}

/// Connection settings for the Open-Meteo historical weather API
#[derive(Debug, Clone)]
pub struct OpenMeteoConfig {
    pub base_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timeout: Duration,
}

impl Default for OpenMeteoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://archive-api.open-meteo.com".to_string(),
            // Sapporo city centre, where the shops operate
            latitude: 43.06206,
            longitude: 141.35444,
            timeout: Duration::from_secs(3),
        }
    }
}

/// Historical weather from the Open-Meteo archive API
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    client: reqwest::Client,
    config: OpenMeteoConfig,
}

impl OpenMeteoProvider {
    pub fn new(config: OpenMeteoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DelidashError::network_with_source("Failed to create HTTP client", e))?;

        Ok(Self { client, config })
    }

    async fn fetch(&self, date: NaiveDate) -> Result<Option<WeatherObservation>> {
        let url = format!("{}/v1/archive", self.config.base_url.trim_end_matches('/'));
        let day = date.format("%Y-%m-%d").to_string();

        debug!(url = %url, date = %day, "requesting weather");
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", self.config.latitude.to_string()),
                ("longitude", self.config.longitude.to_string()),
                ("start_date", day.clone()),
                ("end_date", day),
                (
                    "daily",
                    "weather_code,temperature_2m_max,temperature_2m_min,temperature_2m_mean"
                        .to_string(),
                ),
                ("timezone", "Asia/Tokyo".to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DelidashError::network(format!(
                "Open-Meteo returned HTTP {}",
                response.status()
            )));
        }

        let payload: ArchiveResponse = response.json().await?;
        Ok(payload.daily.and_then(|daily| daily.into_observation(0)))
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    #[instrument(skip(self), fields(date = %date))]
    async fn lookup(&self, date: NaiveDate) -> Option<WeatherObservation> {
        match self.fetch(date).await {
            Ok(observation) => observation,
            Err(e) => {
                warn!(error = %e, "weather lookup failed");
                None
            }
        }
    }
}

/// Open-Meteo archive response body
#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    daily: Option<ArchiveDaily>,
}

/// Parallel per-day arrays as Open-Meteo returns them
#[derive(Debug, Default, Deserialize)]
struct ArchiveDaily {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    weather_code: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_mean: Vec<Option<f64>>,
}

impl ArchiveDaily {
    /// Observation at one array position, `None` past the end
    fn into_observation(self, index: usize) -> Option<WeatherObservation> {
        if index >= self.time.len() {
            return None;
        }
        let at = |values: &[Option<f64>]| values.get(index).copied().flatten();

        Some(WeatherObservation {
            condition: at(&self.weather_code)
                .map(|code| condition_label(code as u16).to_string()),
            tmax: at(&self.temperature_2m_max),
            tmin: at(&self.temperature_2m_min),
            tavg: at(&self.temperature_2m_mean),
        })
    }
}

/// Japanese label for a WMO weather code
fn condition_label(code: u16) -> &'static str {
    match code {
        0 => "快晴",
        1 => "晴れ",
        2 => "晴れ時々くもり",
        3 => "くもり",
        45 | 48 => "霧",
        51 | 53 | 55 | 56 | 57 => "霧雨",
        61 | 63 | 65 | 66 | 67 => "雨",
        71 | 73 | 75 | 77 => "雪",
        80 | 81 | 82 => "にわか雨",
        85 | 86 => "にわか雪",
        95 => "雷雨",
        96 | 99 => "雷雨(ひょう)",
        _ => "不明",
    }
}

/// Observations read once from a local CSV export, such as the Japan
/// Meteorological Agency download format
#[derive(Debug, Default, Clone)]
pub struct CsvWeatherProvider {
    observations: HashMap<NaiveDate, WeatherObservation>,
}

impl CsvWeatherProvider {
    /// Parse a CSV of daily observations.
    ///
    /// The header row is matched by substring so the JMA `(℃)` suffixes
    /// do not matter: a date column containing `年月日` or `日付`, and
    /// temperature columns containing `平均気温`, `最高気温`, `最低気温`.
    /// A column containing `天気` or `天候` becomes the condition label.
    /// Rows whose date does not parse are skipped.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| {
                DelidashError::provider_with_source(
                    format!("Failed to open weather file: {}", path.display()),
                    e,
                )
            })?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| {
                DelidashError::provider_with_source("Failed to read weather header", e)
            })?
            .iter()
            .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let find = |needles: &[&str]| {
            headers
                .iter()
                .position(|header| needles.iter().any(|needle| header.contains(needle)))
        };
        let date_column = find(&["年月日", "日付"]).ok_or_else(|| {
            DelidashError::provider("Weather file has no date column (年月日 or 日付)")
        })?;
        let tavg_column = find(&["平均気温"]);
        let tmax_column = find(&["最高気温"]);
        let tmin_column = find(&["最低気温"]);
        let condition_column = find(&["天気", "天候"]);

        let mut observations = HashMap::new();
        let mut skipped = 0usize;
        for result in reader.records() {
            let row = match result {
                Ok(row) => row,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            let date = match row.get(date_column).and_then(parse_flexible_date) {
                Some(date) => date,
                None => {
                    skipped += 1;
                    continue;
                }
            };
            let number = |column: Option<usize>| {
                column
                    .and_then(|index| row.get(index))
                    .and_then(|cell| cell.trim().parse::<f64>().ok())
            };
            let condition = condition_column
                .and_then(|index| row.get(index))
                .map(|cell| cell.trim().to_string())
                .filter(|cell| !cell.is_empty());

            observations.insert(
                date,
                WeatherObservation {
                    condition,
                    tmax: number(tmax_column),
                    tmin: number(tmin_column),
                    tavg: number(tavg_column),
                },
            );
        }
        if skipped > 0 {
            warn!(skipped, path = %path.display(), "skipped unreadable weather rows");
        }
        debug!(days = observations.len(), "weather file loaded");

        Ok(Self { observations })
    }
}

#[async_trait]
impl WeatherProvider for CsvWeatherProvider {
    async fn lookup(&self, date: NaiveDate) -> Option<WeatherObservation> {
        self.observations.get(&date).cloned()
    }
}

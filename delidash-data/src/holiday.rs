//! Public holiday lookups for the daily breakdown
//!
//! Same contract as weather: holidays decorate the report, so lookups
//! return `None` instead of failing when a date has no entry or the
//! source file is imperfect.

use async_trait::async_trait;
use chrono::NaiveDate;
use delidash_common::{parse_flexible_date, DelidashError, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Source of public holiday names by date
#[async_trait]
pub trait HolidayProvider: Send + Sync {
    /// Holiday name for one date, or `None` for ordinary days
    async fn lookup(&self, date: NaiveDate) -> Option<String>;
}

/// Provider used when holiday annotation is disabled
#[derive(Debug, Default, Clone)]
pub struct NoHolidays;

#[async_trait]
impl HolidayProvider for NoHolidays {
    async fn lookup(&self, _date: NaiveDate) -> Option<String> {
        None
    }
}

/// Fixed in-memory holidays, for tests and offline demos
#[derive(Debug, Default, Clone)]
pub struct StaticHolidayProvider {
    holidays: HashMap<NaiveDate, String>,
}

impl StaticHolidayProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, date: NaiveDate, name: impl Into<String>) -> Self {
        self.holidays.insert(date, name.into());
        self
    }
}

#[async_trait]
impl HolidayProvider for StaticHolidayProvider {
    async fn lookup(&self, date: NaiveDate) -> Option<String> {
        self.holidays.get(&date).cloned()
    }
}

/// Holidays read once from a two-column CSV of `date,name` rows, the
/// layout of the Cabinet Office `syukujitsu.csv` publication.
///
/// The file must be UTF-8; the official download is Shift-JIS and needs
/// converting first. Decoding is lossy and rows whose date does not
/// parse are skipped, which also covers the header row.
#[derive(Debug, Default, Clone)]
pub struct CsvHolidayProvider {
    holidays: HashMap<NaiveDate, String>,
}

impl CsvHolidayProvider {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            DelidashError::provider_with_source(
                format!("Failed to open holiday file: {}", path.display()),
                e,
            )
        })?;
        let content = String::from_utf8_lossy(&bytes);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut holidays = HashMap::new();
        let mut skipped = 0usize;
        for result in reader.records() {
            let row = match result {
                Ok(row) => row,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };
            let date = row
                .get(0)
                .map(|cell| cell.trim_start_matches('\u{feff}'))
                .and_then(parse_flexible_date);
            let name = row
                .get(1)
                .map(|cell| cell.trim().to_string())
                .filter(|cell| !cell.is_empty());
            match (date, name) {
                (Some(date), Some(name)) => {
                    holidays.insert(date, name);
                }
                _ => skipped += 1,
            }
        }
        if skipped > 1 {
            // One skip is just the header
            warn!(skipped, path = %path.display(), "skipped unreadable holiday rows");
        }
        debug!(holidays = holidays.len(), "holiday file loaded");

        Ok(Self { holidays })
    }
}

#[async_trait]
impl HolidayProvider for CsvHolidayProvider {
    async fn lookup(&self, date: NaiveDate) -> Option<String> {
        self.holidays.get(&date).cloned()
    }
}

//! Data access for delidash: spreadsheet loading, schema discovery,
//! dataset caching, and the weather and holiday providers

pub mod cache;
pub mod holiday;
pub mod loader;
pub mod schema;
pub mod weather;

// Re-export commonly used types
pub use cache::{CacheConfig, CacheMetrics, DatasetCache};
pub use holiday::{CsvHolidayProvider, HolidayProvider, NoHolidays, StaticHolidayProvider};
pub use loader::{DataLoadError, SpreadsheetLoader};
pub use schema::{discover_schema, CATEGORY_COLUMN, DATE_COLUMN};
pub use weather::{
    CsvWeatherProvider, NoWeather, OpenMeteoConfig, OpenMeteoProvider, StaticWeatherProvider,
    WeatherObservation, WeatherProvider,
};

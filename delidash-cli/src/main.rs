//! delidash - Command Line Sales Reports

use anyhow::Result;
use clap::{Parser, Subcommand};
use delidash_common::logging::init_logging;
use delidash_common::{ComparisonBasis, MetricKind, Month, Period, SalesDataset};
use delidash_config::{Config, ConfigLoader};
use delidash_data::{
    CacheConfig, CsvHolidayProvider, CsvWeatherProvider, DatasetCache, HolidayProvider,
    NoHolidays, NoWeather, OpenMeteoConfig, OpenMeteoProvider, SpreadsheetLoader, WeatherProvider,
};
use delidash_report::{
    category_ranking, compare, daily_breakdown, enrich, latest_valid_month, resolve_comparison,
    summarize, valid_months, MetricSelector,
};
use std::time::Duration;
use tracing::{info, warn};

mod render;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Sales reports for the delivery dashboard", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,

    /// Log level, overriding the configured one
    #[arg(short, long)]
    log_level: Option<String>,

    /// Spreadsheet path, overriding the configured one
    #[arg(short, long)]
    data: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the months with recorded activity
    Periods {
        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Platform totals for one month, optionally compared to another
    Summary {
        /// Month to report (YYYY-MM); the latest month with activity when omitted
        #[arg(short, long)]
        month: Option<String>,

        /// Single metric to report (net, gross, app, orders); all four when omitted
        #[arg(long)]
        metric: Option<String>,

        /// Month to compare against (YYYY-MM)
        #[arg(long)]
        compare: Option<String>,

        /// How to pick the comparison month when --compare is absent
        /// (none, previous-month, same-month-last-year)
        #[arg(long)]
        basis: Option<String>,

        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Day-by-day values of one metric for one month
    Daily {
        /// Month to report (YYYY-MM); the latest month with activity when omitted
        #[arg(short, long)]
        month: Option<String>,

        /// Metric to break down (net, gross, app, orders)
        #[arg(long)]
        metric: Option<String>,

        /// Skip weather and holiday annotations
        #[arg(long)]
        plain: bool,

        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Category ranking for one month
    Categories {
        /// Month to report (YYYY-MM); the latest month with activity when omitted
        #[arg(short, long)]
        month: Option<String>,

        /// Metric to rank by (net, gross, app, orders)
        #[arg(long)]
        metric: Option<String>,

        /// Number of categories to list
        #[arg(long)]
        limit: Option<usize>,

        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };

    // Initialize logging; the command line wins over the configured level
    let mut logging = config.logging.to_runtime();
    if let Some(level) = &args.log_level {
        logging.level = level.clone();
    }
    init_logging(logging).map_err(|e| anyhow::anyhow!(e))?;

    info!(version = env!("CARGO_PKG_VERSION"), "starting delidash");

    let data_path = args.data.clone().unwrap_or_else(|| config.data.path.clone());
    let loader = SpreadsheetLoader::new().with_sheet(&config.data.sheet);
    let cache = DatasetCache::new(
        loader,
        CacheConfig::from_settings(config.data.cache_capacity, config.data.cache_ttl_seconds),
    );
    let dataset = cache.get_or_load(&data_path).await?;

    match args.command {
        Command::Periods { json } => run_periods(&dataset, json)?,
        Command::Summary {
            month,
            metric,
            compare: compare_with,
            basis,
            json,
        } => run_summary(&dataset, &config, month, metric, compare_with, basis, json)?,
        Command::Daily {
            month,
            metric,
            plain,
            json,
        } => run_daily(&dataset, &config, month, metric, plain, json).await?,
        Command::Categories {
            month,
            metric,
            limit,
            json,
        } => run_categories(&dataset, &config, month, metric, limit, json)?,
    }

    Ok(())
}

fn run_periods(dataset: &SalesDataset, json: bool) -> Result<()> {
    let months = valid_months(dataset);
    if json {
        println!("{}", serde_json::to_string_pretty(&months)?);
    } else {
        print!("{}", render::period_list(&months)?);
    }
    Ok(())
}

fn run_summary(
    dataset: &SalesDataset,
    config: &Config,
    month: Option<String>,
    metric: Option<String>,
    compare_with: Option<String>,
    basis: Option<String>,
    json: bool,
) -> Result<()> {
    let primary = resolve_month(dataset, month.as_deref())?;
    let selector = match metric.as_deref() {
        Some(keyword) => MetricSelector::One(parse_metric(keyword)?),
        None => MetricSelector::All,
    };
    let primary_summary = summarize(dataset, Period::Month(primary), selector);

    let comparison_month = match compare_with.as_deref() {
        Some(text) => Some(parse_month(text)?),
        None => {
            let basis = parse_basis(basis.as_deref(), config)?;
            resolve_comparison(&valid_months(dataset), primary, basis)
        }
    };

    match comparison_month {
        Some(other) => {
            let comparison_summary = summarize(dataset, Period::Month(other), selector);
            let table = compare(&primary_summary, &comparison_summary);
            if json {
                println!("{}", serde_json::to_string_pretty(&table)?);
            } else {
                print!("{}", render::comparison_table(&table, selector)?);
            }
        }
        None => {
            if json {
                println!("{}", serde_json::to_string_pretty(&primary_summary)?);
            } else {
                print!("{}", render::summary_table(&primary_summary)?);
            }
        }
    }
    Ok(())
}

async fn run_daily(
    dataset: &SalesDataset,
    config: &Config,
    month: Option<String>,
    metric: Option<String>,
    plain: bool,
    json: bool,
) -> Result<()> {
    let month = resolve_month(dataset, month.as_deref())?;
    let metric = match metric.as_deref() {
        Some(keyword) => parse_metric(keyword)?,
        None => config.report.default_metric_kind(),
    };

    let mut breakdown = daily_breakdown(dataset, Period::Month(month), metric);
    if !plain {
        let weather = build_weather_provider(config);
        let holidays = build_holiday_provider(config);
        enrich(&mut breakdown, weather.as_ref(), holidays.as_ref()).await;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&breakdown)?);
    } else {
        print!("{}", render::daily_table(&breakdown)?);
    }
    Ok(())
}

fn run_categories(
    dataset: &SalesDataset,
    config: &Config,
    month: Option<String>,
    metric: Option<String>,
    limit: Option<usize>,
    json: bool,
) -> Result<()> {
    let month = resolve_month(dataset, month.as_deref())?;
    let metric = match metric.as_deref() {
        Some(keyword) => parse_metric(keyword)?,
        None => config.report.default_metric_kind(),
    };
    let limit = limit.unwrap_or(config.report.category_limit);

    let ranking = category_ranking(dataset, Period::Month(month), metric, limit);
    if json {
        println!("{}", serde_json::to_string_pretty(&ranking)?);
    } else {
        print!("{}", render::category_table(&ranking)?);
    }
    Ok(())
}

/// The weather source for daily annotations: a local CSV when one is
/// configured and readable, otherwise the Open-Meteo archive, otherwise
/// nothing. Problems downgrade the provider rather than fail the run.
fn build_weather_provider(config: &Config) -> Box<dyn WeatherProvider> {
    if !config.weather.enabled {
        return Box::new(NoWeather);
    }
    if let Some(file) = &config.weather.file {
        match CsvWeatherProvider::from_path(file) {
            Ok(provider) => return Box::new(provider),
            Err(e) => warn!(error = %e, "weather file unusable, falling back to Open-Meteo"),
        }
    }
    let meteo = OpenMeteoConfig {
        latitude: config.weather.latitude,
        longitude: config.weather.longitude,
        timeout: Duration::from_secs(config.weather.timeout_seconds),
        ..OpenMeteoConfig::default()
    };
    match OpenMeteoProvider::new(meteo) {
        Ok(provider) => Box::new(provider),
        Err(e) => {
            warn!(error = %e, "weather provider unavailable, annotations disabled");
            Box::new(NoWeather)
        }
    }
}

fn build_holiday_provider(config: &Config) -> Box<dyn HolidayProvider> {
    match &config.holidays.file {
        Some(file) => match CsvHolidayProvider::from_path(file) {
            Ok(provider) => Box::new(provider),
            Err(e) => {
                warn!(error = %e, "holiday file unusable, annotations disabled");
                Box::new(NoHolidays)
            }
        },
        None => Box::new(NoHolidays),
    }
}

fn resolve_month(dataset: &SalesDataset, requested: Option<&str>) -> Result<Month> {
    match requested {
        Some(text) => parse_month(text),
        None => latest_valid_month(dataset)
            .ok_or_else(|| anyhow::anyhow!("the sheet has no months with activity")),
    }
}

fn parse_month(text: &str) -> Result<Month> {
    Ok(text.parse::<Month>()?)
}

fn parse_metric(keyword: &str) -> Result<MetricKind> {
    MetricKind::from_keyword(keyword).ok_or_else(|| {
        anyhow::anyhow!(
            "unknown metric '{}', expected net, gross, app or orders",
            keyword
        )
    })
}

fn parse_basis(requested: Option<&str>, config: &Config) -> Result<ComparisonBasis> {
    match requested {
        Some(keyword) => ComparisonBasis::from_keyword(keyword).ok_or_else(|| {
            anyhow::anyhow!(
                "unknown comparison basis '{}', expected none, previous-month or same-month-last-year",
                keyword
            )
        }),
        None => Ok(config.report.default_comparison_basis()),
    }
}

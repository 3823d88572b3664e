//! Pure reporting logic for delidash: period derivation, platform
//! resolution, summaries, comparisons, daily breakdowns and category
//! rankings. Everything here is a pure function of a loaded dataset
//! and the caller's selection; the caller owns all selection state.

pub mod category;
pub mod comparison;
pub mod daily;
pub mod periods;
pub mod platforms;
pub mod summary;

// Re-export commonly used types
pub use category::{category_ranking, CategoryRanking, CategoryRow};
pub use comparison::{compare, ComparisonRow, ComparisonTable, MetricDelta};
pub use daily::{daily_breakdown, enrich, DailyBreakdown, DayCell, DayRow};
pub use periods::{latest_valid_month, resolve_comparison, valid_months};
pub use platforms::{active_platforms, RETIRED_PLATFORM, RETIRED_PLATFORM_FINAL_MONTH};
pub use summary::{summarize, MetricSelector, PlatformSummary, SummaryTable};

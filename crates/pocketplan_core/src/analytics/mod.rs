//! Pure derived views and analytics over record snapshots.
//!
//! # Responsibility
//! - Turn the collections delivered by live queries into aggregates.
//! - Never touch storage; every function here is side-effect free.
//!
//! # Invariants
//! - No derived field is ever NaN or infinite: division by zero resolves to
//!   a documented fallback instead.
//! - "Today" is always an explicit argument.

pub mod period;
pub mod rebalance;
pub mod spending;
pub mod summary;
pub mod tasks;

pub use period::{month_window, week_start, MonthWindow, PeriodError};
pub use rebalance::{allocated_amount, normalize_allocations, Allocation};
pub use spending::{
    category_breakdown, category_ranking, daily_spend, expenses_by_category, savings,
    spent_by_category, total_spent, weekly_spend, CategoryBreakdown, CategoryRank, DailySpend,
    DailySpendSeries, SavingsSummary, TimeRange, WeeklySpend, TRAILING_WEEKS,
};
pub use summary::{summarize, AnalyticsSummary};
pub use tasks::{completed_count, overdue_tasks, pending_count, productivity_score, today_tasks};

/// `numerator / denominator * 100`, or 0 when the denominator is not positive.
pub(crate) fn percent_of(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 && denominator.is_finite() {
        let value = numerator / denominator * 100.0;
        if value.is_finite() {
            return value;
        }
    }
    0.0
}

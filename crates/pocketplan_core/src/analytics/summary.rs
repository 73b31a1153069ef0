//! Dashboard summary combining spend and task analytics.

use super::spending::{
    category_breakdown, savings, weekly_spend, CategoryBreakdown, WeeklySpend, TRAILING_WEEKS,
};
use super::tasks::{completed_count, pending_count, productivity_score};
use crate::model::category::Category;
use crate::model::expense::Expense;
use crate::model::settings::Settings;
use crate::model::task::Task;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_saved: f64,
    pub savings_rate: f64,
    pub category_breakdown: Vec<CategoryBreakdown>,
    pub weekly: Vec<WeeklySpend>,
    pub productivity_score: u32,
    pub completed_tasks: usize,
    pub pending_tasks: usize,
}

/// Builds the summary from month-window `expenses` and all `tasks`.
///
/// A missing settings row means a zero budget.
pub fn summarize(
    settings: Option<&Settings>,
    categories: &[Category],
    expenses: &[Expense],
    tasks: &[Task],
    today: NaiveDate,
) -> AnalyticsSummary {
    let total_budget = settings.map_or(0.0, |settings| settings.total_budget);
    let savings = savings(total_budget, expenses);

    AnalyticsSummary {
        total_budget,
        total_spent: savings.total_spent,
        total_saved: savings.total_saved,
        savings_rate: savings.savings_rate,
        category_breakdown: category_breakdown(categories, expenses),
        weekly: weekly_spend(expenses, today, TRAILING_WEEKS),
        productivity_score: productivity_score(tasks),
        completed_tasks: completed_count(tasks),
        pending_tasks: pending_count(tasks),
    }
}

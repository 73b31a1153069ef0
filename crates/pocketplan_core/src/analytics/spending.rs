//! Spend aggregation over expense snapshots.
//!
//! Category references are weak: an expense whose `category_id` matches no
//! category is excluded from per-category figures but still counts toward
//! totals.

use super::percent_of;
use super::period::week_start;
use crate::model::category::Category;
use crate::model::expense::Expense;
use crate::model::RecordId;
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

/// Number of weekly buckets shown in trend views.
pub const TRAILING_WEEKS: usize = 4;

const UNRESOLVED_CATEGORY_NAME: &str = "Other";

/// Per-category spend figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub category: Category,
    pub spent: f64,
    /// `allocated - spent`; negative when overspent.
    pub remaining: f64,
    /// `spent / allocated * 100`, or 0 when nothing is allocated.
    pub percent_spent: f64,
}

impl CategoryBreakdown {
    pub fn is_overspent(&self) -> bool {
        self.remaining < 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavingsSummary {
    pub total_budget: f64,
    pub total_spent: f64,
    /// `total_budget - total_spent`; negative when over budget.
    pub total_saved: f64,
    /// Saved share of the budget, or 0 when the budget is not positive.
    pub savings_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySpend {
    pub label: String,
    /// Sunday starting the bucket.
    pub start: NaiveDate,
    /// Saturday ending the bucket, inclusive.
    pub end: NaiveDate,
    pub spent: f64,
}

/// Trailing range for the daily spend series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeRange {
    Last7Days,
    Last30Days,
    Last90Days,
}

impl TimeRange {
    pub fn days(self) -> usize {
        match self {
            Self::Last7Days => 7,
            Self::Last30Days => 30,
            Self::Last90Days => 90,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySpend {
    pub day: NaiveDate,
    pub spent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySpendSeries {
    /// One entry per day, oldest first, zero-filled.
    pub days: Vec<DailySpend>,
    pub total: f64,
    pub average_per_day: f64,
    pub highest_day: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRank {
    pub name: String,
    pub spent: f64,
    /// Share of the ranked total, 0 when nothing was spent.
    pub share: f64,
}

/// Sum of amounts for expenses referencing `category_id`.
pub fn spent_by_category(expenses: &[Expense], category_id: RecordId) -> f64 {
    expenses
        .iter()
        .filter(|expense| expense.category_id == category_id)
        .map(|expense| expense.amount)
        .sum()
}

pub fn expenses_by_category(expenses: &[Expense], category_id: RecordId) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|expense| expense.category_id == category_id)
        .cloned()
        .collect()
}

pub fn total_spent(expenses: &[Expense]) -> f64 {
    expenses.iter().map(|expense| expense.amount).sum()
}

pub fn category_breakdown(categories: &[Category], expenses: &[Expense]) -> Vec<CategoryBreakdown> {
    let spent_by_id = spend_index(expenses);
    categories
        .iter()
        .map(|category| {
            let spent = spent_by_id.get(&category.id).copied().unwrap_or(0.0);
            CategoryBreakdown {
                category: category.clone(),
                spent,
                remaining: category.allocated - spent,
                percent_spent: percent_of(spent, category.allocated),
            }
        })
        .collect()
}

pub fn savings(total_budget: f64, expenses: &[Expense]) -> SavingsSummary {
    let total_spent = total_spent(expenses);
    let total_saved = total_budget - total_spent;
    SavingsSummary {
        total_budget,
        total_spent,
        total_saved,
        savings_rate: percent_of(total_saved, total_budget),
    }
}

/// Buckets spend into `weeks` Sunday-aligned weeks ending with the week that
/// contains `today`, oldest first and labelled `Week 1..=weeks`.
pub fn weekly_spend(expenses: &[Expense], today: NaiveDate, weeks: usize) -> Vec<WeeklySpend> {
    let current_week = week_start(today);
    (0..weeks)
        .rev()
        .map(|weeks_back| {
            let start = current_week - Duration::weeks(weeks_back as i64);
            let end = start + Duration::days(6);
            let spent = expenses
                .iter()
                .filter(|expense| {
                    let day = expense.date.date();
                    day >= start && day <= end
                })
                .map(|expense| expense.amount)
                .sum();
            WeeklySpend {
                label: format!("Week {}", weeks - weeks_back),
                start,
                end,
                spent,
            }
        })
        .collect()
}

/// Zero-filled per-day spend for the trailing `range` ending on `today`.
pub fn daily_spend(expenses: &[Expense], today: NaiveDate, range: TimeRange) -> DailySpendSeries {
    let day_count = range.days();
    let first_day = today - Duration::days(day_count as i64 - 1);
    let mut totals = vec![0.0; day_count];
    for expense in expenses {
        let offset = (expense.date.date() - first_day).num_days();
        if (0..day_count as i64).contains(&offset) {
            totals[offset as usize] += expense.amount;
        }
    }

    let total: f64 = totals.iter().sum();
    let highest_day = totals.iter().copied().fold(0.0, f64::max);
    let days = totals
        .into_iter()
        .enumerate()
        .map(|(offset, spent)| DailySpend {
            day: first_day + Duration::days(offset as i64),
            spent,
        })
        .collect();

    DailySpendSeries {
        days,
        total,
        average_per_day: total / day_count as f64,
        highest_day,
    }
}

/// Categories ranked by spend, highest first. Expenses whose category cannot
/// be resolved are grouped under `Other`. `limit = None` keeps every entry.
pub fn category_ranking(
    expenses: &[Expense],
    categories: &[Category],
    limit: Option<usize>,
) -> Vec<CategoryRank> {
    let names: HashMap<RecordId, &str> = categories
        .iter()
        .map(|category| (category.id, category.name.as_str()))
        .collect();

    // `None` collects expenses whose category id resolves to nothing.
    let mut spent_by_category: HashMap<Option<RecordId>, f64> = HashMap::new();
    for expense in expenses {
        let key = names
            .contains_key(&expense.category_id)
            .then_some(expense.category_id);
        *spent_by_category.entry(key).or_insert(0.0) += expense.amount;
    }

    let total: f64 = spent_by_category.values().sum();
    let mut ranked: Vec<CategoryRank> = spent_by_category
        .into_iter()
        .map(|(key, spent)| CategoryRank {
            name: key
                .and_then(|id| names.get(&id).copied())
                .unwrap_or(UNRESOLVED_CATEGORY_NAME)
                .to_string(),
            spent,
            share: percent_of(spent, total),
        })
        .collect();
    ranked.sort_by(|a, b| b.spent.total_cmp(&a.spent).then_with(|| a.name.cmp(&b.name)));
    if let Some(limit) = limit {
        ranked.truncate(limit);
    }
    ranked
}

fn spend_index(expenses: &[Expense]) -> HashMap<RecordId, f64> {
    let mut index = HashMap::new();
    for expense in expenses {
        *index.entry(expense.category_id).or_insert(0.0) += expense.amount;
    }
    index
}

//! Percentage normalization for budget categories.
//!
//! Rebalancing scales every percentage by `100 / sum` and recomputes the
//! absolute allocation as `round(percentage / 100 * total_budget)`. When the
//! percentages sum to zero (or to nothing usable) every category receives an
//! equal share instead.

use serde::Serialize;

/// New allocation for one category, in input order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Allocation {
    pub percentage: f64,
    pub allocated: f64,
}

/// Absolute allocation for a percentage of the budget, rounded to whole units.
pub fn allocated_amount(percentage: f64, total_budget: f64) -> f64 {
    let amount = (percentage / 100.0 * total_budget).round();
    if amount.is_finite() {
        amount
    } else {
        0.0
    }
}

/// Normalizes `percentages` to sum to 100 and allocates `total_budget`.
pub fn normalize_allocations(percentages: &[f64], total_budget: f64) -> Vec<Allocation> {
    if percentages.is_empty() {
        return Vec::new();
    }

    let sum: f64 = percentages.iter().sum();
    let equal_share = 100.0 / percentages.len() as f64;
    percentages
        .iter()
        .map(|&percentage| {
            let normalized = if sum > 0.0 && sum.is_finite() {
                percentage * 100.0 / sum
            } else {
                equal_share
            };
            Allocation {
                percentage: normalized,
                allocated: allocated_amount(normalized, total_budget),
            }
        })
        .collect()
}

//! Expense record.

use super::{require_finite, EpochMillis, ModelValidationError, RecordId};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: RecordId,
    /// Weak reference to a category; may dangle.
    pub category_id: RecordId,
    /// Expected positive, not enforced.
    pub amount: f64,
    pub note: String,
    /// Local wall-clock time the money was spent.
    pub date: NaiveDateTime,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub category_id: RecordId,
    pub amount: f64,
    pub note: String,
    pub date: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePatch {
    pub category_id: Option<RecordId>,
    pub amount: Option<f64>,
    pub note: Option<String>,
    pub date: Option<NaiveDateTime>,
}

impl Expense {
    pub fn apply(&mut self, patch: &ExpensePatch) {
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(note) = patch.note.as_ref() {
            self.note = note.clone();
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_finite("amount", self.amount)
    }
}

impl NewExpense {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_finite("amount", self.amount)
    }
}

//! Application settings record.
//!
//! At most one row is treated as current: the first row by id. A missing row
//! is valid; callers fall back to [`Settings::defaults`].

use super::{require_finite, require_text, EpochMillis, ModelValidationError, RecordId};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TOTAL_BUDGET: f64 = 50_000.0;
pub const DEFAULT_CURRENCY: &str = "INR";
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";
pub const DEFAULT_MONTH_START_DAY: u32 = 1;

/// Persisted settings row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub id: RecordId,
    /// Monthly budget in currency units.
    pub total_budget: f64,
    pub currency: String,
    pub currency_symbol: String,
    /// Day of month (1..=31) on which the budgeting month starts.
    pub month_start_day: u32,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
}

/// Input for creating a settings row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSettings {
    pub total_budget: f64,
    pub currency: String,
    pub currency_symbol: String,
    pub month_start_day: u32,
}

/// Partial settings update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub total_budget: Option<f64>,
    pub currency: Option<String>,
    pub currency_symbol: Option<String>,
    pub month_start_day: Option<u32>,
}

impl Settings {
    /// Values used when no settings row exists yet.
    pub fn defaults() -> NewSettings {
        NewSettings {
            total_budget: DEFAULT_TOTAL_BUDGET,
            currency: DEFAULT_CURRENCY.to_string(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            month_start_day: DEFAULT_MONTH_START_DAY,
        }
    }

    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(total_budget) = patch.total_budget {
            self.total_budget = total_budget;
        }
        if let Some(currency) = patch.currency.as_ref() {
            self.currency = currency.clone();
        }
        if let Some(symbol) = patch.currency_symbol.as_ref() {
            self.currency_symbol = symbol.clone();
        }
        if let Some(day) = patch.month_start_day {
            self.month_start_day = day;
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_fields(
            self.total_budget,
            &self.currency,
            &self.currency_symbol,
            self.month_start_day,
        )
    }
}

impl NewSettings {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_fields(
            self.total_budget,
            &self.currency,
            &self.currency_symbol,
            self.month_start_day,
        )
    }
}

impl Default for NewSettings {
    fn default() -> Self {
        Settings::defaults()
    }
}

fn validate_fields(
    total_budget: f64,
    currency: &str,
    currency_symbol: &str,
    month_start_day: u32,
) -> Result<(), ModelValidationError> {
    require_finite("totalBudget", total_budget)?;
    require_text("currency", currency)?;
    require_text("currencySymbol", currency_symbol)?;
    if !(1..=31).contains(&month_start_day) {
        return Err(ModelValidationError::MonthStartDayOutOfRange(month_start_day));
    }
    Ok(())
}

//! Budget category record.
//!
//! # Invariants
//! - Percentages across categories should sum to 100 and `allocated` should
//!   equal `percentage / 100 * total_budget`, but only the rebalance operation
//!   restores this. Manual edits may break it in between.

use super::{require_color, require_finite, require_text, EpochMillis, ModelValidationError, RecordId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: RecordId,
    pub name: String,
    pub icon: String,
    pub color: String,
    /// Absolute allocation in currency units.
    pub allocated: f64,
    /// Share of the total budget, 0..=100.
    pub percentage: f64,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub allocated: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub allocated: Option<f64>,
    pub percentage: Option<f64>,
}

impl CategoryPatch {
    /// Patch touching only the allocation fields.
    pub fn allocation(percentage: f64, allocated: f64) -> Self {
        Self {
            percentage: Some(percentage),
            allocated: Some(allocated),
            ..Self::default()
        }
    }
}

impl Category {
    pub fn apply(&mut self, patch: &CategoryPatch) {
        if let Some(name) = patch.name.as_ref() {
            self.name = name.clone();
        }
        if let Some(icon) = patch.icon.as_ref() {
            self.icon = icon.clone();
        }
        if let Some(color) = patch.color.as_ref() {
            self.color = color.clone();
        }
        if let Some(allocated) = patch.allocated {
            self.allocated = allocated;
        }
        if let Some(percentage) = patch.percentage {
            self.percentage = percentage;
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_fields(&self.name, &self.color, self.allocated, self.percentage)
    }
}

impl NewCategory {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_fields(&self.name, &self.color, self.allocated, self.percentage)
    }
}

fn validate_fields(
    name: &str,
    color: &str,
    allocated: f64,
    percentage: f64,
) -> Result<(), ModelValidationError> {
    require_text("name", name)?;
    require_color(color)?;
    require_finite("allocated", allocated)?;
    require_finite("percentage", percentage)
}

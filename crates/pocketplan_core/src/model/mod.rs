//! Domain model for the budgeting/task record store.
//!
//! # Responsibility
//! - Define the five persisted record shapes and their partial-update patches.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - `RecordId` is the only identifier type; ids from other layers are
//!   coerced through [`parse_record_id`] before they reach the store.
//! - Cross-record references (`Expense::category_id`, `Task::project_id`) are
//!   weak: they are never validated against the referenced table.

pub mod category;
pub mod expense;
pub mod project;
pub mod settings;
pub mod task;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Auto-incremented integer identifier shared by all tables.
pub type RecordId = i64;

/// Unix epoch milliseconds.
pub type EpochMillis = i64;

/// CSS color syntaxes a UI may hand over: hex (`#rgb`, `#rgba`, `#rrggbb`,
/// `#rrggbbaa`), `rgb()`/`rgba()`/`hsl()`/`hsla()` and named colors.
static CSS_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:#(?:[0-9A-Fa-f]{3,4}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})|(?:rgba?|hsla?)\([^()]*\)|[A-Za-z]+)$",
    )
    .expect("valid css color regex")
});

/// Priority shared by projects and tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Field-level validation failures raised before any SQL mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelValidationError {
    /// A required text field is blank after trim.
    BlankField(&'static str),
    /// A color is not a recognizable CSS color.
    InvalidColor(String),
    /// `completed` and `completed_at` disagree.
    CompletionMismatch { completed: bool },
    /// A numeric field is NaN or infinite.
    NonFiniteNumber(&'static str),
    /// `month_start_day` is outside `1..=31`.
    MonthStartDayOutOfRange(u32),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::InvalidColor(value) => write!(f, "invalid color `{value}`; expected a CSS color"),
            Self::CompletionMismatch { completed } => write!(
                f,
                "completed={completed} requires completed_at to be {}",
                if *completed { "set" } else { "empty" }
            ),
            Self::NonFiniteNumber(field) => write!(f, "`{field}` must be a finite number"),
            Self::MonthStartDayOutOfRange(value) => {
                write!(f, "month start day {value} is outside 1..=31")
            }
        }
    }
}

impl Error for ModelValidationError {}

/// Coerces an identifier received as text into the canonical numeric id.
///
/// Returns `None` for blank or non-numeric input, so a malformed id can never
/// silently match another record.
pub fn parse_record_id(raw: &str) -> Option<RecordId> {
    raw.trim().parse::<RecordId>().ok()
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> EpochMillis {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as EpochMillis)
        .unwrap_or_default()
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn require_color(value: &str) -> Result<(), ModelValidationError> {
    if !CSS_COLOR_RE.is_match(value.trim()) {
        return Err(ModelValidationError::InvalidColor(value.to_string()));
    }
    Ok(())
}

pub(crate) fn require_finite(field: &'static str, value: f64) -> Result<(), ModelValidationError> {
    if !value.is_finite() {
        return Err(ModelValidationError::NonFiniteNumber(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{parse_record_id, require_color, Priority};

    #[test]
    fn parse_record_id_trims_and_rejects_garbage() {
        assert_eq!(parse_record_id(" 42 "), Some(42));
        assert_eq!(parse_record_id("42a"), None);
        assert_eq!(parse_record_id(""), None);
    }

    #[test]
    fn css_colors_are_accepted() {
        for color in ["#84cc16", "#fff", "#84cc16cc", "hsl(84 81% 44%)", "rgba(0, 0, 0, 0.5)", "teal"] {
            assert!(require_color(color).is_ok(), "{color} should be accepted");
        }
        for color in ["84cc16", "#12", "", "url(x) red", "#ggg"] {
            assert!(require_color(color).is_err(), "{color} should be rejected");
        }
    }

    #[test]
    fn priority_round_trips_through_text() {
        for priority in [Priority::Low, Priority::Medium, Priority::High] {
            assert_eq!(Priority::parse(priority.as_str()), Some(priority));
        }
        assert_eq!(Priority::parse("urgent"), None);
    }
}

//! Currency display helper.
//!
//! # Invariants
//! - At most two fraction digits; trailing zeros are trimmed.
//! - Negative amounts render with the sign before the symbol.
//! - Non-finite amounts render as zero.

/// Digit grouping convention for the integer part.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DigitGrouping {
    /// `12,34,567`: last three digits, then pairs.
    #[default]
    Indian,
    /// `1,234,567`.
    Western,
}

/// Formats `amount` prefixed by `symbol` with Indian digit grouping.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    format_currency_with(amount, symbol, DigitGrouping::Indian)
}

pub fn format_currency_with(amount: f64, symbol: &str, grouping: DigitGrouping) -> String {
    if !amount.is_finite() {
        return format!("{symbol}0");
    }

    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = group_digits(&(cents / 100).to_string(), grouping);
    let fraction = match cents % 100 {
        0 => String::new(),
        value if value % 10 == 0 => format!(".{}", value / 10),
        value => format!(".{value:02}"),
    };
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };

    format!("{sign}{symbol}{whole}{fraction}")
}

fn group_digits(digits: &str, grouping: DigitGrouping) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let head_group = match grouping {
        DigitGrouping::Indian => 2,
        DigitGrouping::Western => 3,
    };

    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(head_group);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

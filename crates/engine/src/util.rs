//! Internal helpers for validation and derivation.
//!
//! These utilities are **not** part of the public API, except
//! [`period_code_for`], which callers use to compute the period a date falls
//! into.

use chrono::{Datelike, NaiveDate};
use unicode_normalization::UnicodeNormalization;

use crate::{EngineError, ResultEngine};

/// Highest accepted period start day, so every month contains it.
pub(crate) const MAX_PERIOD_DAY: u32 = 28;

/// Trim, NFKC-normalize and collapse inner whitespace of a category name.
pub(crate) fn normalize_category_display(value: &str) -> ResultEngine<String> {
    let normalized: String = value.nfkc().collect();
    let display = normalized.split_whitespace().collect::<Vec<_>>().join(" ");
    if display.is_empty() {
        return Err(EngineError::InvalidName(
            "category name must not be empty".to_string(),
        ));
    }
    Ok(display)
}

/// Comparison key of a category name.
pub(crate) fn normalize_category_key(display: &str) -> String {
    display.to_lowercase()
}

pub(crate) fn validate_period_day(day: u32) -> ResultEngine<u32> {
    if (1..=MAX_PERIOD_DAY).contains(&day) {
        Ok(day)
    } else {
        Err(EngineError::InvalidPeriod(format!(
            "period start day must be between 1 and {MAX_PERIOD_DAY}, got {day}"
        )))
    }
}

/// Returns the `"YYYY-MM"` code of the period containing `date`.
///
/// A period starts on `start_day` of a month and runs until the day before
/// `start_day` of the next one; it is named after the month it starts in.
///
/// ```rust
/// use chrono::NaiveDate;
/// use engine::period_code_for;
///
/// let date = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
/// assert_eq!(period_code_for(date, 1), "2024-05");
/// assert_eq!(period_code_for(date, 25), "2024-04");
/// ```
#[must_use]
pub fn period_code_for(date: NaiveDate, start_day: u32) -> String {
    let (year, month) = if date.day() >= start_day {
        (date.year(), date.month())
    } else if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    };
    format!("{year:04}-{month:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn category_display_is_trimmed_and_nfkc() {
        assert_eq!(
            normalize_category_display("  Bank \t Account ").unwrap(),
            "Bank Account"
        );
        // Fullwidth letters fold to ASCII.
        assert_eq!(normalize_category_display("Ｆｏｏｄ").unwrap(), "Food");
        assert!(matches!(
            normalize_category_display("   "),
            Err(EngineError::InvalidName(_))
        ));
        assert_eq!(normalize_category_key("Bank Account"), "bank account");
    }

    #[test]
    fn period_day_bounds() {
        assert!(validate_period_day(1).is_ok());
        assert!(validate_period_day(28).is_ok());
        assert!(matches!(
            validate_period_day(0),
            Err(EngineError::InvalidPeriod(_))
        ));
        assert!(matches!(
            validate_period_day(29),
            Err(EngineError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn period_code_before_start_day_is_previous_month() {
        assert_eq!(period_code_for(ymd(2024, 5, 24), 25), "2024-04");
        assert_eq!(period_code_for(ymd(2024, 5, 25), 25), "2024-05");
        assert_eq!(period_code_for(ymd(2024, 1, 3), 10), "2023-12");
        assert_eq!(period_code_for(ymd(2024, 12, 31), 1), "2024-12");
    }
}

//! Parse-with-default boundary for values arriving from forms or documents.
//!
//! Unparsable or missing input becomes zero (counts, areas, prices) or "no
//! value" (override fields). None of these functions fail.

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

fn normalize(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Finite number or `None`. Accepts a decimal comma and digit-group spaces.
pub fn optional_number(raw: &str) -> Option<f64> {
    let cleaned = normalize(raw);
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Number, zero when unparsable.
pub fn number(raw: &str) -> f64 {
    optional_number(raw).unwrap_or(0.0)
}

/// Length or area; negative input clamps to zero.
pub fn non_negative(raw: &str) -> f64 {
    number(raw).max(0.0)
}

/// Percentage clamped into [0, 100].
pub fn percent(raw: &str) -> f64 {
    number(raw).clamp(0.0, 100.0)
}

/// Whole non-negative count; fractions are truncated.
pub fn count(raw: &str) -> u32 {
    let n = number(raw);
    if n <= 0.0 {
        0
    } else if n >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        n.trunc() as u32
    }
}

/// Non-negative money amount, parsed exactly when written as a plain decimal.
pub fn money(raw: &str) -> Decimal {
    let cleaned = normalize(raw);
    let parsed = Decimal::from_str(&cleaned)
        .ok()
        .or_else(|| optional_number(raw).and_then(Decimal::from_f64))
        .unwrap_or(Decimal::ZERO);
    parsed.max(Decimal::ZERO)
}

/// Checkbox-style flag.
pub fn flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on" | "y" | "x"
    )
}

/// ISO date (`YYYY-MM-DD`), `None` otherwise.
pub fn date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn numbers_fall_back_to_zero() {
        assert_eq!(number("12.5"), 12.5);
        assert_eq!(number(" 12,5 "), 12.5);
        assert_eq!(number("1 250,75"), 1250.75);
        assert_eq!(number(""), 0.0);
        assert_eq!(number("n/a"), 0.0);
        assert_eq!(number("NaN"), 0.0);
        assert_eq!(number("inf"), 0.0);
        assert_eq!(non_negative("-3"), 0.0);
        assert_eq!(percent("140"), 100.0);
    }

    #[test]
    fn optional_values_stay_absent() {
        assert_eq!(optional_number(""), None);
        assert_eq!(optional_number("abc"), None);
        assert_eq!(optional_number("0"), Some(0.0));
    }

    #[test]
    fn counts_truncate_and_clamp() {
        assert_eq!(count("4"), 4);
        assert_eq!(count("4.9"), 4);
        assert_eq!(count("-2"), 0);
        assert_eq!(count("many"), 0);
    }

    #[test]
    fn money_is_exact() {
        assert_eq!(money("84"), Decimal::new(84, 0));
        assert_eq!(money("73,48"), Decimal::new(7348, 2));
        assert_eq!(money("-5"), Decimal::ZERO);
        assert_eq!(money("?"), Decimal::ZERO);
    }

    #[test]
    fn flags_and_dates() {
        assert!(flag("true"));
        assert!(flag(" On "));
        assert!(!flag("0"));
        assert!(!flag(""));
        assert_eq!(date("2026-03-01"), NaiveDate::from_ymd_opt(2026, 3, 1));
        assert_eq!(date("03/01/2026"), None);
    }

    proptest! {
        #[test]
        fn number_never_panics_and_is_finite(s in ".*") {
            prop_assert!(number(&s).is_finite());
            prop_assert!(money(&s) >= Decimal::ZERO);
        }
    }
}

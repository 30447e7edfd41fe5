//! Money normalization: user-entered currency text to whole-unit integers and back.
//!
//! Amounts inside the ledger are whole currency units (`i64`); there are no
//! fractional cents in this domain. Rounding happens once, in
//! [`AmountInput::canonical`], when a value crosses from user input into the ledger.

use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};

/// Display preferences for rendering whole-unit amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoneyFormat {
    pub prefix: String,
    pub grouping_separator: char,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            prefix: "Rp".into(),
            grouping_separator: '.',
        }
    }
}

/// An amount as it arrives from a client: either a JSON number or formatted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    /// Converts the raw input into the ledger's canonical whole-unit amount.
    ///
    /// Numbers are rounded half-up; text is stripped to its digits.
    pub fn canonical(&self) -> Result<i64> {
        match self {
            AmountInput::Number(value) => round_half_up(*value),
            AmountInput::Text(raw) => Ok(to_canonical_amount(raw)),
        }
    }
}

impl From<i64> for AmountInput {
    fn from(value: i64) -> Self {
        AmountInput::Number(value as f64)
    }
}

impl From<f64> for AmountInput {
    fn from(value: f64) -> Self {
        AmountInput::Number(value)
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        AmountInput::Text(value.to_string())
    }
}

/// Strips every non-digit character and parses the remainder.
///
/// Returns 0 for empty or unparseable input; never fails.
pub fn to_canonical_amount(raw: &str) -> i64 {
    let digits: String = raw.chars().filter(|ch| ch.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    digits.parse::<i64>().unwrap_or(0)
}

/// Renders an amount as `"Rp 1.250.000"`; zero or absent renders as an empty string.
pub fn to_display_amount(amount: impl Into<Option<i64>>, format: &MoneyFormat) -> String {
    match amount.into() {
        None | Some(0) => String::new(),
        Some(value) => format_currency(value, format),
    }
}

/// Renders an amount including zero (`"Rp 0"`), for totals and balances.
pub fn format_currency(amount: i64, format: &MoneyFormat) -> String {
    let grouped = group_digits(&amount.unsigned_abs().to_string(), format.grouping_separator);
    if amount < 0 {
        format!("-{} {}", format.prefix, grouped)
    } else {
        format!("{} {}", format.prefix, grouped)
    }
}

/// Rounds half-up to the nearest whole unit (`150000.75 -> 150001`, `2.5 -> 3`).
pub fn round_half_up(value: f64) -> Result<i64> {
    if !value.is_finite() {
        return Err(LedgerError::validation("amount", "must be a finite number"));
    }
    let rounded = (value + 0.5).floor();
    if rounded > i64::MAX as f64 || rounded < i64::MIN as f64 {
        return Err(LedgerError::validation("amount", "is out of range"));
    }
    Ok(rounded as i64)
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_amount_strips_prefix_and_separators() {
        assert_eq!(to_canonical_amount("Rp 1.250.000"), 1_250_000);
        assert_eq!(to_canonical_amount("50.000"), 50_000);
        assert_eq!(to_canonical_amount(""), 0);
        assert_eq!(to_canonical_amount("abc"), 0);
    }

    #[test]
    fn canonical_amount_never_fails_on_overflow() {
        assert_eq!(to_canonical_amount("99999999999999999999999"), 0);
    }

    #[test]
    fn display_amount_hides_zero_and_absent_values() {
        let format = MoneyFormat::default();
        assert_eq!(to_display_amount(1_250_000, &format), "Rp 1.250.000");
        assert_eq!(to_display_amount(0, &format), "");
        assert_eq!(to_display_amount(None::<i64>, &format), "");
        assert_eq!(to_display_amount(999, &format), "Rp 999");
    }

    #[test]
    fn display_then_canonical_returns_original_amount() {
        let format = MoneyFormat::default();
        for amount in [0, 1, 999, 1_000, 10_000, 1_250_000, 987_654_321] {
            assert_eq!(to_canonical_amount(&to_display_amount(amount, &format)), amount);
        }
    }

    #[test]
    fn round_half_up_matches_boundary_policy() {
        assert_eq!(round_half_up(150_000.75).unwrap(), 150_001);
        assert_eq!(round_half_up(150_000.5).unwrap(), 150_001);
        assert_eq!(round_half_up(150_000.49).unwrap(), 150_000);
        assert!(round_half_up(f64::NAN).is_err());
    }

    #[test]
    fn amount_input_accepts_numbers_and_formatted_text() {
        let number: AmountInput = serde_json::from_str("30000.6").unwrap();
        let text: AmountInput = serde_json::from_str("\"Rp 30.000\"").unwrap();
        assert_eq!(number.canonical().unwrap(), 30_001);
        assert_eq!(text.canonical().unwrap(), 30_000);
    }
}

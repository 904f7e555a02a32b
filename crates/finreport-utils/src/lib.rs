//! Utility functions and helpers

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;
use std::str::FromStr;
use thiserror::Error;

/// Format an integer string with thousands separators, keeping a leading sign
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, digits) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };

    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.push_str(sign);
    result.chars().rev().collect()
}

/// Round to a whole number (half to even) and format with thousands separators
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    // -0.4 rounds to -0, which should print as 0
    let rounded = if rounded.is_zero() { Decimal::ZERO } else { rounded };
    format_number(rounded.trunc().normalize())
}

/// Amount parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount out of range: {0}")]
    OutOfRange(String),
}

/// Parse a decimal from free-form text.
///
/// Accepts plain and scientific notation, ignores surrounding whitespace.
/// Text that is not a number yields `None`; a finite number too large for
/// `Decimal` is an error rather than a silent zero.
pub fn parse_decimal(text: &str) -> Result<Option<Decimal>, AmountError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    if let Ok(value) = Decimal::from_str(text).or_else(|_| Decimal::from_scientific(text)) {
        return Ok(Some(value));
    }
    match text.parse::<f64>() {
        Ok(float) if float.is_finite() => Decimal::from_f64(float)
            .map(Some)
            .ok_or_else(|| AmountError::OutOfRange(text.to_string())),
        _ => Ok(None),
    }
}

/// Parse a JSON value as a decimal amount
pub fn decimal_from_value(value: &Value) -> Result<Option<Decimal>, AmountError> {
    match value {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(s),
        _ => Ok(None),
    }
}

/// Parse a JSON value as a decimal; anything that is not a number becomes zero
pub fn decimal_or_zero(value: &Value) -> Result<Decimal, AmountError> {
    Ok(decimal_from_value(value)?.unwrap_or(Decimal::ZERO))
}

/// Keep at most `max` characters of `text`
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Generate a unique ID
pub fn generate_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("{}", now)
}

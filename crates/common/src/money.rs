//! Money helpers. Amounts are held as integer pence and rendered with two decimals.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("invalid amount: {0}")]
    Invalid(String),
    #[error("amount must not be negative")]
    Negative,
}

/// Price as accepted on the wire: either `"25.00"` or `25` / `25.5`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Text(String),
    Number(f64),
}

impl Amount {
    pub fn to_pence(&self) -> Result<i32, MoneyError> {
        match self {
            Amount::Text(s) => parse_pence(s),
            Amount::Number(n) => {
                if !n.is_finite() {
                    return Err(MoneyError::Invalid(n.to_string()));
                }
                if *n < 0.0 {
                    return Err(MoneyError::Negative);
                }
                let pence = (n * 100.0).round();
                if pence > i32::MAX as f64 {
                    return Err(MoneyError::Invalid(n.to_string()));
                }
                Ok(pence as i32)
            }
        }
    }
}

/// Parse `"25"`, `"25.5"`, `"25.50"` or `"£25.50"` into pence.
pub fn parse_pence(input: &str) -> Result<i32, MoneyError> {
    let s = input.trim().trim_start_matches('£').trim();
    if s.starts_with('-') {
        return Err(MoneyError::Negative);
    }
    let invalid = || MoneyError::Invalid(input.to_string());
    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if frac.len() > 2 || !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => frac.parse().map_err(|_| invalid())?,
    };
    let pence = whole.checked_mul(100).and_then(|w| w.checked_add(frac)).ok_or_else(invalid)?;
    i32::try_from(pence).map_err(|_| invalid())
}

/// `2500` -> `"25.00"`
pub fn format_pence(pence: i64) -> String {
    let sign = if pence < 0 { "-" } else { "" };
    let abs = pence.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// `2500, "£"` -> `"£25.00"`
pub fn format_with_symbol(pence: i64, symbol: &str) -> String {
    format!("{}{}", symbol, format_pence(pence))
}

//! Money value object in minor units.
//!
//! Amounts are stored as integer kopecks/cents. The gateway speaks decimal
//! strings with two fraction digits ("990.00"), so conversion lives here.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ValidationError;

/// A non-negative amount in minor units with an ISO 4217 currency code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount_minor: i64,
    currency: String,
}

impl Money {
    /// Creates an amount, normalising the currency code to upper case.
    pub fn new(amount_minor: i64, currency: impl AsRef<str>) -> Result<Self, ValidationError> {
        if amount_minor < 0 {
            return Err(ValidationError::out_of_range(
                "amount",
                0,
                i64::MAX,
                amount_minor,
            ));
        }
        let currency = currency.as_ref().trim().to_ascii_uppercase();
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(ValidationError::invalid_format(
                "currency",
                "expected a three-letter ISO 4217 code",
            ));
        }
        Ok(Self {
            amount_minor,
            currency,
        })
    }

    /// Parses the gateway's decimal representation, e.g. `"990.00"`.
    pub fn from_gateway_value(value: &str, currency: &str) -> Result<Self, ValidationError> {
        let value = value.trim();
        let (whole, fraction) = match value.split_once('.') {
            Some((w, f)) => (w, f),
            None => (value, ""),
        };

        if whole.is_empty()
            || !whole.chars().all(|c| c.is_ascii_digit())
            || fraction.len() > 2
            || !fraction.chars().all(|c| c.is_ascii_digit())
        {
            return Err(ValidationError::invalid_format(
                "amount",
                format!("'{}' is not a decimal amount", value),
            ));
        }

        let whole: i64 = whole
            .parse()
            .map_err(|_| ValidationError::invalid_format("amount", "amount too large"))?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().unwrap_or(0) * 10,
            _ => fraction.parse::<i64>().unwrap_or(0),
        };

        let minor = whole
            .checked_mul(100)
            .and_then(|w| w.checked_add(fraction))
            .ok_or_else(|| ValidationError::invalid_format("amount", "amount too large"))?;

        Self::new(minor, currency)
    }

    /// Renders the amount the way the gateway expects it.
    pub fn to_gateway_value(&self) -> String {
        format!("{}.{:02}", self.amount_minor / 100, self.amount_minor % 100)
    }

    pub fn amount_minor(&self) -> i64 {
        self.amount_minor
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.to_gateway_value(), self.currency)
    }
}

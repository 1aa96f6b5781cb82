//! Monetary values as they arrive over the wire.

use serde::{Deserialize, Serialize};

use crate::amount::{Amount, AmountError, Rounding};

/// A monetary field that the backend may send either as a JSON number or as a
/// decimal string (to preserve precision).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MoneyValue {
    Number(f64),
    Text(String),
}

impl MoneyValue {
    /// Coerce into a fixed-point [`Amount`].
    pub fn to_amount(&self) -> Result<Amount, AmountError> {
        match self {
            MoneyValue::Number(value) => Amount::from_float(*value),
            MoneyValue::Text(text) => text.parse(),
        }
    }

    /// Coerce with explicit handling of digits past the fourth decimal.
    pub fn to_amount_with(&self, rounding: Rounding) -> Result<Amount, AmountError> {
        match self {
            MoneyValue::Number(value) => Amount::from_float_with(*value, rounding),
            MoneyValue::Text(text) => Amount::parse_with(text, rounding),
        }
    }
}

impl Default for MoneyValue {
    fn default() -> Self {
        MoneyValue::Number(0.0)
    }
}

impl From<f64> for MoneyValue {
    fn from(value: f64) -> Self {
        MoneyValue::Number(value)
    }
}

impl From<&str> for MoneyValue {
    fn from(value: &str) -> Self {
        MoneyValue::Text(value.to_string())
    }
}

impl From<String> for MoneyValue {
    fn from(value: String) -> Self {
        MoneyValue::Text(value)
    }
}

impl From<Amount> for MoneyValue {
    fn from(value: Amount) -> Self {
        MoneyValue::Text(value.to_string())
    }
}

impl From<&MoneyValue> for MoneyValue {
    fn from(value: &MoneyValue) -> Self {
        value.clone()
    }
}

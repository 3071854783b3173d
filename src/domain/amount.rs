use crate::error::PaymentError;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A strictly positive monetary amount in the storefront's single currency (BRL).
///
/// This is a wrapper around `rust_decimal::Decimal` so that a value which made it
/// past validation can never be zero, negative, or non-numeric.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Amount(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::InvalidAmount)
        }
    }

    /// Coerces a raw JSON value (number or numeric string) into an amount.
    pub fn from_json(raw: &Value) -> Result<Self, PaymentError> {
        match raw {
            Value::Number(n) => n.to_string().parse(),
            Value::String(s) => s.parse(),
            _ => Err(PaymentError::InvalidAmount),
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.contains('_') {
            return Err(PaymentError::InvalidAmount);
        }
        let value = Decimal::from_str(s)
            .or_else(|_| Decimal::from_scientific(s))
            .map_err(|_| PaymentError::InvalidAmount)?;
        Self::new(value)
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

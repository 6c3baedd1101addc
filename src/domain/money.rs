//! Money type
//!
//! Domain primitive for monetary inputs with validation at construction time.
//! Game money is tracked to two decimal places; invalid values cannot enter
//! the system.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum tracked sum (one hundred million)
const MAX_MONEY: &str = "100000000";

/// Maximum decimal places (cents)
const MAX_SCALE: u32 = 2;

/// Money represents a validated monetary value supplied by a moderator.
///
/// # Invariants
/// - Value is never negative (zero is allowed: change can be zero)
/// - Maximum 2 decimal places
/// - Capped at 100 million
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(Decimal);

/// Errors that can occur when creating a Money value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoneyError {
    #[error("Money must not be negative (got {0})")]
    Negative(Decimal),

    #[error("Money has too many decimal places (max {MAX_SCALE}, got {0})")]
    TooManyDecimals(u32),

    #[error("Money exceeds maximum allowed value ({MAX_MONEY})")]
    Overflow,

    #[error("Invalid money format: {0}")]
    ParseError(String),
}

impl Money {
    /// Create a new Money value with validation.
    ///
    /// # Errors
    /// - `MoneyError::Negative` if value < 0
    /// - `MoneyError::TooManyDecimals` if more than 2 decimal places
    /// - `MoneyError::Overflow` if value > 100 million
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO {
            return Err(MoneyError::Negative(value));
        }

        if value.scale() > MAX_SCALE {
            return Err(MoneyError::TooManyDecimals(value.scale()));
        }

        let max = Decimal::from_str(MAX_MONEY).expect("Invalid MAX_MONEY constant");
        if value > max {
            return Err(MoneyError::Overflow);
        }

        Ok(Self(value))
    }

    /// Create a Money value from an integer.
    pub fn from_integer(value: i64) -> Result<Self, MoneyError> {
        Self::new(Decimal::from(value))
    }

    /// Zero money.
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Check whether this sum covers a required total.
    pub fn covers(&self, required: Decimal) -> bool {
        self.0 >= required
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s).map_err(|e| MoneyError::ParseError(e.to_string()))?;
        Money::new(decimal)
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Money::from_str(&value)
    }
}

impl From<Money> for String {
    fn from(money: Money) -> Self {
        format!("{:.2}", money.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_positive() {
        let money = Money::new(dec!(100));
        assert!(money.is_ok());
        assert_eq!(money.unwrap().value(), dec!(100));
    }

    #[test]
    fn test_money_zero_allowed() {
        let money = Money::new(Decimal::ZERO);
        assert!(money.is_ok());
    }

    #[test]
    fn test_money_negative_rejected() {
        let money = Money::new(dec!(-0.01));
        assert!(matches!(money, Err(MoneyError::Negative(_))));
    }

    #[test]
    fn test_money_too_many_decimals() {
        let money = Money::new(dec!(1.005));
        assert!(matches!(money, Err(MoneyError::TooManyDecimals(3))));
    }

    #[test]
    fn test_money_max_decimals_ok() {
        let money = Money::new(dec!(1.05));
        assert!(money.is_ok());
    }

    #[test]
    fn test_money_overflow() {
        let money = Money::new(dec!(100000000.01));
        assert!(matches!(money, Err(MoneyError::Overflow)));
    }

    #[test]
    fn test_money_from_str() {
        let money: Result<Money, _> = "123.45".parse();
        assert!(money.is_ok());
        assert_eq!(money.unwrap().value(), dec!(123.45));

        let bad: Result<Money, _> = "abc".parse();
        assert!(matches!(bad, Err(MoneyError::ParseError(_))));
    }

    #[test]
    fn test_money_covers() {
        let payment = Money::new(dec!(150)).unwrap();
        assert!(payment.covers(dec!(150)));
        assert!(payment.covers(dec!(149.99)));
        assert!(!payment.covers(dec!(150.01)));
    }
}

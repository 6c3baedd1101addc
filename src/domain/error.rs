//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use thiserror::Error;

/// Business rule violations raised by the engines.
///
/// These are independent of the web/persistence layer. Every engine operation
/// either fully applies its effect or, on error, applies none.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Offered money does not cover the computed total
    #[error("Insufficient funds: required {required}, offered {offered}")]
    InsufficientFunds {
        required: rust_decimal::Decimal,
        offered: rust_decimal::Decimal,
    },

    /// Quantity must be at least one
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i32),

    /// Negative or otherwise unusable money input
    #[error("Invalid amount: {0}")]
    InvalidAmount(rust_decimal::Decimal),

    /// Credit term outside the allowed 2..=6 installments
    #[error("Invalid credit term: {0} (allowed 2..=6)")]
    InvalidTerm(i32),

    /// Operation on a dismissed privateer license
    #[error("Privateer license is not active: {0}")]
    InactivePrivateer(String),
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(
        required: rust_decimal::Decimal,
        offered: rust_decimal::Decimal,
    ) -> Self {
        Self::InsufficientFunds { required, offered }
    }

    /// Shortfall the moderator should report back to the player.
    pub fn shortfall(&self) -> Option<rust_decimal::Decimal> {
        match self {
            Self::InsufficientFunds { required, offered } => Some(required - offered),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_error() {
        let err = DomainError::insufficient_funds(dec!(100), dec!(70));
        assert_eq!(err.shortfall(), Some(dec!(30)));
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("70"));
    }

    #[test]
    fn test_shortfall_only_for_funds() {
        assert_eq!(DomainError::InvalidQuantity(0).shortfall(), None);
    }
}

//! Posting error types.

use rust_decimal::Decimal;
use thiserror::Error;

use coopra_shared::types::LedgerEntryId;

/// Errors that can occur while computing or building a ledger posting.
#[derive(Debug, Error)]
pub enum PostingError {
    /// Posting amount cannot be zero.
    #[error("Posting amount cannot be zero")]
    InvalidAmount,

    /// Withdrawal exceeds the current account balance.
    #[error("Insufficient balance: have {balance}, requested {requested}")]
    InsufficientBalance {
        /// The balance at the time of the check.
        balance: Decimal,
        /// The amount the caller tried to take out.
        requested: Decimal,
    },

    /// The entry has already been reversed once.
    #[error("Ledger entry {0} has already been reversed")]
    AlreadyReversed(LedgerEntryId),

    /// Unknown account classification string from storage.
    #[error("Unknown account type: {0}")]
    UnknownAccountType(String),

    /// Posting currency does not match the account currency.
    #[error("Currency mismatch: account is {account}, posting is {posting}")]
    CurrencyMismatch {
        /// The account's currency code.
        account: String,
        /// The posting's currency code.
        posting: String,
    },
}

impl PostingError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::AlreadyReversed(_) => "ALREADY_REVERSED",
            Self::UnknownAccountType(_) => "UNKNOWN_ACCOUNT_TYPE",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_codes() {
        assert_eq!(PostingError::InvalidAmount.error_code(), "INVALID_AMOUNT");
        assert_eq!(
            PostingError::InsufficientBalance {
                balance: dec!(10),
                requested: dec!(20),
            }
            .error_code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(
            PostingError::AlreadyReversed(LedgerEntryId::new()).error_code(),
            "ALREADY_REVERSED"
        );
    }

    #[test]
    fn test_error_display() {
        let err = PostingError::InsufficientBalance {
            balance: dec!(100.00),
            requested: dec!(150.00),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient balance: have 100.00, requested 150.00"
        );
    }
}

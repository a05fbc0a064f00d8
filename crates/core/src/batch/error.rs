//! Batch error types.

use thiserror::Error;

use coopra_shared::types::{BranchId, Currency, TransactionBatchId, UserId};

use super::types::BatchState;

/// Errors that can occur during batch lifecycle operations.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The teller already has an open batch.
    #[error("User {0} already has an open transaction batch")]
    AlreadyOpen(UserId),

    /// No cash variance account is configured for the branch and currency.
    #[error("No variance account configured for branch {branch_id} in {currency}")]
    MissingVarianceAccount {
        /// The branch missing the mapping.
        branch_id: BranchId,
        /// The currency missing the mapping.
        currency: Currency,
    },

    /// The batch has already been closed.
    #[error("Transaction batch {0} is already closed")]
    AlreadyClosed(TransactionBatchId),

    /// The acting teller has no open batch to post against.
    #[error("No active transaction batch for the current teller")]
    NoActiveBatch,

    /// The requested state transition is not allowed.
    #[error("Invalid batch transition from {from} to {to}")]
    InvalidTransition {
        /// The current state.
        from: BatchState,
        /// The requested state.
        to: BatchState,
    },

    /// Batch not found.
    #[error("Transaction batch not found: {0}")]
    NotFound(TransactionBatchId),
}

impl BatchError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::AlreadyOpen(_) => "BATCH_ALREADY_OPEN",
            Self::MissingVarianceAccount { .. } => "MISSING_VARIANCE_ACCOUNT",
            Self::AlreadyClosed(_) => "BATCH_ALREADY_CLOSED",
            Self::NoActiveBatch => "NO_ACTIVE_BATCH",
            Self::InvalidTransition { .. } => "INVALID_BATCH_TRANSITION",
            Self::NotFound(_) => "BATCH_NOT_FOUND",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::AlreadyOpen(_) => 409,
            Self::MissingVarianceAccount { .. } => 500,
            Self::AlreadyClosed(_) | Self::InvalidTransition { .. } => 400,
            Self::NoActiveBatch => 422,
            Self::NotFound(_) => 404,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            BatchError::AlreadyOpen(UserId::new()).error_code(),
            "BATCH_ALREADY_OPEN"
        );
        assert_eq!(BatchError::NoActiveBatch.error_code(), "NO_ACTIVE_BATCH");
        assert_eq!(
            BatchError::AlreadyClosed(TransactionBatchId::new()).error_code(),
            "BATCH_ALREADY_CLOSED"
        );
    }

    #[test]
    fn test_http_status_codes() {
        assert_eq!(BatchError::AlreadyOpen(UserId::new()).http_status_code(), 409);
        assert_eq!(
            BatchError::NotFound(TransactionBatchId::new()).http_status_code(),
            404
        );
        assert_eq!(
            BatchError::MissingVarianceAccount {
                branch_id: BranchId::new(),
                currency: Currency::Php,
            }
            .http_status_code(),
            500
        );
    }
}

//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Operations that must share a database transaction take a
//! connection generically, so the payment orchestrator can run them inside
//! its own transaction boundary.

pub mod account;
pub mod batch;
pub mod payment;
pub mod receipt;

pub use account::{AccountError, AccountRepository};
pub use batch::{
    BatchRepoError, CheckRemittanceInput, OnlineRemittanceInput, StartBatchInput,
    TransactionBatchRepository,
};
pub use payment::{
    MultiPaymentOutcome, PaymentError, PaymentEvent, PaymentRepository, ReverseTarget,
    TransactionMode,
};
pub use receipt::{ReceiptAllocator, ReceiptError};

use sea_orm::DbErr;

/// Returns true when a database error is a unique-constraint violation on
/// the named constraint or index.
///
/// The database serializes racing writers; the loser surfaces here and is
/// mapped to the matching typed error by the caller.
pub(crate) fn is_unique_violation(err: &DbErr, constraint: &str) -> bool {
    let message = err.to_string();
    (message.contains("duplicate key") || message.contains("unique constraint"))
        && message.contains(constraint)
}

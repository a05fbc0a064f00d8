//! Teller transaction batch lifecycle and reconciliation.
//!
//! A batch is the cash-handling session of one teller: it is seeded with a
//! beginning balance, collects every posting made while it is open, and must
//! reconcile its supposed against its actual remittance when it is closed
//! and reviewed.

pub mod error;
pub mod lifecycle;
pub mod projection;
pub mod reconcile;
pub mod types;

pub use error::BatchError;
pub use lifecycle::{BatchLifecycle, EndAction, ViewAction};
pub use projection::{BatchProjection, BatchView, MinimalBatchView};
pub use reconcile::{BatchEntryLine, EntrySums, Reconciliation, RemittanceSums};
pub use types::{
    BatchState, BatchTotals, CashCountLine, CloseBatchInput, SignOff, SignOffSheet,
    TransactionBatch,
};

//! Ledger posting logic.
//!
//! This module implements the teller-facing side of the general ledger:
//! - Account classifications and the debit/credit sign policy
//! - Draft and posted ledger entry domain types
//! - The posting service (forward posting and exact reversal)
//! - Error types for posting operations

pub mod entry;
pub mod error;
pub mod service;
pub mod sign;

pub use entry::{DraftEntry, EntrySource, PostedEntry};
pub use error::PostingError;
pub use service::{AccountRef, PostInput, PostingService};
pub use sign::{AccountType, OperationKind, SignEffect, SignPolicy};

//! Ledger entry domain types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use coopra_shared::types::{
    AccountId, BranchId, Currency, LedgerEntryId, MemberProfileId, OrganizationId,
    TransactionBatchId, TransactionId, UserId,
};

/// The operation a ledger entry originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Cash deposit.
    Deposit,
    /// Cash withdrawal.
    Withdraw,
    /// Loan or receivable payment.
    Payment,
    /// Manual correcting entry.
    Adjustment,
    /// Petty cash disbursement.
    PettyCash,
    /// Loan release.
    LoanRelease,
}

/// A ledger entry computed by the posting service but not yet persisted.
///
/// Persistence and batch linkage are the payment orchestrator's job; keeping
/// the draft free of side effects makes the posting math independently
/// testable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DraftEntry {
    /// Pre-allocated identifier for the entry.
    pub id: LedgerEntryId,
    /// Organization scope.
    pub organization_id: OrganizationId,
    /// Branch scope.
    pub branch_id: BranchId,
    /// The account posted against.
    pub account_id: AccountId,
    /// The member the posting belongs to, when member-facing.
    pub member_profile_id: Option<MemberProfileId>,
    /// The teller transaction this entry is part of, if any.
    pub transaction_id: Option<TransactionId>,
    /// The open batch the entry attaches to. Set by the orchestrator.
    pub transaction_batch_id: Option<TransactionBatchId>,
    /// Originating operation.
    pub source: EntrySource,
    /// Posting currency.
    pub currency: Currency,
    /// Debit amount (zero when the credit side is used).
    pub debit: Decimal,
    /// Credit amount (zero when the debit side is used).
    pub credit: Decimal,
    /// Account balance after this entry.
    pub balance: Decimal,
    /// Human-readable description.
    pub description: String,
    /// Official receipt / reference number, when allocated.
    pub reference_number: Option<String>,
    /// Business date of the entry.
    pub entry_date: NaiveDate,
    /// The entry this one reverses, if it is a reversal.
    pub reversal_of: Option<LedgerEntryId>,
    /// The user who created the entry.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl DraftEntry {
    /// Returns the signed amount (positive for debit, negative for credit).
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        self.debit - self.credit
    }

    /// Returns the change this entry applies to the account balance.
    #[must_use]
    pub fn balance_delta(&self) -> Decimal {
        self.credit - self.debit
    }

    /// Returns the posting magnitude regardless of side.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.debit + self.credit
    }

    /// Returns true if this draft is a reversal of a prior entry.
    #[must_use]
    pub fn is_reversal(&self) -> bool {
        self.reversal_of.is_some()
    }
}

/// A ledger entry as read back from storage.
///
/// Entries are logically immutable once posted; the only mutations are the
/// first-print `print_number` stamp and the `is_reversed` tag set when a
/// reversing entry is created against it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostedEntry {
    /// Entry identifier.
    pub id: LedgerEntryId,
    /// Organization scope.
    pub organization_id: OrganizationId,
    /// Branch scope.
    pub branch_id: BranchId,
    /// The account posted against.
    pub account_id: AccountId,
    /// The member the posting belongs to, when member-facing.
    pub member_profile_id: Option<MemberProfileId>,
    /// The teller transaction this entry is part of, if any.
    pub transaction_id: Option<TransactionId>,
    /// The batch the entry was created under, if any.
    pub transaction_batch_id: Option<TransactionBatchId>,
    /// Originating operation.
    pub source: EntrySource,
    /// Posting currency.
    pub currency: Currency,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Account balance after this entry.
    pub balance: Decimal,
    /// Human-readable description.
    pub description: String,
    /// Official receipt / reference number.
    pub reference_number: Option<String>,
    /// Sequential print counter, stamped on first print request.
    pub print_number: Option<i64>,
    /// Business date of the entry.
    pub entry_date: NaiveDate,
    /// The entry this one reverses, if it is a reversal.
    pub reversal_of: Option<LedgerEntryId>,
    /// True once a reversing entry has been created against this one.
    pub is_reversed: bool,
    /// The user who created the entry.
    pub created_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl PostedEntry {
    /// Returns the change this entry applied to the account balance.
    #[must_use]
    pub fn balance_delta(&self) -> Decimal {
        self.credit - self.debit
    }

    /// Returns the posting magnitude regardless of side.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.debit + self.credit
    }
}

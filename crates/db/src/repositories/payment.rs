//! Payment orchestrator.
//!
//! The entry point for deposit, withdrawal, payment, and adjustment
//! operations. One call runs one database transaction: resolve the teller's
//! open batch, build the entry (forward or reversal) through the core
//! posting service, allocate the official receipt when asked, persist, and
//! recompute the batch totals. Any failure rolls the whole transaction
//! back; a ledger row never lands without its batch recompute.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Set,
    TransactionTrait,
};
use std::str::FromStr;
use uuid::Uuid;

use coopra_core::batch::BatchError;
use coopra_core::posting::{
    DraftEntry, EntrySource, OperationKind, PostInput, PostedEntry, PostingError, PostingService,
};
use coopra_shared::types::{
    AccountId, AdjustmentEntryId, Currency, LedgerEntryId, MemberProfileId, OperationScope,
    TransactionBatchId, TransactionId,
};

use crate::entities::{adjustment_entries, ledger_entries};
use crate::repositories::account::{AccountError, AccountRepository};
use crate::repositories::batch::{BatchRepoError, TransactionBatchRepository};
use crate::repositories::is_unique_violation;
use crate::repositories::receipt::ReceiptAllocator;

/// Error types for payment processing.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Posting math or reversal rule violation.
    #[error(transparent)]
    Posting(#[from] PostingError),

    /// Batch lifecycle violation (no active batch, closed batch).
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// Account resolution failure.
    #[error(transparent)]
    Account(#[from] AccountError),

    /// Batch recompute failure.
    #[error(transparent)]
    BatchRepo(#[from] BatchRepoError),

    /// The entry to reverse does not exist.
    #[error("Entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Lost the receipt-number race to a concurrent posting.
    #[error("Reference number already used: {0}")]
    ReferenceCollision(String),

    /// A stored currency code does not parse.
    #[error("Invalid currency code '{0}'")]
    InvalidCurrency(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// The prior entry a reversal targets.
#[derive(Debug, Clone, Copy)]
pub enum ReverseTarget {
    /// Reverse a general ledger entry.
    Ledger(LedgerEntryId),
    /// Reverse a manual adjustment entry.
    Adjustment(AdjustmentEntryId),
}

/// One teller operation for the orchestrator.
#[derive(Debug, Clone)]
pub struct PaymentEvent {
    /// The account being posted against.
    pub account_id: AccountId,
    /// The member the posting belongs to, when member-facing.
    pub member_profile_id: Option<MemberProfileId>,
    /// The teller transaction this posting is part of, if any.
    pub transaction_id: Option<TransactionId>,
    /// The operation being performed.
    pub operation: OperationKind,
    /// Signed amount; negative flips the cash direction.
    pub amount: Decimal,
    /// Posting currency.
    pub currency: Currency,
    /// Human-readable description.
    pub description: String,
    /// Business date of the entry.
    pub entry_date: NaiveDate,
    /// Caller-supplied reference number, if any.
    pub reference_number: Option<String>,
    /// Allocate the next official receipt number for this entry.
    pub allocate_receipt: bool,
    /// Reverse a prior entry instead of posting forward.
    pub reverse: Option<ReverseTarget>,
}

/// Transaction boundary for multipayment processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// All lines share one transaction: any failure aborts every line.
    Atomic,
    /// One transaction per line: lines succeed or fail independently.
    Independent,
}

/// Outcome of a multipayment run; the shape makes the chosen transaction
/// boundary explicit to the caller.
#[derive(Debug)]
pub enum MultiPaymentOutcome {
    /// Every line committed in one shared transaction.
    Committed(Vec<PostedEntry>),
    /// The shared transaction rolled back at the failing line.
    RolledBack {
        /// Index of the line that failed.
        failed_index: usize,
        /// The failure.
        error: PaymentError,
    },
    /// Independent transactions, one outcome per line.
    PerLine(Vec<Result<PostedEntry, PaymentError>>),
}

/// Payment orchestrator repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
    epsilon: Decimal,
    receipt_pad_width: usize,
}

impl PaymentRepository {
    /// Creates a new payment repository with default tolerances.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            epsilon: Decimal::new(1, 2),
            receipt_pad_width: 7,
        }
    }

    /// Overrides the reconciliation tolerance and receipt pad width from
    /// configuration.
    #[must_use]
    pub const fn with_settings(
        db: DatabaseConnection,
        epsilon: Decimal,
        receipt_pad_width: usize,
    ) -> Self {
        Self {
            db,
            epsilon,
            receipt_pad_width,
        }
    }

    /// Processes one teller operation in its own database transaction.
    ///
    /// # Errors
    ///
    /// Any step failing rolls back the transaction: no ledger row without a
    /// matching batch recompute, and vice versa.
    pub async fn process(
        &self,
        scope: &OperationScope,
        event: PaymentEvent,
    ) -> Result<PostedEntry, PaymentError> {
        let txn = self.db.begin().await?;

        match self.process_in(&txn, scope, event).await {
            Ok(entry) => {
                txn.commit().await?;
                tracing::info!(
                    target: "footstep",
                    entry_id = %entry.id,
                    source = ?entry.source,
                    amount = %entry.amount(),
                    "posting committed"
                );
                Ok(entry)
            }
            Err(error) => {
                let _ = txn.rollback().await;
                Err(error)
            }
        }
    }

    /// Processes many lines under the chosen transaction boundary.
    ///
    /// Both semantics exist in the wild: the multipayment teller screen
    /// wants all-or-nothing, the batch import route wants per-line
    /// outcomes. Callers choose; there is no default.
    pub async fn process_many(
        &self,
        scope: &OperationScope,
        events: Vec<PaymentEvent>,
        mode: TransactionMode,
    ) -> MultiPaymentOutcome {
        match mode {
            TransactionMode::Atomic => self.process_atomic(scope, events).await,
            TransactionMode::Independent => {
                let mut outcomes = Vec::with_capacity(events.len());
                for event in events {
                    outcomes.push(self.process(scope, event).await);
                }
                MultiPaymentOutcome::PerLine(outcomes)
            }
        }
    }

    async fn process_atomic(
        &self,
        scope: &OperationScope,
        events: Vec<PaymentEvent>,
    ) -> MultiPaymentOutcome {
        let txn = match self.db.begin().await {
            Ok(txn) => txn,
            Err(err) => {
                return MultiPaymentOutcome::RolledBack {
                    failed_index: 0,
                    error: err.into(),
                };
            }
        };

        let mut entries = Vec::with_capacity(events.len());
        for (index, event) in events.into_iter().enumerate() {
            match self.process_in(&txn, scope, event).await {
                Ok(entry) => entries.push(entry),
                Err(error) => {
                    let _ = txn.rollback().await;
                    return MultiPaymentOutcome::RolledBack {
                        failed_index: index,
                        error,
                    };
                }
            }
        }

        match txn.commit().await {
            Ok(()) => {
                tracing::info!(
                    target: "footstep",
                    lines = entries.len(),
                    "multipayment committed"
                );
                MultiPaymentOutcome::Committed(entries)
            }
            Err(err) => MultiPaymentOutcome::RolledBack {
                failed_index: 0,
                error: err.into(),
            },
        }
    }

    /// The orchestration algorithm, run inside the caller's transaction.
    async fn process_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: &OperationScope,
        event: PaymentEvent,
    ) -> Result<PostedEntry, PaymentError> {
        // Postings require the teller's open batch.
        let batch = TransactionBatchRepository::find_open_on(conn, scope)
            .await?
            .ok_or(BatchError::NoActiveBatch)?;
        let batch_id = TransactionBatchId::from_uuid(batch.id);

        let account_model = AccountRepository::find_on(conn, event.account_id).await?;
        let account = AccountRepository::to_account_ref(&account_model)?;

        let prior_balance =
            AccountRepository::latest_balance(conn, event.account_id, event.member_profile_id)
                .await?;

        let mut draft = match event.reverse {
            None => PostingService::post(
                &PostInput {
                    scope: *scope,
                    account,
                    member_profile_id: event.member_profile_id,
                    transaction_id: event.transaction_id,
                    operation: event.operation,
                    amount: event.amount,
                    currency: event.currency,
                    description: event.description.clone(),
                    reference_number: event.reference_number.clone(),
                    entry_date: event.entry_date,
                },
                prior_balance,
            )?,
            Some(target) => {
                self.build_reversal(conn, scope, target, prior_balance, event.entry_date)
                    .await?
            }
        };

        draft.transaction_batch_id = Some(batch_id);

        if event.allocate_receipt {
            let reference = ReceiptAllocator::next_reference_number(
                conn,
                scope.organization_id,
                scope.branch_id,
                self.receipt_pad_width,
            )
            .await?;
            draft.reference_number = Some(reference);
        }

        let posted = match (event.operation, event.reverse) {
            (OperationKind::Adjustment, None) | (_, Some(ReverseTarget::Adjustment(_))) => {
                self.insert_adjustment(conn, &draft).await?
            }
            _ => self.insert_ledger(conn, &draft).await?,
        };

        // The recompute runs in the same transaction and sees the new row.
        TransactionBatchRepository::recompute_on(conn, batch.id, self.epsilon).await?;

        Ok(posted)
    }

    /// Builds the reversing draft for a prior entry and tags the original.
    async fn build_reversal<C: ConnectionTrait>(
        &self,
        conn: &C,
        scope: &OperationScope,
        target: ReverseTarget,
        prior_balance: Decimal,
        entry_date: NaiveDate,
    ) -> Result<DraftEntry, PaymentError> {
        match target {
            ReverseTarget::Ledger(entry_id) => {
                let model = ledger_entries::Entity::find_by_id(entry_id.into_inner())
                    .one(conn)
                    .await?
                    .ok_or(PaymentError::EntryNotFound(entry_id.into_inner()))?;

                let original = ledger_to_posted(&model)?;
                let draft = PostingService::reverse(
                    &original,
                    prior_balance,
                    scope.user_id,
                    entry_date,
                )?;

                let mut active: ledger_entries::ActiveModel = model.into();
                active.is_reversed = Set(true);
                active.update(conn).await?;

                Ok(draft)
            }
            ReverseTarget::Adjustment(entry_id) => {
                let model = adjustment_entries::Entity::find_by_id(entry_id.into_inner())
                    .one(conn)
                    .await?
                    .ok_or(PaymentError::EntryNotFound(entry_id.into_inner()))?;

                let original = adjustment_to_posted(&model)?;
                let draft = PostingService::reverse(
                    &original,
                    prior_balance,
                    scope.user_id,
                    entry_date,
                )?;

                let mut active: adjustment_entries::ActiveModel = model.into();
                active.is_reversed = Set(true);
                active.update(conn).await?;

                Ok(draft)
            }
        }
    }

    async fn insert_ledger<C: ConnectionTrait>(
        &self,
        conn: &C,
        draft: &DraftEntry,
    ) -> Result<PostedEntry, PaymentError> {
        let model = draft_to_ledger_active(draft)
            .insert(conn)
            .await
            .map_err(|err| map_reference_collision(err, draft))?;

        ledger_to_posted(&model)
    }

    async fn insert_adjustment<C: ConnectionTrait>(
        &self,
        conn: &C,
        draft: &DraftEntry,
    ) -> Result<PostedEntry, PaymentError> {
        let model = draft_to_adjustment_active(draft)
            .insert(conn)
            .await
            .map_err(|err| map_reference_collision(err, draft))?;

        adjustment_to_posted(&model)
    }
}

/// Maps a unique-index violation on the reference number to the typed
/// collision error; everything else stays a database error.
fn map_reference_collision(err: DbErr, draft: &DraftEntry) -> PaymentError {
    if is_unique_violation(&err, "uq_ledger_reference_number") {
        PaymentError::ReferenceCollision(
            draft.reference_number.clone().unwrap_or_default(),
        )
    } else {
        PaymentError::Database(err)
    }
}

/// Builds the insertable ledger row from a draft.
pub(crate) fn draft_to_ledger_active(draft: &DraftEntry) -> ledger_entries::ActiveModel {
    ledger_entries::ActiveModel {
        id: Set(draft.id.into_inner()),
        organization_id: Set(draft.organization_id.into_inner()),
        branch_id: Set(draft.branch_id.into_inner()),
        account_id: Set(draft.account_id.into_inner()),
        member_profile_id: Set(draft.member_profile_id.map(MemberProfileId::into_inner)),
        transaction_id: Set(draft.transaction_id.map(TransactionId::into_inner)),
        transaction_batch_id: Set(draft
            .transaction_batch_id
            .map(TransactionBatchId::into_inner)),
        source: Set(draft.source.into()),
        currency: Set(draft.currency.to_string()),
        debit: Set(draft.debit),
        credit: Set(draft.credit),
        balance: Set(draft.balance),
        description: Set(draft.description.clone()),
        reference_number: Set(draft.reference_number.clone()),
        print_number: Set(None),
        entry_date: Set(draft.entry_date),
        reversal_of: Set(draft.reversal_of.map(LedgerEntryId::into_inner)),
        is_reversed: Set(false),
        created_by: Set(draft.created_by.into_inner()),
        created_at: Set(draft.created_at.into()),
    }
}

/// Builds the insertable adjustment row from a draft.
pub(crate) fn draft_to_adjustment_active(draft: &DraftEntry) -> adjustment_entries::ActiveModel {
    adjustment_entries::ActiveModel {
        id: Set(draft.id.into_inner()),
        organization_id: Set(draft.organization_id.into_inner()),
        branch_id: Set(draft.branch_id.into_inner()),
        account_id: Set(draft.account_id.into_inner()),
        member_profile_id: Set(draft.member_profile_id.map(MemberProfileId::into_inner)),
        transaction_batch_id: Set(draft
            .transaction_batch_id
            .map(TransactionBatchId::into_inner)),
        currency: Set(draft.currency.to_string()),
        debit: Set(draft.debit),
        credit: Set(draft.credit),
        balance: Set(draft.balance),
        description: Set(draft.description.clone()),
        reference_number: Set(draft.reference_number.clone()),
        entry_date: Set(draft.entry_date),
        reversal_of: Set(draft.reversal_of.map(LedgerEntryId::into_inner)),
        is_reversed: Set(false),
        created_by: Set(draft.created_by.into_inner()),
        created_at: Set(draft.created_at.into()),
    }
}

/// Maps a ledger row back to the core domain type.
pub(crate) fn ledger_to_posted(model: &ledger_entries::Model) -> Result<PostedEntry, PaymentError> {
    let currency = Currency::from_str(&model.currency)
        .map_err(|_| PaymentError::InvalidCurrency(model.currency.clone()))?;

    Ok(PostedEntry {
        id: LedgerEntryId::from_uuid(model.id),
        organization_id: coopra_shared::types::OrganizationId::from_uuid(model.organization_id),
        branch_id: coopra_shared::types::BranchId::from_uuid(model.branch_id),
        account_id: AccountId::from_uuid(model.account_id),
        member_profile_id: model.member_profile_id.map(MemberProfileId::from_uuid),
        transaction_id: model.transaction_id.map(TransactionId::from_uuid),
        transaction_batch_id: model
            .transaction_batch_id
            .map(TransactionBatchId::from_uuid),
        source: model.source.clone().into(),
        currency,
        debit: model.debit,
        credit: model.credit,
        balance: model.balance,
        description: model.description.clone(),
        reference_number: model.reference_number.clone(),
        print_number: model.print_number,
        entry_date: model.entry_date,
        reversal_of: model.reversal_of.map(LedgerEntryId::from_uuid),
        is_reversed: model.is_reversed,
        created_by: coopra_shared::types::UserId::from_uuid(model.created_by),
        created_at: model.created_at.into(),
    })
}

/// Maps an adjustment row back to the core domain type.
pub(crate) fn adjustment_to_posted(
    model: &adjustment_entries::Model,
) -> Result<PostedEntry, PaymentError> {
    let currency = Currency::from_str(&model.currency)
        .map_err(|_| PaymentError::InvalidCurrency(model.currency.clone()))?;

    Ok(PostedEntry {
        id: LedgerEntryId::from_uuid(model.id),
        organization_id: coopra_shared::types::OrganizationId::from_uuid(model.organization_id),
        branch_id: coopra_shared::types::BranchId::from_uuid(model.branch_id),
        account_id: AccountId::from_uuid(model.account_id),
        member_profile_id: model.member_profile_id.map(MemberProfileId::from_uuid),
        transaction_id: None,
        transaction_batch_id: model
            .transaction_batch_id
            .map(TransactionBatchId::from_uuid),
        source: EntrySource::Adjustment,
        currency,
        debit: model.debit,
        credit: model.credit,
        balance: model.balance,
        description: model.description.clone(),
        reference_number: model.reference_number.clone(),
        print_number: None,
        entry_date: model.entry_date,
        reversal_of: model.reversal_of.map(LedgerEntryId::from_uuid),
        is_reversed: model.is_reversed,
        created_by: coopra_shared::types::UserId::from_uuid(model.created_by),
        created_at: model.created_at.into(),
    })
}

#[cfg(test)]
#[path = "payment_tests.rs"]
mod tests;

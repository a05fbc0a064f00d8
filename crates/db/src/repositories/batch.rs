//! Transaction batch repository.
//!
//! Owns the persistence side of the batch lifecycle (start, end, view
//! workflow) and the recompute step that rebuilds a batch's totals from its
//! source rows. State transitions are validated by the core lifecycle
//! service; this module only loads, persists, and maps database errors to
//! the typed taxonomy.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use std::str::FromStr;
use uuid::Uuid;

use coopra_core::batch::{
    BatchEntryLine, BatchError, BatchLifecycle, BatchProjection, BatchState, BatchTotals,
    BatchView, CloseBatchInput, EntrySums, Reconciliation, RemittanceSums, SignOffSheet,
    TransactionBatch,
};
use coopra_core::batch::reconcile::is_money_in;
use coopra_shared::types::{
    AccountId, Currency, MediaId, OperationScope, TransactionBatchId, UserId,
};

use crate::entities::{
    accounts, adjustment_entries, batch_fundings, cash_counts, check_remittances, ledger_entries,
    online_remittances, transaction_batches, variance_accounts,
};
use crate::repositories::is_unique_violation;

/// Error types for batch operations.
#[derive(Debug, thiserror::Error)]
pub enum BatchRepoError {
    /// Lifecycle or invariant violation.
    #[error(transparent)]
    Batch(#[from] BatchError),

    /// A stored currency code does not parse.
    #[error("Invalid currency code '{0}'")]
    InvalidCurrency(String),

    /// An entry tied to the batch does not resolve to an account.
    #[error("Entry {entry_id} references a missing account")]
    BrokenAccountRef {
        /// The offending entry.
        entry_id: Uuid,
    },

    /// Sign-off sheet could not be serialized or deserialized.
    #[error("Sign-off serialization error: {0}")]
    Serialization(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for starting a new batch.
#[derive(Debug, Clone)]
pub struct StartBatchInput {
    /// Batch currency.
    pub currency: Currency,
    /// Cash the teller is seeded with; recorded as the initial funding row.
    pub beginning_balance: Decimal,
    /// Label of the initial funding (e.g., "Opening fund").
    pub funding_name: String,
    /// Signature captured for the initial funding.
    pub signature_media_id: Option<MediaId>,
}

/// Input for recording a check remittance.
#[derive(Debug, Clone)]
pub struct CheckRemittanceInput {
    /// Issuing bank.
    pub bank_name: String,
    /// Check reference number.
    pub reference_number: String,
    /// Check amount.
    pub amount: Decimal,
    /// Date on the check.
    pub date_entry: chrono::NaiveDate,
}

/// Input for recording an online remittance.
#[derive(Debug, Clone)]
pub struct OnlineRemittanceInput {
    /// Payment provider.
    pub provider: String,
    /// Provider reference number.
    pub reference_number: String,
    /// Remitted amount.
    pub amount: Decimal,
    /// Date of the remittance.
    pub date_entry: chrono::NaiveDate,
}

/// Transaction batch repository.
#[derive(Debug, Clone)]
pub struct TransactionBatchRepository {
    db: DatabaseConnection,
    epsilon: Decimal,
}

impl TransactionBatchRepository {
    /// Creates a new batch repository with the default reconciliation
    /// tolerance of one centavo.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            epsilon: Decimal::new(1, 2),
        }
    }

    /// Creates a repository with an explicit reconciliation tolerance.
    #[must_use]
    pub const fn with_epsilon(db: DatabaseConnection, epsilon: Decimal) -> Self {
        Self { db, epsilon }
    }

    /// The reconciliation tolerance in use.
    #[must_use]
    pub const fn epsilon(&self) -> Decimal {
        self.epsilon
    }

    /// Finds the teller's open batch, if any.
    pub async fn find_open_for(
        &self,
        scope: &OperationScope,
    ) -> Result<Option<transaction_batches::Model>, DbErr> {
        Self::find_open_on(&self.db, scope).await
    }

    /// Finds the teller's open batch on the given connection.
    pub async fn find_open_on<C: ConnectionTrait>(
        conn: &C,
        scope: &OperationScope,
    ) -> Result<Option<transaction_batches::Model>, DbErr> {
        transaction_batches::Entity::find()
            .filter(
                transaction_batches::Column::EmployeeUserId.eq(scope.user_id.into_inner()),
            )
            .filter(
                transaction_batches::Column::OrganizationId
                    .eq(scope.organization_id.into_inner()),
            )
            .filter(transaction_batches::Column::BranchId.eq(scope.branch_id.into_inner()))
            .filter(
                transaction_batches::Column::State
                    .eq(crate::entities::sea_orm_active_enums::BatchState::Open),
            )
            .one(conn)
            .await
    }

    /// Starts a new batch for the teller, creating the batch row and the
    /// initial funding row atomically.
    ///
    /// # Errors
    ///
    /// * [`BatchError::AlreadyOpen`] when the teller already has an open
    ///   batch (checked, and backstopped by the partial unique index when
    ///   two requests race)
    /// * [`BatchError::MissingVarianceAccount`] when no sink account is
    ///   configured for the branch and currency
    pub async fn start(
        &self,
        scope: &OperationScope,
        input: StartBatchInput,
    ) -> Result<TransactionBatch, BatchRepoError> {
        let txn = self.db.begin().await?;

        let existing = Self::find_open_on(&txn, scope)
            .await?
            .map(|model| batch_to_domain(&model))
            .transpose()?;

        let variance = variance_accounts::Entity::find()
            .filter(
                variance_accounts::Column::OrganizationId.eq(scope.organization_id.into_inner()),
            )
            .filter(variance_accounts::Column::BranchId.eq(scope.branch_id.into_inner()))
            .filter(variance_accounts::Column::Currency.eq(input.currency.to_string()))
            .one(&txn)
            .await?
            .map(|row| AccountId::from_uuid(row.account_id));

        BatchLifecycle::validate_start(
            existing.as_ref(),
            variance,
            scope.branch_id,
            input.currency,
        )?;

        let now = Utc::now();
        let batch_id = Uuid::now_v7();

        let insert_result = transaction_batches::ActiveModel {
            id: Set(batch_id),
            organization_id: Set(scope.organization_id.into_inner()),
            branch_id: Set(scope.branch_id.into_inner()),
            employee_user_id: Set(scope.user_id.into_inner()),
            currency: Set(input.currency.to_string()),
            state: Set(crate::entities::sea_orm_active_enums::BatchState::Open),
            beginning_balance: Set(input.beginning_balance),
            total_cash_collection: Set(Decimal::ZERO),
            total_deposit_entries: Set(Decimal::ZERO),
            total_petty_cash: Set(Decimal::ZERO),
            total_loan_releases: Set(Decimal::ZERO),
            total_withdrawals: Set(Decimal::ZERO),
            total_check_remittance: Set(Decimal::ZERO),
            total_online_remittance: Set(Decimal::ZERO),
            total_deposit_in_bank: Set(Decimal::ZERO),
            total_cash_count: Set(Decimal::ZERO),
            total_cash_on_hand: Set(input.beginning_balance),
            total_supposed_remittance: Set(input.beginning_balance),
            total_actual_remittance: Set(Decimal::ZERO),
            is_balanced: Set(false),
            can_view: Set(false),
            request_view: Set(false),
            sign_offs: Set(None),
            started_at: Set(now.into()),
            ended_at: Set(None),
            ended_by: Set(None),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await;

        let batch_row = insert_result.map_err(|err| {
            if is_unique_violation(&err, "uq_open_batch_per_teller") {
                BatchRepoError::Batch(BatchError::AlreadyOpen(scope.user_id))
            } else {
                BatchRepoError::Database(err)
            }
        })?;

        batch_fundings::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_batch_id: Set(batch_row.id),
            name: Set(input.funding_name),
            amount: Set(input.beginning_balance),
            provided_by: Set(scope.user_id.into_inner()),
            signature_media_id: Set(input.signature_media_id.map(MediaId::into_inner)),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await?;

        Self::recompute_on(&txn, batch_row.id, self.epsilon).await?;
        let started = Self::load_domain(&txn, TransactionBatchId::from_uuid(batch_row.id)).await?;

        txn.commit().await?;

        tracing::info!(
            target: "footstep",
            batch_id = %started.id,
            teller = %started.employee_user_id,
            "transaction batch started"
        );

        Ok(started)
    }

    /// Adds a funding row to an open batch and recomputes its totals.
    pub async fn add_funding(
        &self,
        batch_id: TransactionBatchId,
        name: String,
        amount: Decimal,
        provided_by: UserId,
        signature_media_id: Option<MediaId>,
    ) -> Result<TransactionBatch, BatchRepoError> {
        let txn = self.db.begin().await?;

        let batch = Self::load_open(&txn, batch_id).await?;

        batch_fundings::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_batch_id: Set(batch.id),
            name: Set(name),
            amount: Set(amount),
            provided_by: Set(provided_by.into_inner()),
            signature_media_id: Set(signature_media_id.map(MediaId::into_inner)),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        Self::recompute_on(&txn, batch.id, self.epsilon).await?;
        let updated = Self::load_domain(&txn, batch_id).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Records a check remittance against an open batch.
    pub async fn record_check_remittance(
        &self,
        batch_id: TransactionBatchId,
        created_by: UserId,
        input: CheckRemittanceInput,
    ) -> Result<TransactionBatch, BatchRepoError> {
        let txn = self.db.begin().await?;
        let batch = Self::load_open(&txn, batch_id).await?;

        check_remittances::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_batch_id: Set(batch.id),
            bank_name: Set(input.bank_name),
            reference_number: Set(input.reference_number),
            amount: Set(input.amount),
            date_entry: Set(input.date_entry),
            created_by: Set(created_by.into_inner()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        Self::recompute_on(&txn, batch.id, self.epsilon).await?;
        let updated = Self::load_domain(&txn, batch_id).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Records an online remittance against an open batch.
    pub async fn record_online_remittance(
        &self,
        batch_id: TransactionBatchId,
        created_by: UserId,
        input: OnlineRemittanceInput,
    ) -> Result<TransactionBatch, BatchRepoError> {
        let txn = self.db.begin().await?;
        let batch = Self::load_open(&txn, batch_id).await?;

        online_remittances::ActiveModel {
            id: Set(Uuid::now_v7()),
            transaction_batch_id: Set(batch.id),
            provider: Set(input.provider),
            reference_number: Set(input.reference_number),
            amount: Set(input.amount),
            date_entry: Set(input.date_entry),
            created_by: Set(created_by.into_inner()),
            created_at: Set(Utc::now().into()),
        }
        .insert(&txn)
        .await?;

        Self::recompute_on(&txn, batch.id, self.epsilon).await?;
        let updated = Self::load_domain(&txn, batch_id).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Updates the deposit-in-bank figure on an open batch and recomputes.
    pub async fn update_deposit_in_bank(
        &self,
        batch_id: TransactionBatchId,
        amount: Decimal,
    ) -> Result<TransactionBatch, BatchRepoError> {
        let txn = self.db.begin().await?;
        let batch = Self::load_open(&txn, batch_id).await?;

        let mut active: transaction_batches::ActiveModel = batch.into();
        active.total_deposit_in_bank = Set(amount);
        let batch = active.update(&txn).await?;

        Self::recompute_on(&txn, batch.id, self.epsilon).await?;
        let updated = Self::load_domain(&txn, batch_id).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Ends an open batch with its closing figures.
    ///
    /// Records the cash count breakdown and sign-off sheet, then rebuilds
    /// the totals from the full set of source rows. Ending an already-closed
    /// batch fails with [`BatchError::AlreadyClosed`].
    pub async fn end(
        &self,
        batch_id: TransactionBatchId,
        input: CloseBatchInput,
    ) -> Result<TransactionBatch, BatchRepoError> {
        let txn = self.db.begin().await?;

        let model = Self::load(&txn, batch_id).await?;
        let domain = batch_to_domain(&model)?;
        let action = BatchLifecycle::end(&domain, input.ended_by)?;

        for line in &input.cash_counts {
            cash_counts::ActiveModel {
                id: Set(Uuid::now_v7()),
                transaction_batch_id: Set(model.id),
                denomination: Set(line.denomination),
                quantity: Set(line.quantity),
                created_at: Set(Utc::now().into()),
            }
            .insert(&txn)
            .await?;
        }

        let sign_offs = serde_json::to_value(&input.sign_offs)
            .map_err(|err| BatchRepoError::Serialization(err.to_string()))?;

        let mut active: transaction_batches::ActiveModel = model.into();
        active.state = Set(action.new_state.into());
        active.ended_at = Set(Some(action.ended_at.into()));
        active.ended_by = Set(Some(action.ended_by.into_inner()));
        active.sign_offs = Set(Some(sign_offs));
        active.total_deposit_in_bank = Set(input.deposit_in_bank);
        let model = active.update(&txn).await?;

        Self::recompute_on(&txn, model.id, self.epsilon).await?;
        let ended = Self::load_domain(&txn, batch_id).await?;

        txn.commit().await?;

        tracing::info!(
            target: "footstep",
            batch_id = %ended.id,
            is_balanced = ended.totals.is_balanced,
            "transaction batch ended"
        );

        Ok(ended)
    }

    /// Requests detail visibility on an ended batch.
    pub async fn request_view(
        &self,
        batch_id: TransactionBatchId,
        requested_by: UserId,
    ) -> Result<TransactionBatch, BatchRepoError> {
        let model = Self::load(&self.db, batch_id).await?;
        let domain = batch_to_domain(&model)?;
        let action = BatchLifecycle::request_view(&domain, requested_by)?;

        let mut active: transaction_batches::ActiveModel = model.into();
        active.state = Set(action.new_state.into());
        active.request_view = Set(action.request_view);
        active.can_view = Set(action.can_view);
        let updated = active.update(&self.db).await?;

        batch_to_domain(&updated)
    }

    /// Grants detail visibility on a batch with a pending view request.
    pub async fn accept_view(
        &self,
        batch_id: TransactionBatchId,
        accepted_by: UserId,
    ) -> Result<TransactionBatch, BatchRepoError> {
        let model = Self::load(&self.db, batch_id).await?;
        let domain = batch_to_domain(&model)?;
        let action = BatchLifecycle::accept_view(&domain, accepted_by)?;

        let mut active: transaction_batches::ActiveModel = model.into();
        active.state = Set(action.new_state.into());
        active.request_view = Set(action.request_view);
        active.can_view = Set(action.can_view);
        let updated = active.update(&self.db).await?;

        batch_to_domain(&updated)
    }

    /// Reads a batch, degraded to the minimal projection unless the viewer
    /// is entitled to the detail.
    pub async fn view(
        &self,
        batch_id: TransactionBatchId,
        viewer: &OperationScope,
    ) -> Result<BatchView, BatchRepoError> {
        let domain = Self::load_domain(&self.db, batch_id).await?;
        Ok(BatchProjection::project(&domain, viewer))
    }

    /// Rebuilds and persists a batch's totals from its source rows.
    pub async fn recompute(&self, batch_id: TransactionBatchId) -> Result<BatchTotals, BatchRepoError> {
        Self::recompute_on(&self.db, batch_id.into_inner(), self.epsilon).await
    }

    /// Recompute on the given connection; used by the payment orchestrator
    /// inside its own transaction so the recompute sees the new entry.
    pub async fn recompute_on<C: ConnectionTrait>(
        conn: &C,
        batch_id: Uuid,
        epsilon: Decimal,
    ) -> Result<BatchTotals, BatchRepoError> {
        let model = transaction_batches::Entity::find_by_id(batch_id)
            .one(conn)
            .await?
            .ok_or(BatchError::NotFound(TransactionBatchId::from_uuid(batch_id)))?;

        let currency = Currency::from_str(&model.currency)
            .map_err(|_| BatchRepoError::InvalidCurrency(model.currency.clone()))?;

        let funding_total: Decimal = batch_fundings::Entity::find()
            .filter(batch_fundings::Column::TransactionBatchId.eq(batch_id))
            .all(conn)
            .await?
            .iter()
            .map(|row| row.amount)
            .sum();

        let ledger_rows = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::TransactionBatchId.eq(batch_id))
            .find_also_related(accounts::Entity)
            .all(conn)
            .await?;

        let adjustment_rows = adjustment_entries::Entity::find()
            .filter(adjustment_entries::Column::TransactionBatchId.eq(batch_id))
            .find_also_related(accounts::Entity)
            .all(conn)
            .await?;

        let mut lines = Vec::with_capacity(ledger_rows.len() + adjustment_rows.len());
        for (entry, account) in &ledger_rows {
            lines.push(ledger_line(entry, account.as_ref())?);
        }
        for (entry, account) in &adjustment_rows {
            lines.push(adjustment_line(entry, account.as_ref())?);
        }

        let checks: Decimal = check_remittances::Entity::find()
            .filter(check_remittances::Column::TransactionBatchId.eq(batch_id))
            .all(conn)
            .await?
            .iter()
            .map(|row| row.amount)
            .sum();

        let online: Decimal = online_remittances::Entity::find()
            .filter(online_remittances::Column::TransactionBatchId.eq(batch_id))
            .all(conn)
            .await?
            .iter()
            .map(|row| row.amount)
            .sum();

        let cash_count_total: Decimal = cash_counts::Entity::find()
            .filter(cash_counts::Column::TransactionBatchId.eq(batch_id))
            .all(conn)
            .await?
            .iter()
            .map(|row| row.denomination * Decimal::from(row.quantity))
            .sum();

        let sums = EntrySums::from_lines(&lines, currency);
        let totals = Reconciliation::recompute(
            funding_total,
            &sums,
            RemittanceSums { checks, online },
            model.total_deposit_in_bank,
            cash_count_total,
            epsilon,
        );

        let mut active: transaction_batches::ActiveModel = model.into();
        active.beginning_balance = Set(funding_total);
        active.total_cash_collection = Set(totals.cash_collection);
        active.total_deposit_entries = Set(totals.deposit_entries);
        active.total_petty_cash = Set(totals.petty_cash);
        active.total_loan_releases = Set(totals.loan_releases);
        active.total_withdrawals = Set(totals.withdrawals);
        active.total_check_remittance = Set(totals.check_remittance);
        active.total_online_remittance = Set(totals.online_remittance);
        active.total_deposit_in_bank = Set(totals.deposit_in_bank);
        active.total_cash_count = Set(totals.cash_count_total);
        active.total_cash_on_hand = Set(totals.cash_on_hand);
        active.total_supposed_remittance = Set(totals.supposed_remittance);
        active.total_actual_remittance = Set(totals.actual_remittance);
        active.is_balanced = Set(totals.is_balanced);
        active.update(conn).await?;

        Ok(totals)
    }

    async fn load<C: ConnectionTrait>(
        conn: &C,
        batch_id: TransactionBatchId,
    ) -> Result<transaction_batches::Model, BatchRepoError> {
        transaction_batches::Entity::find_by_id(batch_id.into_inner())
            .one(conn)
            .await?
            .ok_or_else(|| BatchError::NotFound(batch_id).into())
    }

    async fn load_open<C: ConnectionTrait>(
        conn: &C,
        batch_id: TransactionBatchId,
    ) -> Result<transaction_batches::Model, BatchRepoError> {
        let model = Self::load(conn, batch_id).await?;
        let state: BatchState = model.state.clone().into();
        if state.is_closed() {
            return Err(BatchError::AlreadyClosed(batch_id).into());
        }
        Ok(model)
    }

    async fn load_domain<C: ConnectionTrait>(
        conn: &C,
        batch_id: TransactionBatchId,
    ) -> Result<TransactionBatch, BatchRepoError> {
        let model = Self::load(conn, batch_id).await?;
        batch_to_domain(&model)
    }
}

/// Maps a batch row to the core domain type.
pub(crate) fn batch_to_domain(
    model: &transaction_batches::Model,
) -> Result<TransactionBatch, BatchRepoError> {
    let currency = Currency::from_str(&model.currency)
        .map_err(|_| BatchRepoError::InvalidCurrency(model.currency.clone()))?;

    let sign_offs: Option<SignOffSheet> = match &model.sign_offs {
        Some(value) => Some(
            serde_json::from_value(value.clone())
                .map_err(|err| BatchRepoError::Serialization(err.to_string()))?,
        ),
        None => None,
    };

    Ok(TransactionBatch {
        id: TransactionBatchId::from_uuid(model.id),
        organization_id: coopra_shared::types::OrganizationId::from_uuid(model.organization_id),
        branch_id: coopra_shared::types::BranchId::from_uuid(model.branch_id),
        employee_user_id: UserId::from_uuid(model.employee_user_id),
        currency,
        state: model.state.clone().into(),
        beginning_balance: model.beginning_balance,
        totals: totals_from_model(model),
        can_view: model.can_view,
        request_view: model.request_view,
        sign_offs,
        started_at: model.started_at.into(),
        ended_at: model.ended_at.map(Into::into),
        ended_by: model.ended_by.map(UserId::from_uuid),
    })
}

/// Extracts the totals block from a batch row.
pub(crate) fn totals_from_model(model: &transaction_batches::Model) -> BatchTotals {
    BatchTotals {
        cash_collection: model.total_cash_collection,
        deposit_entries: model.total_deposit_entries,
        petty_cash: model.total_petty_cash,
        loan_releases: model.total_loan_releases,
        withdrawals: model.total_withdrawals,
        check_remittance: model.total_check_remittance,
        online_remittance: model.total_online_remittance,
        deposit_in_bank: model.total_deposit_in_bank,
        cash_count_total: model.total_cash_count,
        cash_on_hand: model.total_cash_on_hand,
        supposed_remittance: model.total_supposed_remittance,
        actual_remittance: model.total_actual_remittance,
        is_balanced: model.is_balanced,
    }
}

/// Builds a reconciliation line from a ledger entry and its account.
pub(crate) fn ledger_line(
    entry: &ledger_entries::Model,
    account: Option<&accounts::Model>,
) -> Result<BatchEntryLine, BatchRepoError> {
    let account = account.ok_or(BatchRepoError::BrokenAccountRef { entry_id: entry.id })?;
    let currency = Currency::from_str(&entry.currency)
        .map_err(|_| BatchRepoError::InvalidCurrency(entry.currency.clone()))?;

    Ok(BatchEntryLine {
        source: entry.source.clone().into(),
        currency,
        amount: entry.debit + entry.credit,
        money_in: is_money_in(
            account.account_type.clone().into(),
            entry.debit,
            entry.credit,
        ),
    })
}

/// Builds a reconciliation line from an adjustment entry and its account.
pub(crate) fn adjustment_line(
    entry: &adjustment_entries::Model,
    account: Option<&accounts::Model>,
) -> Result<BatchEntryLine, BatchRepoError> {
    let account = account.ok_or(BatchRepoError::BrokenAccountRef { entry_id: entry.id })?;
    let currency = Currency::from_str(&entry.currency)
        .map_err(|_| BatchRepoError::InvalidCurrency(entry.currency.clone()))?;

    Ok(BatchEntryLine {
        source: coopra_core::posting::EntrySource::Adjustment,
        currency,
        amount: entry.debit + entry.credit,
        money_in: is_money_in(
            account.account_type.clone().into(),
            entry.debit,
            entry.credit,
        ),
    })
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;

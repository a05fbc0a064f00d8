//! Read-side batch projections.
//!
//! Until a view request has been accepted, non-owners only see the batch's
//! aggregate numbers. The choice between the full record and the minimal
//! projection is an explicit capability check here, not conditional field
//! nulling in the route layer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use coopra_shared::types::{Currency, OperationScope, TransactionBatchId, UserId};

use super::types::{BatchState, TransactionBatch};

/// Aggregate-only view of a batch, served to non-owners before a view
/// request has been accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimalBatchView {
    /// Batch identifier.
    pub id: TransactionBatchId,
    /// The teller who owns the batch.
    pub employee_user_id: UserId,
    /// Batch currency.
    pub currency: Currency,
    /// Lifecycle state.
    pub state: BatchState,
    /// Beginning balance.
    pub beginning_balance: Decimal,
    /// Supposed remittance.
    pub supposed_remittance: Decimal,
    /// Actual remittance.
    pub actual_remittance: Decimal,
    /// Whether the batch reconciles.
    pub is_balanced: bool,
    /// True while a view request is pending.
    pub request_view: bool,
    /// True once detail visibility has been granted.
    pub can_view: bool,
}

/// A batch read, degraded to aggregates unless the viewer is entitled to
/// the detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "projection", rename_all = "snake_case")]
pub enum BatchView {
    /// The full batch record including totals breakdown and sign-offs.
    Full(TransactionBatch),
    /// Aggregate numbers only.
    Minimal(MinimalBatchView),
}

/// Capability-checked projection of batches for read paths.
pub struct BatchProjection;

impl BatchProjection {
    /// Projects a batch for the given viewer.
    ///
    /// The owning teller always sees the full record; anyone else sees the
    /// minimal projection until `can_view` has been granted.
    #[must_use]
    pub fn project(batch: &TransactionBatch, viewer: &OperationScope) -> BatchView {
        if batch.is_owned_by(viewer.user_id) || batch.can_view {
            BatchView::Full(batch.clone())
        } else {
            BatchView::Minimal(Self::minimal(batch))
        }
    }

    /// Builds the aggregate-only projection.
    #[must_use]
    pub fn minimal(batch: &TransactionBatch) -> MinimalBatchView {
        MinimalBatchView {
            id: batch.id,
            employee_user_id: batch.employee_user_id,
            currency: batch.currency,
            state: batch.state,
            beginning_balance: batch.beginning_balance,
            supposed_remittance: batch.totals.supposed_remittance,
            actual_remittance: batch.totals.actual_remittance,
            is_balanced: batch.totals.is_balanced,
            request_view: batch.request_view,
            can_view: batch.can_view,
        }
    }
}

//! Batch lifecycle state machine.
//!
//! Stateless validation and transition logic for starting, ending, and
//! reviewing a teller's transaction batch. Persistence of the resulting
//! actions is the batch repository's job.

use chrono::{DateTime, Utc};

use coopra_shared::types::{AccountId, BranchId, Currency, UserId};

use super::error::BatchError;
use super::types::{BatchState, TransactionBatch};

/// Result of a valid end-batch transition.
#[derive(Debug, Clone)]
pub struct EndAction {
    /// The state to move the batch into.
    pub new_state: BatchState,
    /// When the batch was ended.
    pub ended_at: DateTime<Utc>,
    /// Who ended it.
    pub ended_by: UserId,
}

/// Result of a valid view-workflow transition.
#[derive(Debug, Clone)]
pub struct ViewAction {
    /// The state to move the batch into.
    pub new_state: BatchState,
    /// New value for the pending-request flag.
    pub request_view: bool,
    /// New value for the visibility grant.
    pub can_view: bool,
    /// The actor performing the transition.
    pub acted_by: UserId,
    /// When the transition happened.
    pub acted_at: DateTime<Utc>,
}

/// Stateless service for batch lifecycle transitions.
pub struct BatchLifecycle;

impl BatchLifecycle {
    /// Validates that a new batch may be started.
    ///
    /// # Errors
    ///
    /// * [`BatchError::AlreadyOpen`] when the teller already has an open
    ///   batch (at most one open batch per employee/organization/branch)
    /// * [`BatchError::MissingVarianceAccount`] when no reconciliation sink
    ///   account is configured for the branch and currency
    pub fn validate_start(
        existing_open: Option<&TransactionBatch>,
        variance_account: Option<AccountId>,
        branch_id: BranchId,
        currency: Currency,
    ) -> Result<(), BatchError> {
        if let Some(batch) = existing_open {
            return Err(BatchError::AlreadyOpen(batch.employee_user_id));
        }
        if variance_account.is_none() {
            return Err(BatchError::MissingVarianceAccount {
                branch_id,
                currency,
            });
        }
        Ok(())
    }

    /// Ends an open batch.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::AlreadyClosed`] when the batch is not open;
    /// ending twice is detected, never silently repeated.
    pub fn end(batch: &TransactionBatch, ended_by: UserId) -> Result<EndAction, BatchError> {
        if batch.state.is_closed() {
            return Err(BatchError::AlreadyClosed(batch.id));
        }

        Ok(EndAction {
            new_state: BatchState::Ended,
            ended_at: Utc::now(),
            ended_by,
        })
    }

    /// Requests detail visibility on an ended batch.
    ///
    /// Sets the pending flag and revokes any previous grant; a reviewer must
    /// accept before detail reads are served again.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidTransition`] unless the batch is Ended.
    pub fn request_view(
        batch: &TransactionBatch,
        requested_by: UserId,
    ) -> Result<ViewAction, BatchError> {
        if !BatchState::can_transition(batch.state, BatchState::ViewRequested) {
            return Err(BatchError::InvalidTransition {
                from: batch.state,
                to: BatchState::ViewRequested,
            });
        }

        Ok(ViewAction {
            new_state: BatchState::ViewRequested,
            request_view: true,
            can_view: false,
            acted_by: requested_by,
            acted_at: Utc::now(),
        })
    }

    /// Grants detail visibility on a batch with a pending view request.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError::InvalidTransition`] unless a request is pending.
    pub fn accept_view(
        batch: &TransactionBatch,
        accepted_by: UserId,
    ) -> Result<ViewAction, BatchError> {
        if !BatchState::can_transition(batch.state, BatchState::ViewAccepted) {
            return Err(BatchError::InvalidTransition {
                from: batch.state,
                to: BatchState::ViewAccepted,
            });
        }

        Ok(ViewAction {
            new_state: BatchState::ViewAccepted,
            request_view: false,
            can_view: true,
            acted_by: accepted_by,
            acted_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::types::BatchTotals;
    use coopra_shared::types::{BranchId, Currency, OrganizationId, TransactionBatchId};
    use rust_decimal_macros::dec;

    fn batch(state: BatchState) -> TransactionBatch {
        TransactionBatch {
            id: TransactionBatchId::new(),
            organization_id: OrganizationId::new(),
            branch_id: BranchId::new(),
            employee_user_id: UserId::new(),
            currency: Currency::Php,
            state,
            beginning_balance: dec!(1000),
            totals: BatchTotals::default(),
            can_view: false,
            request_view: false,
            sign_offs: None,
            started_at: Utc::now(),
            ended_at: None,
            ended_by: None,
        }
    }

    #[test]
    fn test_start_rejected_while_batch_open() {
        let open = batch(BatchState::Open);
        let result = BatchLifecycle::validate_start(
            Some(&open),
            Some(AccountId::new()),
            open.branch_id,
            Currency::Php,
        );

        assert!(matches!(result, Err(BatchError::AlreadyOpen(user)) if user == open.employee_user_id));
    }

    #[test]
    fn test_start_allowed_after_previous_ended() {
        let result = BatchLifecycle::validate_start(
            None,
            Some(AccountId::new()),
            BranchId::new(),
            Currency::Php,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_start_requires_variance_account() {
        let branch = BranchId::new();
        let result = BatchLifecycle::validate_start(None, None, branch, Currency::Php);

        assert!(matches!(
            result,
            Err(BatchError::MissingVarianceAccount { branch_id, currency })
                if branch_id == branch && currency == Currency::Php
        ));
    }

    #[test]
    fn test_end_open_batch() {
        let open = batch(BatchState::Open);
        let by = UserId::new();
        let action = BatchLifecycle::end(&open, by).unwrap();

        assert_eq!(action.new_state, BatchState::Ended);
        assert_eq!(action.ended_by, by);
    }

    #[test]
    fn test_end_twice_rejected() {
        let ended = batch(BatchState::Ended);
        let result = BatchLifecycle::end(&ended, UserId::new());

        assert!(matches!(result, Err(BatchError::AlreadyClosed(id)) if id == ended.id));
    }

    #[test]
    fn test_request_view_from_ended() {
        let ended = batch(BatchState::Ended);
        let action = BatchLifecycle::request_view(&ended, UserId::new()).unwrap();

        assert_eq!(action.new_state, BatchState::ViewRequested);
        assert!(action.request_view);
        assert!(!action.can_view);
    }

    #[test]
    fn test_request_view_from_open_rejected() {
        let open = batch(BatchState::Open);
        let result = BatchLifecycle::request_view(&open, UserId::new());

        assert!(matches!(result, Err(BatchError::InvalidTransition { .. })));
    }

    #[test]
    fn test_accept_view_requires_pending_request() {
        let requested = batch(BatchState::ViewRequested);
        let action = BatchLifecycle::accept_view(&requested, UserId::new()).unwrap();

        assert_eq!(action.new_state, BatchState::ViewAccepted);
        assert!(action.can_view);
        assert!(!action.request_view);

        let ended = batch(BatchState::Ended);
        let result = BatchLifecycle::accept_view(&ended, UserId::new());
        assert!(matches!(result, Err(BatchError::InvalidTransition { .. })));
    }
}

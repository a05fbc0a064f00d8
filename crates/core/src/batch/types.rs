//! Transaction batch domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use coopra_shared::types::{
    BranchId, Currency, MediaId, OrganizationId, TransactionBatchId, UserId,
};

/// Lifecycle state of a transaction batch.
///
/// `Open` is the only state in which new postings may attach to the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    /// The teller is actively posting against the batch.
    Open,
    /// The batch has been closed with its final figures.
    Ended,
    /// A non-owner has asked to see the batch detail.
    ViewRequested,
    /// A reviewer has granted detail visibility.
    ViewAccepted,
}

impl BatchState {
    /// Returns true while postings may still attach to the batch.
    #[must_use]
    pub fn accepts_postings(&self) -> bool {
        matches!(self, Self::Open)
    }

    /// Returns true once the batch has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !matches!(self, Self::Open)
    }

    /// Check whether a state transition is valid.
    ///
    /// Valid transitions:
    /// - Open → Ended (end)
    /// - Ended → ViewRequested (request view)
    /// - ViewRequested → ViewAccepted (accept view)
    #[must_use]
    pub fn can_transition(from: Self, to: Self) -> bool {
        matches!(
            (from, to),
            (Self::Open, Self::Ended)
                | (Self::Ended, Self::ViewRequested)
                | (Self::ViewRequested, Self::ViewAccepted)
        )
    }
}

impl std::fmt::Display for BatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Ended => "ended",
            Self::ViewRequested => "view_requested",
            Self::ViewAccepted => "view_accepted",
        };
        write!(f, "{s}")
    }
}

/// One named sign-off captured when a batch is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignOff {
    /// Name of the signatory.
    pub name: String,
    /// Position/title of the signatory.
    pub position: String,
    /// Reference to the stored signature image, if captured.
    pub signature_media_id: Option<MediaId>,
}

/// The sign-off sheet recorded at batch close.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignOffSheet {
    /// Who prepared the settlement sheet.
    pub prepared_by: Option<SignOff>,
    /// Who certified the counted figures.
    pub certified_by: Option<SignOff>,
    /// Who approved the settlement.
    pub approved_by: Option<SignOff>,
    /// Who verified the settlement.
    pub verified_by: Option<SignOff>,
}

/// One denomination line of the closing cash count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashCountLine {
    /// Bill or coin denomination.
    pub denomination: Decimal,
    /// Number of pieces counted.
    pub quantity: i64,
}

impl CashCountLine {
    /// Value of this line.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.denomination * Decimal::from(self.quantity)
    }
}

/// Running totals of a batch, recomputed from source rows after every
/// mutating operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchTotals {
    /// Money-in postings (deposits and payments) while the batch was open.
    pub cash_collection: Decimal,
    /// Deposit-source postings only.
    pub deposit_entries: Decimal,
    /// Petty cash disbursed from the drawer.
    pub petty_cash: Decimal,
    /// Loan releases disbursed from the drawer.
    pub loan_releases: Decimal,
    /// Cash withdrawals handed out.
    pub withdrawals: Decimal,
    /// Check remittances recorded against the batch.
    pub check_remittance: Decimal,
    /// Online remittances recorded against the batch.
    pub online_remittance: Decimal,
    /// Cash deposited to the bank at close.
    pub deposit_in_bank: Decimal,
    /// Total of the closing cash count.
    pub cash_count_total: Decimal,
    /// Physical cash the drawer should hold.
    pub cash_on_hand: Decimal,
    /// What the teller is supposed to remit.
    pub supposed_remittance: Decimal,
    /// What was actually counted and deposited.
    pub actual_remittance: Decimal,
    /// Whether supposed and actual agree within tolerance.
    pub is_balanced: bool,
}

/// A teller's cash-handling session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionBatch {
    /// Batch identifier.
    pub id: TransactionBatchId,
    /// Organization scope.
    pub organization_id: OrganizationId,
    /// Branch scope.
    pub branch_id: BranchId,
    /// The teller who owns the batch.
    pub employee_user_id: UserId,
    /// Batch currency.
    pub currency: Currency,
    /// Lifecycle state.
    pub state: BatchState,
    /// Sum of all funding rows (initial seed plus additions).
    pub beginning_balance: Decimal,
    /// Recomputed totals.
    pub totals: BatchTotals,
    /// True once a reviewer has granted detail visibility to non-owners.
    pub can_view: bool,
    /// True while a non-owner's view request is pending.
    pub request_view: bool,
    /// Sign-off sheet captured at close.
    pub sign_offs: Option<SignOffSheet>,
    /// When the batch was started.
    pub started_at: DateTime<Utc>,
    /// When the batch was ended.
    pub ended_at: Option<DateTime<Utc>>,
    /// Who ended the batch.
    pub ended_by: Option<UserId>,
}

impl TransactionBatch {
    /// Returns true if the given user owns this batch.
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.employee_user_id == user_id
    }
}

/// Closing figures supplied when ending a batch.
#[derive(Debug, Clone)]
pub struct CloseBatchInput {
    /// Cash deposited to the bank.
    pub deposit_in_bank: Decimal,
    /// Denomination breakdown of the counted drawer.
    pub cash_counts: Vec<CashCountLine>,
    /// Names signing off on the settlement.
    pub sign_offs: SignOffSheet,
    /// The user ending the batch.
    pub ended_by: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_only_open_accepts_postings() {
        assert!(BatchState::Open.accepts_postings());
        assert!(!BatchState::Ended.accepts_postings());
        assert!(!BatchState::ViewRequested.accepts_postings());
        assert!(!BatchState::ViewAccepted.accepts_postings());
    }

    #[test]
    fn test_valid_transitions() {
        assert!(BatchState::can_transition(BatchState::Open, BatchState::Ended));
        assert!(BatchState::can_transition(
            BatchState::Ended,
            BatchState::ViewRequested
        ));
        assert!(BatchState::can_transition(
            BatchState::ViewRequested,
            BatchState::ViewAccepted
        ));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!BatchState::can_transition(BatchState::Ended, BatchState::Open));
        assert!(!BatchState::can_transition(
            BatchState::Open,
            BatchState::ViewAccepted
        ));
        assert!(!BatchState::can_transition(
            BatchState::ViewAccepted,
            BatchState::ViewRequested
        ));
    }

    #[test]
    fn test_cash_count_line_total() {
        let line = CashCountLine {
            denomination: dec!(500),
            quantity: 13,
        };
        assert_eq!(line.total(), dec!(6500));
    }

    #[test]
    fn test_cash_count_zero_quantity() {
        let line = CashCountLine {
            denomination: dec!(1000),
            quantity: 0,
        };
        assert_eq!(line.total(), dec!(0));
    }
}

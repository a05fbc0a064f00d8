//! Database enum types shared across entities.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account classification, mirrored from the core posting policy.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "account_type")]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Regular savings deposit.
    #[sea_orm(string_value = "deposit")]
    Deposit,
    /// Time deposit.
    #[sea_orm(string_value = "time_deposit")]
    TimeDeposit,
    /// Share capital / savings vault fund ledger.
    #[sea_orm(string_value = "svf_ledger")]
    SvfLedger,
    /// Loan receivable.
    #[sea_orm(string_value = "loan")]
    Loan,
    /// Fines receivable.
    #[sea_orm(string_value = "fines")]
    Fines,
    /// Interest receivable.
    #[sea_orm(string_value = "interest")]
    Interest,
    /// Accounts payable ledger.
    #[sea_orm(string_value = "ap_ledger")]
    ApLedger,
    /// Accounts receivable ledger.
    #[sea_orm(string_value = "ar_ledger")]
    ArLedger,
    /// Accounts receivable aging.
    #[sea_orm(string_value = "ar_aging")]
    ArAging,
    /// Written-off receivable.
    #[sea_orm(string_value = "w_off")]
    WriteOff,
    /// Any other classification.
    #[sea_orm(string_value = "other")]
    Other,
}

impl From<AccountType> for coopra_core::posting::AccountType {
    fn from(value: AccountType) -> Self {
        match value {
            AccountType::Deposit => Self::Deposit,
            AccountType::TimeDeposit => Self::TimeDeposit,
            AccountType::SvfLedger => Self::SvfLedger,
            AccountType::Loan => Self::Loan,
            AccountType::Fines => Self::Fines,
            AccountType::Interest => Self::Interest,
            AccountType::ApLedger => Self::ApLedger,
            AccountType::ArLedger => Self::ArLedger,
            AccountType::ArAging => Self::ArAging,
            AccountType::WriteOff => Self::WriteOff,
            AccountType::Other => Self::Other,
        }
    }
}

impl From<coopra_core::posting::AccountType> for AccountType {
    fn from(value: coopra_core::posting::AccountType) -> Self {
        use coopra_core::posting::AccountType as Core;
        match value {
            Core::Deposit => Self::Deposit,
            Core::TimeDeposit => Self::TimeDeposit,
            Core::SvfLedger => Self::SvfLedger,
            Core::Loan => Self::Loan,
            Core::Fines => Self::Fines,
            Core::Interest => Self::Interest,
            Core::ApLedger => Self::ApLedger,
            Core::ArLedger => Self::ArLedger,
            Core::ArAging => Self::ArAging,
            Core::WriteOff => Self::WriteOff,
            Core::Other => Self::Other,
        }
    }
}

/// Originating operation of a ledger or adjustment entry.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "entry_source")]
#[serde(rename_all = "snake_case")]
pub enum EntrySource {
    /// Cash deposit.
    #[sea_orm(string_value = "deposit")]
    Deposit,
    /// Cash withdrawal.
    #[sea_orm(string_value = "withdraw")]
    Withdraw,
    /// Loan or receivable payment.
    #[sea_orm(string_value = "payment")]
    Payment,
    /// Manual correcting entry.
    #[sea_orm(string_value = "adjustment")]
    Adjustment,
    /// Petty cash disbursement.
    #[sea_orm(string_value = "petty_cash")]
    PettyCash,
    /// Loan release.
    #[sea_orm(string_value = "loan_release")]
    LoanRelease,
}

impl From<EntrySource> for coopra_core::posting::EntrySource {
    fn from(value: EntrySource) -> Self {
        match value {
            EntrySource::Deposit => Self::Deposit,
            EntrySource::Withdraw => Self::Withdraw,
            EntrySource::Payment => Self::Payment,
            EntrySource::Adjustment => Self::Adjustment,
            EntrySource::PettyCash => Self::PettyCash,
            EntrySource::LoanRelease => Self::LoanRelease,
        }
    }
}

impl From<coopra_core::posting::EntrySource> for EntrySource {
    fn from(value: coopra_core::posting::EntrySource) -> Self {
        use coopra_core::posting::EntrySource as Core;
        match value {
            Core::Deposit => Self::Deposit,
            Core::Withdraw => Self::Withdraw,
            Core::Payment => Self::Payment,
            Core::Adjustment => Self::Adjustment,
            Core::PettyCash => Self::PettyCash,
            Core::LoanRelease => Self::LoanRelease,
        }
    }
}

/// Lifecycle state of a transaction batch.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "batch_state")]
#[serde(rename_all = "snake_case")]
pub enum BatchState {
    /// The teller is actively posting against the batch.
    #[sea_orm(string_value = "open")]
    Open,
    /// The batch has been closed with its final figures.
    #[sea_orm(string_value = "ended")]
    Ended,
    /// A non-owner has asked to see the batch detail.
    #[sea_orm(string_value = "view_requested")]
    ViewRequested,
    /// A reviewer has granted detail visibility.
    #[sea_orm(string_value = "view_accepted")]
    ViewAccepted,
}

impl From<BatchState> for coopra_core::batch::BatchState {
    fn from(value: BatchState) -> Self {
        match value {
            BatchState::Open => Self::Open,
            BatchState::Ended => Self::Ended,
            BatchState::ViewRequested => Self::ViewRequested,
            BatchState::ViewAccepted => Self::ViewAccepted,
        }
    }
}

impl From<coopra_core::batch::BatchState> for BatchState {
    fn from(value: coopra_core::batch::BatchState) -> Self {
        use coopra_core::batch::BatchState as Core;
        match value {
            Core::Open => Self::Open,
            Core::Ended => Self::Ended,
            Core::ViewRequested => Self::ViewRequested,
            Core::ViewAccepted => Self::ViewAccepted,
        }
    }
}

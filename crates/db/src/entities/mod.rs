//! `SeaORM` entity definitions.

pub mod accounts;
pub mod adjustment_entries;
pub mod batch_fundings;
pub mod cash_counts;
pub mod check_remittances;
pub mod ledger_entries;
pub mod online_remittances;
pub mod receipt_counters;
pub mod sea_orm_active_enums;
pub mod transaction_batches;
pub mod variance_accounts;

//! `SeaORM` Entity for the transaction_batches table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::BatchState;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_batches")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub employee_user_id: Uuid,
    pub currency: String,
    pub state: BatchState,
    pub beginning_balance: Decimal,
    pub total_cash_collection: Decimal,
    pub total_deposit_entries: Decimal,
    pub total_petty_cash: Decimal,
    pub total_loan_releases: Decimal,
    pub total_withdrawals: Decimal,
    pub total_check_remittance: Decimal,
    pub total_online_remittance: Decimal,
    pub total_deposit_in_bank: Decimal,
    pub total_cash_count: Decimal,
    pub total_cash_on_hand: Decimal,
    pub total_supposed_remittance: Decimal,
    pub total_actual_remittance: Decimal,
    pub is_balanced: bool,
    pub can_view: bool,
    pub request_view: bool,
    pub sign_offs: Option<Json>,
    pub started_at: DateTimeWithTimeZone,
    pub ended_at: Option<DateTimeWithTimeZone>,
    pub ended_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    LedgerEntries,
    #[sea_orm(has_many = "super::adjustment_entries::Entity")]
    AdjustmentEntries,
    #[sea_orm(has_many = "super::batch_fundings::Entity")]
    BatchFundings,
    #[sea_orm(has_many = "super::cash_counts::Entity")]
    CashCounts,
    #[sea_orm(has_many = "super::check_remittances::Entity")]
    CheckRemittances,
    #[sea_orm(has_many = "super::online_remittances::Entity")]
    OnlineRemittances,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl Related<super::batch_fundings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BatchFundings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

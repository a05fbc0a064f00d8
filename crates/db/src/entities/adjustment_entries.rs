//! `SeaORM` Entity for the adjustment_entries table.
//!
//! Manual correcting entries live outside the ordinary payment flow but
//! still attach to a batch and are reversible the same way as ledger rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "adjustment_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub organization_id: Uuid,
    pub branch_id: Uuid,
    pub account_id: Uuid,
    pub member_profile_id: Option<Uuid>,
    pub transaction_batch_id: Option<Uuid>,
    pub currency: String,
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
    pub description: String,
    pub reference_number: Option<String>,
    pub entry_date: Date,
    pub reversal_of: Option<Uuid>,
    pub is_reversed: bool,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id"
    )]
    Accounts,
    #[sea_orm(
        belongs_to = "super::transaction_batches::Entity",
        from = "Column::TransactionBatchId",
        to = "super::transaction_batches::Column::Id"
    )]
    TransactionBatches,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl Related<super::transaction_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionBatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

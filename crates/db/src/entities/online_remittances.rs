//! `SeaORM` Entity for the online_remittances table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "online_remittances")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub transaction_batch_id: Uuid,
    pub provider: String,
    pub reference_number: String,
    pub amount: Decimal,
    pub date_entry: Date,
    pub created_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transaction_batches::Entity",
        from = "Column::TransactionBatchId",
        to = "super::transaction_batches::Column::Id"
    )]
    TransactionBatches,
}

impl Related<super::transaction_batches::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionBatches.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

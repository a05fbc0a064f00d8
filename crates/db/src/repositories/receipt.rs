//! Receipt number allocation.
//!
//! Two counters live here: the official receipt (reference) number, one
//! sequence per organization/branch, and the per-(member, account, branch)
//! print number stamped on an entry's first print request. Both are
//! allocated inside the caller's database transaction so concurrent
//! requests cannot hand out the same number.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use coopra_shared::types::{AccountId, BranchId, LedgerEntryId, MemberProfileId, OrganizationId};

use crate::entities::{ledger_entries, receipt_counters};

/// Error types for receipt allocation.
#[derive(Debug, thiserror::Error)]
pub enum ReceiptError {
    /// Ledger entry not found.
    #[error("Ledger entry not found: {0}")]
    EntryNotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Allocator for official receipt and print numbers.
pub struct ReceiptAllocator;

impl ReceiptAllocator {
    /// Allocates the next official receipt number for the scope.
    ///
    /// The counter row is read under an exclusive row lock, so the database
    /// serializes concurrent allocations; the unique reference-number index
    /// on ledger entries is the backstop for any race that slips past.
    ///
    /// Must be called inside the transaction that persists the entry.
    pub async fn next_reference_number<C: ConnectionTrait>(
        conn: &C,
        organization_id: OrganizationId,
        branch_id: BranchId,
        pad_width: usize,
    ) -> Result<String, DbErr> {
        let existing = receipt_counters::Entity::find()
            .filter(receipt_counters::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(receipt_counters::Column::BranchId.eq(branch_id.into_inner()))
            .lock_exclusive()
            .one(conn)
            .await?;

        let next = match existing {
            Some(row) => {
                let next = row.counter + 1;
                let mut active: receipt_counters::ActiveModel = row.into();
                active.counter = Set(next);
                active.updated_at = Set(Utc::now().into());
                active.update(conn).await?;
                next
            }
            None => {
                receipt_counters::ActiveModel {
                    id: Set(Uuid::now_v7()),
                    organization_id: Set(organization_id.into_inner()),
                    branch_id: Set(branch_id.into_inner()),
                    counter: Set(1),
                    updated_at: Set(Utc::now().into()),
                }
                .insert(conn)
                .await?;
                1
            }
        };

        Ok(format_reference_number(next, pad_width))
    }

    /// Stamps the entry's print number on its first print request.
    ///
    /// Idempotent: an already-stamped entry returns its existing number. A
    /// fresh stamp takes the next value of the strictly increasing
    /// per-(member, account, branch) sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::EntryNotFound`] for an unknown entry.
    pub async fn stamp_print_number<C: ConnectionTrait>(
        conn: &C,
        entry_id: LedgerEntryId,
    ) -> Result<i64, ReceiptError> {
        let entry = ledger_entries::Entity::find_by_id(entry_id.into_inner())
            .one(conn)
            .await?
            .ok_or(ReceiptError::EntryNotFound(entry_id.into_inner()))?;

        if let Some(number) = entry.print_number {
            return Ok(number);
        }

        let next = Self::next_print_number(
            conn,
            OrganizationId::from_uuid(entry.organization_id),
            BranchId::from_uuid(entry.branch_id),
            entry.member_profile_id.map(MemberProfileId::from_uuid),
            AccountId::from_uuid(entry.account_id),
        )
        .await?;

        let mut active: ledger_entries::ActiveModel = entry.into();
        active.print_number = Set(Some(next));
        active.update(conn).await?;

        Ok(next)
    }

    /// Computes the next print number for the tuple: highest stamped value
    /// plus one, starting at 1.
    pub async fn next_print_number<C: ConnectionTrait>(
        conn: &C,
        organization_id: OrganizationId,
        branch_id: BranchId,
        member_profile_id: Option<MemberProfileId>,
        account_id: AccountId,
    ) -> Result<i64, DbErr> {
        let mut query = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::OrganizationId.eq(organization_id.into_inner()))
            .filter(ledger_entries::Column::BranchId.eq(branch_id.into_inner()))
            .filter(ledger_entries::Column::AccountId.eq(account_id.into_inner()))
            .filter(ledger_entries::Column::PrintNumber.is_not_null());

        query = match member_profile_id {
            Some(member) => {
                query.filter(ledger_entries::Column::MemberProfileId.eq(member.into_inner()))
            }
            None => query.filter(ledger_entries::Column::MemberProfileId.is_null()),
        };

        let highest = query
            .order_by_desc(ledger_entries::Column::PrintNumber)
            .lock_exclusive()
            .one(conn)
            .await?
            .and_then(|entry| entry.print_number);

        Ok(highest.unwrap_or(0) + 1)
    }
}

/// Formats a counter value as a zero-padded official receipt number.
pub(crate) fn format_reference_number(value: i64, pad_width: usize) -> String {
    format!("OR-{value:0pad_width$}")
}

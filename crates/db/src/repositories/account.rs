//! Account repository: chart-of-accounts reads and balance resolution.
//!
//! Account CRUD itself belongs to the back-office plumbing; the engine only
//! needs to resolve an account's classification and its latest balance. The
//! balance is always the snapshot carried by the newest entry, never a
//! running counter.

use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use std::str::FromStr;
use uuid::Uuid;

use coopra_core::posting::AccountRef;
use coopra_shared::types::{AccountId, Currency, MemberProfileId};

use crate::entities::{accounts, adjustment_entries, ledger_entries};

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account not found.
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    /// Account carries a currency code the engine does not recognize.
    #[error("Account {id} has invalid currency '{currency}'")]
    InvalidCurrency {
        /// The account ID.
        id: Uuid,
        /// The unrecognized currency code.
        currency: String,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads an account by ID.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::NotFound`] when no account exists.
    pub async fn find(&self, id: AccountId) -> Result<accounts::Model, AccountError> {
        Self::find_on(&self.db, id).await
    }

    /// Loads an account by ID on the given connection.
    pub async fn find_on<C: ConnectionTrait>(
        conn: &C,
        id: AccountId,
    ) -> Result<accounts::Model, AccountError> {
        accounts::Entity::find_by_id(id.into_inner())
            .one(conn)
            .await?
            .ok_or(AccountError::NotFound(id.into_inner()))
    }

    /// Converts an account row into the reference the posting service needs.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidCurrency`] when the stored currency
    /// code does not parse.
    pub fn to_account_ref(model: &accounts::Model) -> Result<AccountRef, AccountError> {
        let currency = Currency::from_str(&model.currency).map_err(|_| {
            AccountError::InvalidCurrency {
                id: model.id,
                currency: model.currency.clone(),
            }
        })?;

        Ok(AccountRef {
            id: AccountId::from_uuid(model.id),
            account_type: model.account_type.clone().into(),
            currency,
        })
    }

    /// Resolves the latest balance for an account and member.
    ///
    /// Reads the newest balance snapshot across both ledger and adjustment
    /// entries; zero when no entry exists yet.
    pub async fn latest_balance<C: ConnectionTrait>(
        conn: &C,
        account_id: AccountId,
        member_profile_id: Option<MemberProfileId>,
    ) -> Result<Decimal, DbErr> {
        let mut ledger_query = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::AccountId.eq(account_id.into_inner()));
        let mut adjustment_query = adjustment_entries::Entity::find()
            .filter(adjustment_entries::Column::AccountId.eq(account_id.into_inner()));

        match member_profile_id {
            Some(member) => {
                ledger_query = ledger_query
                    .filter(ledger_entries::Column::MemberProfileId.eq(member.into_inner()));
                adjustment_query = adjustment_query
                    .filter(adjustment_entries::Column::MemberProfileId.eq(member.into_inner()));
            }
            None => {
                ledger_query =
                    ledger_query.filter(ledger_entries::Column::MemberProfileId.is_null());
                adjustment_query = adjustment_query
                    .filter(adjustment_entries::Column::MemberProfileId.is_null());
            }
        }

        let newest_ledger = ledger_query
            .order_by_desc(ledger_entries::Column::CreatedAt)
            .one(conn)
            .await?
            .map(|entry| (entry.created_at, entry.balance));

        let newest_adjustment = adjustment_query
            .order_by_desc(adjustment_entries::Column::CreatedAt)
            .one(conn)
            .await?
            .map(|entry| (entry.created_at, entry.balance));

        Ok(newest_balance(newest_ledger, newest_adjustment))
    }
}

/// Picks the balance of whichever snapshot is newer; zero when neither
/// table has an entry.
pub(crate) fn newest_balance(
    ledger: Option<(sea_orm::prelude::DateTimeWithTimeZone, Decimal)>,
    adjustment: Option<(sea_orm::prelude::DateTimeWithTimeZone, Decimal)>,
) -> Decimal {
    match (ledger, adjustment) {
        (Some((led_at, led_bal)), Some((adj_at, adj_bal))) => {
            if adj_at > led_at { adj_bal } else { led_bal }
        }
        (Some((_, balance)), None) | (None, Some((_, balance))) => balance,
        (None, None) => Decimal::ZERO,
    }
}

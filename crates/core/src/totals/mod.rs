//! Read-side debit/credit aggregation.
//!
//! Sums a set of ledger or adjustment entries into totals for display and
//! reporting. Pure summation; the only failure is an entry that does not
//! resolve to an account, since the sign policy could not have been
//! meaningful for it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use coopra_shared::types::{AccountId, Currency};

/// The slice of an entry the aggregator reads.
#[derive(Debug, Clone, Copy)]
pub struct EntryAmounts {
    /// The account the entry was posted against; `None` marks a broken
    /// reference.
    pub account_id: Option<AccountId>,
    /// Entry currency.
    pub currency: Currency,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
}

/// Aggregated totals over a set of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryTotals {
    /// Sum of debits.
    pub debit: Decimal,
    /// Sum of credits.
    pub credit: Decimal,
    /// Absolute difference between the two sides.
    pub balance: Decimal,
    /// Whether the sides agree exactly.
    pub is_balanced: bool,
}

/// Errors that can occur during aggregation.
#[derive(Debug, Error)]
pub enum TotalsError {
    /// An entry does not reference a classified account.
    #[error("Entry at index {0} does not reference an account")]
    MissingAccount(usize),
}

/// Stateless read-side aggregation service.
pub struct BalanceAggregator;

impl BalanceAggregator {
    /// Sums the given entries, optionally filtered to one currency.
    ///
    /// # Errors
    ///
    /// Returns [`TotalsError::MissingAccount`] when an entry (after currency
    /// filtering) has no account reference.
    pub fn totals(
        entries: &[EntryAmounts],
        currency: Option<Currency>,
    ) -> Result<EntryTotals, TotalsError> {
        let mut debit = Decimal::ZERO;
        let mut credit = Decimal::ZERO;

        for (index, entry) in entries.iter().enumerate() {
            if let Some(filter) = currency {
                if entry.currency != filter {
                    continue;
                }
            }
            if entry.account_id.is_none() {
                return Err(TotalsError::MissingAccount(index));
            }

            debit += entry.debit;
            credit += entry.credit;
        }

        Ok(EntryTotals {
            debit,
            credit,
            balance: (debit - credit).abs(),
            is_balanced: debit == credit,
        })
    }
}

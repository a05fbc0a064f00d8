//! Batch reconciliation: recompute totals from source rows.
//!
//! Totals are always rebuilt from the full set of rows tied to the batch,
//! never incremented in place. A partial failure therefore cannot leave the
//! stored totals drifted from the rows they summarize.

use rust_decimal::Decimal;

use coopra_shared::types::Currency;

use crate::posting::{AccountType, EntrySource};

use super::types::BatchTotals;

/// The slice of a ledger or adjustment entry reconciliation needs.
///
/// `money_in` is derived from the entry's side and its account's
/// classification via [`is_money_in`]; reversals naturally carry the
/// opposite direction and net out of the totals.
#[derive(Debug, Clone, Copy)]
pub struct BatchEntryLine {
    /// Originating operation.
    pub source: EntrySource,
    /// Entry currency.
    pub currency: Currency,
    /// Posting magnitude.
    pub amount: Decimal,
    /// True when the entry brought cash into the drawer.
    pub money_in: bool,
}

/// Derives the cash direction of an entry from its ledger side and the
/// account classification.
///
/// Money-in postings credit savings-style accounts and debit
/// liability-style accounts; anything else is money out.
#[must_use]
pub fn is_money_in(account_type: AccountType, debit: Decimal, credit: Decimal) -> bool {
    if account_type.is_deposit_family() {
        credit > debit
    } else {
        debit > credit
    }
}

/// Per-operation sums over the entries of one batch, in the batch currency.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntrySums {
    /// Net money-in from deposits and payments (and adjustments).
    pub cash_collection: Decimal,
    /// Net deposit-source postings.
    pub deposit_entries: Decimal,
    /// Net petty cash disbursed.
    pub petty_cash: Decimal,
    /// Net loan releases disbursed.
    pub loan_releases: Decimal,
    /// Net cash withdrawals.
    pub withdrawals: Decimal,
}

impl EntrySums {
    /// Sums entry lines for the given currency. Lines in other currencies
    /// are ignored.
    #[must_use]
    pub fn from_lines(lines: &[BatchEntryLine], currency: Currency) -> Self {
        let mut sums = Self::default();

        for line in lines.iter().filter(|l| l.currency == currency) {
            let signed_in = if line.money_in {
                line.amount
            } else {
                -line.amount
            };
            let signed_out = -signed_in;

            match line.source {
                EntrySource::Deposit => {
                    sums.deposit_entries += signed_in;
                    sums.cash_collection += signed_in;
                }
                EntrySource::Payment | EntrySource::Adjustment => {
                    sums.cash_collection += signed_in;
                }
                EntrySource::Withdraw => sums.withdrawals += signed_out,
                EntrySource::PettyCash => sums.petty_cash += signed_out,
                EntrySource::LoanRelease => sums.loan_releases += signed_out,
            }
        }

        sums
    }
}

/// Check and online remittance sums recorded against a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RemittanceSums {
    /// Sum of check remittances.
    pub checks: Decimal,
    /// Sum of online remittances.
    pub online: Decimal,
}

/// Stateless reconciliation math.
pub struct Reconciliation;

impl Reconciliation {
    /// Rebuilds a batch's totals from its source rows.
    ///
    /// * `funding_total` - sum of all funding rows (initial seed plus
    ///   additions); doubles as the beginning balance
    /// * `deposit_in_bank` / `cash_count_total` - closing figures, zero
    ///   while the batch is still open
    /// * `epsilon` - tolerance for the supposed-vs-actual comparison
    ///
    /// Imbalance is reported through `is_balanced`, never as an error.
    #[must_use]
    pub fn recompute(
        funding_total: Decimal,
        sums: &EntrySums,
        remittances: RemittanceSums,
        deposit_in_bank: Decimal,
        cash_count_total: Decimal,
        epsilon: Decimal,
    ) -> BatchTotals {
        let supposed_remittance = funding_total + sums.cash_collection + remittances.checks
            + remittances.online
            - sums.withdrawals
            - sums.loan_releases;

        let actual_remittance =
            cash_count_total + deposit_in_bank + remittances.checks + remittances.online;

        let cash_on_hand = funding_total + sums.cash_collection
            - sums.withdrawals
            - sums.petty_cash
            - sums.loan_releases;

        BatchTotals {
            cash_collection: sums.cash_collection,
            deposit_entries: sums.deposit_entries,
            petty_cash: sums.petty_cash,
            loan_releases: sums.loan_releases,
            withdrawals: sums.withdrawals,
            check_remittance: remittances.checks,
            online_remittance: remittances.online,
            deposit_in_bank,
            cash_count_total,
            cash_on_hand,
            supposed_remittance,
            actual_remittance,
            is_balanced: (supposed_remittance - actual_remittance).abs() <= epsilon,
        }
    }
}

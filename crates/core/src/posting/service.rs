//! Posting service: builds ledger entries from teller operations.
//!
//! The service is side-effect free. It computes the debit/credit effect via
//! the sign policy and returns a [`DraftEntry`] that the payment orchestrator
//! persists inside its database transaction.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use coopra_shared::types::{
    AccountId, Currency, LedgerEntryId, MemberProfileId, OperationScope, TransactionId, UserId,
};

use super::entry::{DraftEntry, EntrySource, PostedEntry};
use super::error::PostingError;
use super::sign::{AccountType, OperationKind, SignPolicy};

/// The slice of an account the posting service needs.
#[derive(Debug, Clone, Copy)]
pub struct AccountRef {
    /// The account ID.
    pub id: AccountId,
    /// The account's classification.
    pub account_type: AccountType,
    /// The account's currency.
    pub currency: Currency,
}

/// Input for posting a single ledger entry.
#[derive(Debug, Clone)]
pub struct PostInput {
    /// The identity scope the operation runs under.
    pub scope: OperationScope,
    /// The account being posted against.
    pub account: AccountRef,
    /// The member the posting belongs to, when member-facing.
    pub member_profile_id: Option<MemberProfileId>,
    /// The teller transaction this posting is part of, if any.
    pub transaction_id: Option<TransactionId>,
    /// The operation being performed.
    pub operation: OperationKind,
    /// Signed amount; negative flips the cash direction.
    pub amount: Decimal,
    /// Posting currency; must match the account currency.
    pub currency: Currency,
    /// Human-readable description.
    pub description: String,
    /// Official receipt / reference number, when already known.
    pub reference_number: Option<String>,
    /// Business date of the entry.
    pub entry_date: NaiveDate,
}

impl From<OperationKind> for EntrySource {
    fn from(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Deposit => Self::Deposit,
            OperationKind::Withdraw => Self::Withdraw,
            OperationKind::Payment => Self::Payment,
            OperationKind::Adjustment => Self::Adjustment,
            OperationKind::PettyCash => Self::PettyCash,
            OperationKind::LoanRelease => Self::LoanRelease,
        }
    }
}

/// Stateless service producing ledger entry drafts.
pub struct PostingService;

impl PostingService {
    /// Builds the ledger entry for a teller operation.
    ///
    /// `prior_balance` is the account's latest balance as resolved by the
    /// caller; the returned draft carries the post-entry balance snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`PostingError::CurrencyMismatch`] when the posting currency
    /// differs from the account currency, or any sign-policy error
    /// (`InvalidAmount`, `InsufficientBalance`).
    pub fn post(input: &PostInput, prior_balance: Decimal) -> Result<DraftEntry, PostingError> {
        if input.currency != input.account.currency {
            return Err(PostingError::CurrencyMismatch {
                account: input.account.currency.to_string(),
                posting: input.currency.to_string(),
            });
        }

        let effect = SignPolicy::apply(
            input.account.account_type,
            input.operation,
            input.amount,
            prior_balance,
        )?;

        Ok(DraftEntry {
            id: LedgerEntryId::new(),
            organization_id: input.scope.organization_id,
            branch_id: input.scope.branch_id,
            account_id: input.account.id,
            member_profile_id: input.member_profile_id,
            transaction_id: input.transaction_id,
            transaction_batch_id: None,
            source: input.operation.into(),
            currency: input.currency,
            debit: effect.debit,
            credit: effect.credit,
            balance: prior_balance + effect.balance_delta,
            description: input.description.clone(),
            reference_number: input.reference_number.clone(),
            entry_date: input.entry_date,
            reversal_of: None,
            created_by: input.scope.user_id,
            created_at: Utc::now(),
        })
    }

    /// Builds the exact reversal of a previously posted entry.
    ///
    /// Debit and credit are swapped, so the reversal's balance effect is the
    /// negation of the original's. The description is prefixed `REVERSAL:`
    /// and the draft back-references the original entry.
    ///
    /// `prior_balance` is the account's latest balance at reversal time (the
    /// account may have moved since the original posting).
    ///
    /// # Errors
    ///
    /// Returns [`PostingError::AlreadyReversed`] when the original has
    /// already been reversed once.
    pub fn reverse(
        original: &PostedEntry,
        prior_balance: Decimal,
        reversed_by: UserId,
        entry_date: NaiveDate,
    ) -> Result<DraftEntry, PostingError> {
        if original.is_reversed {
            return Err(PostingError::AlreadyReversed(original.id));
        }

        // Swapping the sides negates the balance delta.
        let debit = original.credit;
        let credit = original.debit;

        Ok(DraftEntry {
            id: LedgerEntryId::new(),
            organization_id: original.organization_id,
            branch_id: original.branch_id,
            account_id: original.account_id,
            member_profile_id: original.member_profile_id,
            transaction_id: original.transaction_id,
            transaction_batch_id: None,
            source: original.source,
            currency: original.currency,
            debit,
            credit,
            balance: prior_balance + (credit - debit),
            description: format!("REVERSAL: {}", original.description),
            reference_number: original.reference_number.clone(),
            entry_date,
            reversal_of: Some(original.id),
            created_by: reversed_by,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coopra_shared::types::{BranchId, OrganizationId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn scope() -> OperationScope {
        OperationScope::employee(UserId::new(), OrganizationId::new(), BranchId::new())
    }

    fn account(account_type: AccountType) -> AccountRef {
        AccountRef {
            id: AccountId::new(),
            account_type,
            currency: Currency::Php,
        }
    }

    fn input(account_type: AccountType, operation: OperationKind, amount: Decimal) -> PostInput {
        PostInput {
            scope: scope(),
            account: account(account_type),
            member_profile_id: Some(MemberProfileId::new()),
            transaction_id: None,
            operation,
            amount,
            currency: Currency::Php,
            description: "Counter transaction".to_string(),
            reference_number: None,
            entry_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        }
    }

    #[test]
    fn test_post_deposit_to_savings_account() {
        let input = input(AccountType::Deposit, OperationKind::Deposit, dec!(500));
        let entry = PostingService::post(&input, dec!(1000)).unwrap();

        assert_eq!(entry.credit, dec!(500));
        assert_eq!(entry.debit, dec!(0));
        assert_eq!(entry.balance, dec!(1500));
        assert_eq!(entry.source, EntrySource::Deposit);
        assert!(entry.reversal_of.is_none());
    }

    #[test]
    fn test_post_payment_to_loan_account() {
        let input = input(AccountType::Loan, OperationKind::Payment, dec!(200));
        let entry = PostingService::post(&input, dec!(5000)).unwrap();

        assert_eq!(entry.debit, dec!(200));
        assert_eq!(entry.credit, dec!(0));
        assert_eq!(entry.balance, dec!(4800));
    }

    #[test]
    fn test_post_currency_mismatch() {
        let mut input = input(AccountType::Deposit, OperationKind::Deposit, dec!(500));
        input.currency = Currency::Usd;

        let result = PostingService::post(&input, dec!(0));
        assert!(matches!(result, Err(PostingError::CurrencyMismatch { .. })));
    }

    #[test]
    fn test_post_stamps_audit_fields() {
        let input = input(AccountType::Deposit, OperationKind::Deposit, dec!(10));
        let entry = PostingService::post(&input, dec!(0)).unwrap();

        assert_eq!(entry.created_by, input.scope.user_id);
        assert_eq!(entry.organization_id, input.scope.organization_id);
        assert_eq!(entry.branch_id, input.scope.branch_id);
    }

    fn posted_from(draft: DraftEntry) -> PostedEntry {
        PostedEntry {
            id: draft.id,
            organization_id: draft.organization_id,
            branch_id: draft.branch_id,
            account_id: draft.account_id,
            member_profile_id: draft.member_profile_id,
            transaction_id: draft.transaction_id,
            transaction_batch_id: draft.transaction_batch_id,
            source: draft.source,
            currency: draft.currency,
            debit: draft.debit,
            credit: draft.credit,
            balance: draft.balance,
            description: draft.description,
            reference_number: draft.reference_number,
            print_number: None,
            entry_date: draft.entry_date,
            reversal_of: draft.reversal_of,
            is_reversed: false,
            created_by: draft.created_by,
            created_at: draft.created_at,
        }
    }

    #[rstest]
    #[case(AccountType::Deposit, OperationKind::Deposit)]
    #[case(AccountType::Loan, OperationKind::Payment)]
    #[case(AccountType::Interest, OperationKind::Payment)]
    #[case(AccountType::ArLedger, OperationKind::Deposit)]
    fn test_reverse_negates_balance_effect(
        #[case] account_type: AccountType,
        #[case] operation: OperationKind,
    ) {
        let prior = dec!(1000);
        let input = input(account_type, operation, dec!(200));
        let original = PostingService::post(&input, prior).unwrap();
        let posted = posted_from(original.clone());

        let reversal = PostingService::reverse(
            &posted,
            original.balance,
            UserId::new(),
            posted.entry_date,
        )
        .unwrap();

        assert_eq!(reversal.debit, original.credit);
        assert_eq!(reversal.credit, original.debit);
        assert_eq!(reversal.balance, prior);
        assert_eq!(reversal.reversal_of, Some(posted.id));
        assert!(reversal.description.starts_with("REVERSAL: "));
    }

    #[test]
    fn test_reverse_loan_payment_restores_balance() {
        // A loan payment of 200 debits the account and reduces its balance;
        // the reversal credits 200 and restores it.
        let input = input(AccountType::Loan, OperationKind::Payment, dec!(200));
        let original = PostingService::post(&input, dec!(3000)).unwrap();
        assert_eq!(original.balance, dec!(2800));

        let posted = posted_from(original);
        let reversal =
            PostingService::reverse(&posted, dec!(2800), UserId::new(), posted.entry_date).unwrap();

        assert_eq!(reversal.credit, dec!(200));
        assert_eq!(reversal.balance, dec!(3000));
    }

    #[test]
    fn test_reverse_already_reversed_rejected() {
        let input = input(AccountType::Deposit, OperationKind::Deposit, dec!(50));
        let mut posted = posted_from(PostingService::post(&input, dec!(0)).unwrap());
        posted.is_reversed = true;

        let result =
            PostingService::reverse(&posted, dec!(50), UserId::new(), posted.entry_date);
        assert!(matches!(result, Err(PostingError::AlreadyReversed(id)) if id == posted.id));
    }
}

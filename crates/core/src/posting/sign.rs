//! Account classifications and the debit/credit sign policy.
//!
//! Every teller operation is either money-in (deposit-style) or money-out
//! (withdrawal-style). Which side of the ledger the amount lands on depends
//! on the account classification: savings-style accounts grow when money
//! comes in, liability-style accounts (loans, fines, interest, payables)
//! shrink.
//!
//! Invariant maintained by this module: for every effect it produces,
//! `balance_delta == credit - debit`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::PostingError;

/// Classification of a ledger account.
///
/// Owned by the chart of accounts; the engine only reads it. Classification
/// strings coming from storage are parsed with [`std::str::FromStr`] and
/// unknown values are rejected before any posting logic runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Regular savings deposit.
    Deposit,
    /// Time deposit.
    TimeDeposit,
    /// Share capital / savings vault fund ledger.
    SvfLedger,
    /// Loan receivable.
    Loan,
    /// Fines receivable.
    Fines,
    /// Interest receivable.
    Interest,
    /// Accounts payable ledger.
    ApLedger,
    /// Accounts receivable ledger.
    ArLedger,
    /// Accounts receivable aging.
    ArAging,
    /// Written-off receivable.
    WriteOff,
    /// Any other classification.
    Other,
}

impl AccountType {
    /// All classifications, in display order.
    pub const ALL: [Self; 11] = [
        Self::Deposit,
        Self::TimeDeposit,
        Self::SvfLedger,
        Self::Loan,
        Self::Fines,
        Self::Interest,
        Self::ApLedger,
        Self::ArLedger,
        Self::ArAging,
        Self::WriteOff,
        Self::Other,
    ];

    /// Returns true for classifications where money-in credits the account
    /// and increases its balance (savings-style).
    #[must_use]
    pub const fn is_deposit_family(self) -> bool {
        matches!(
            self,
            Self::Deposit
                | Self::TimeDeposit
                | Self::SvfLedger
                | Self::ArLedger
                | Self::ArAging
                | Self::WriteOff
                | Self::Other
        )
    }

    /// Returns true for classifications where money-in debits the account
    /// and reduces its balance (liability-style: loans, fines, interest,
    /// payables).
    #[must_use]
    pub const fn is_loan_family(self) -> bool {
        !self.is_deposit_family()
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Deposit => "deposit",
            Self::TimeDeposit => "time_deposit",
            Self::SvfLedger => "svf_ledger",
            Self::Loan => "loan",
            Self::Fines => "fines",
            Self::Interest => "interest",
            Self::ApLedger => "ap_ledger",
            Self::ArLedger => "ar_ledger",
            Self::ArAging => "ar_aging",
            Self::WriteOff => "w_off",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for AccountType {
    type Err = PostingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "deposit" => Ok(Self::Deposit),
            "time_deposit" => Ok(Self::TimeDeposit),
            "svf_ledger" => Ok(Self::SvfLedger),
            "loan" => Ok(Self::Loan),
            "fines" => Ok(Self::Fines),
            "interest" => Ok(Self::Interest),
            "ap_ledger" => Ok(Self::ApLedger),
            "ar_ledger" => Ok(Self::ArLedger),
            "ar_aging" => Ok(Self::ArAging),
            "w_off" => Ok(Self::WriteOff),
            "other" => Ok(Self::Other),
            _ => Err(PostingError::UnknownAccountType(s.to_string())),
        }
    }
}

/// The teller operation being posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Cash deposit by a member.
    Deposit,
    /// Cash withdrawal by a member.
    Withdraw,
    /// Payment against a loan or receivable.
    Payment,
    /// Manual correcting entry.
    Adjustment,
    /// Petty cash disbursement.
    PettyCash,
    /// Loan release (disbursement to the member).
    LoanRelease,
}

impl OperationKind {
    /// Returns true when the operation brings money into the teller's drawer.
    #[must_use]
    pub const fn is_money_in(self) -> bool {
        matches!(self, Self::Deposit | Self::Payment | Self::Adjustment)
    }

    /// The operation with the opposite cash direction. Used when a negative
    /// amount redirects a deposit into a withdrawal (and vice versa).
    #[must_use]
    pub const fn inverse(self) -> Self {
        match self {
            Self::Deposit => Self::Withdraw,
            Self::Withdraw => Self::Deposit,
            // Payments reverse as withdrawals, disbursements as payments.
            Self::Payment | Self::Adjustment => Self::Withdraw,
            Self::PettyCash | Self::LoanRelease => Self::Payment,
        }
    }
}

/// The ledger effect of applying an operation to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignEffect {
    /// Amount posted to the debit column (zero if the credit side is used).
    pub debit: Decimal,
    /// Amount posted to the credit column (zero if the debit side is used).
    pub credit: Decimal,
    /// Change applied to the account balance. Always `credit - debit`.
    pub balance_delta: Decimal,
}

impl SignEffect {
    fn debit_of(amount: Decimal) -> Self {
        Self {
            debit: amount,
            credit: Decimal::ZERO,
            balance_delta: -amount,
        }
    }

    fn credit_of(amount: Decimal) -> Self {
        Self {
            debit: Decimal::ZERO,
            credit: amount,
            balance_delta: amount,
        }
    }
}

/// Pure mapping from (account classification, operation, amount) to a
/// debit/credit effect.
pub struct SignPolicy;

impl SignPolicy {
    /// Computes the ledger effect of `operation` for `amount` against an
    /// account of type `account_type` currently holding `current_balance`.
    ///
    /// A negative amount is redirected to the opposite cash direction with
    /// the sign flipped, so a single signed amount field can express both
    /// directions. Money-out operations are checked against the current
    /// balance before any effect is produced.
    ///
    /// # Errors
    ///
    /// - [`PostingError::InvalidAmount`] when `amount` is zero
    /// - [`PostingError::InsufficientBalance`] when a money-out operation
    ///   exceeds the current balance
    pub fn apply(
        account_type: AccountType,
        operation: OperationKind,
        amount: Decimal,
        current_balance: Decimal,
    ) -> Result<SignEffect, PostingError> {
        if amount.is_zero() {
            return Err(PostingError::InvalidAmount);
        }

        // Negative amounts flip the cash direction.
        let (operation, amount) = if amount.is_sign_negative() {
            (operation.inverse(), amount.abs())
        } else {
            (operation, amount)
        };

        if operation.is_money_in() {
            Ok(Self::money_in_effect(account_type, amount))
        } else {
            if current_balance < amount {
                return Err(PostingError::InsufficientBalance {
                    balance: current_balance,
                    requested: amount,
                });
            }
            Ok(Self::money_out_effect(account_type, amount))
        }
    }

    /// Deposit-style effect: savings-style accounts are credited and grow,
    /// liability-style accounts are debited and shrink.
    fn money_in_effect(account_type: AccountType, amount: Decimal) -> SignEffect {
        if account_type.is_deposit_family() {
            SignEffect::credit_of(amount)
        } else {
            SignEffect::debit_of(amount)
        }
    }

    /// Withdrawal-style effect: the exact sign mirror of
    /// [`Self::money_in_effect`] for every classification.
    fn money_out_effect(account_type: AccountType, amount: Decimal) -> SignEffect {
        if account_type.is_deposit_family() {
            SignEffect::debit_of(amount)
        } else {
            SignEffect::credit_of(amount)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    const BIG_BALANCE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

    #[rstest]
    #[case(AccountType::Deposit, true)]
    #[case(AccountType::TimeDeposit, true)]
    #[case(AccountType::SvfLedger, true)]
    #[case(AccountType::ArLedger, true)]
    #[case(AccountType::ArAging, true)]
    #[case(AccountType::WriteOff, true)]
    #[case(AccountType::Other, true)]
    #[case(AccountType::Loan, false)]
    #[case(AccountType::Fines, false)]
    #[case(AccountType::Interest, false)]
    #[case(AccountType::ApLedger, false)]
    fn test_deposit_family_membership(#[case] account_type: AccountType, #[case] expected: bool) {
        assert_eq!(account_type.is_deposit_family(), expected);
        assert_eq!(account_type.is_loan_family(), !expected);
    }

    #[rstest]
    #[case(AccountType::Deposit)]
    #[case(AccountType::TimeDeposit)]
    #[case(AccountType::SvfLedger)]
    #[case(AccountType::ArLedger)]
    #[case(AccountType::ArAging)]
    #[case(AccountType::WriteOff)]
    #[case(AccountType::Other)]
    fn test_deposit_credits_savings_accounts(#[case] account_type: AccountType) {
        let effect =
            SignPolicy::apply(account_type, OperationKind::Deposit, dec!(500), dec!(0)).unwrap();

        assert_eq!(effect.credit, dec!(500));
        assert_eq!(effect.debit, dec!(0));
        assert_eq!(effect.balance_delta, dec!(500));
    }

    #[rstest]
    #[case(AccountType::Loan)]
    #[case(AccountType::Fines)]
    #[case(AccountType::Interest)]
    #[case(AccountType::ApLedger)]
    fn test_deposit_debits_liability_accounts(#[case] account_type: AccountType) {
        let effect =
            SignPolicy::apply(account_type, OperationKind::Deposit, dec!(500), dec!(0)).unwrap();

        assert_eq!(effect.debit, dec!(500));
        assert_eq!(effect.credit, dec!(0));
        assert_eq!(effect.balance_delta, dec!(-500));
    }

    #[test]
    fn test_withdraw_mirrors_deposit_for_every_type() {
        for account_type in AccountType::ALL {
            let deposit =
                SignPolicy::apply(account_type, OperationKind::Deposit, dec!(75), BIG_BALANCE)
                    .unwrap();
            let withdraw =
                SignPolicy::apply(account_type, OperationKind::Withdraw, dec!(75), BIG_BALANCE)
                    .unwrap();

            assert_eq!(withdraw.debit, deposit.credit, "{account_type}");
            assert_eq!(withdraw.credit, deposit.debit, "{account_type}");
            assert_eq!(withdraw.balance_delta, -deposit.balance_delta, "{account_type}");
        }
    }

    #[test]
    fn test_negative_deposit_redirects_to_withdraw() {
        for account_type in AccountType::ALL {
            let redirected =
                SignPolicy::apply(account_type, OperationKind::Deposit, dec!(-40), BIG_BALANCE)
                    .unwrap();
            let withdraw =
                SignPolicy::apply(account_type, OperationKind::Withdraw, dec!(40), BIG_BALANCE)
                    .unwrap();

            assert_eq!(redirected, withdraw, "{account_type}");
        }
    }

    #[test]
    fn test_negative_withdraw_redirects_to_deposit() {
        for account_type in AccountType::ALL {
            let redirected =
                SignPolicy::apply(account_type, OperationKind::Withdraw, dec!(-40), dec!(0))
                    .unwrap();
            let deposit =
                SignPolicy::apply(account_type, OperationKind::Deposit, dec!(40), dec!(0)).unwrap();

            assert_eq!(redirected, deposit, "{account_type}");
        }
    }

    #[test]
    fn test_zero_amount_rejected() {
        let result =
            SignPolicy::apply(AccountType::Deposit, OperationKind::Deposit, dec!(0), dec!(100));
        assert!(matches!(result, Err(PostingError::InvalidAmount)));
    }

    #[test]
    fn test_withdraw_insufficient_balance() {
        let result = SignPolicy::apply(
            AccountType::Deposit,
            OperationKind::Withdraw,
            dec!(150),
            dec!(100),
        );

        assert!(matches!(
            result,
            Err(PostingError::InsufficientBalance { balance, requested })
                if balance == dec!(100) && requested == dec!(150)
        ));
    }

    #[test]
    fn test_redirected_deposit_also_checks_balance() {
        // Deposit of -150 is a withdrawal of 150 and must obey the same guard.
        let result = SignPolicy::apply(
            AccountType::Deposit,
            OperationKind::Deposit,
            dec!(-150),
            dec!(100),
        );

        assert!(matches!(result, Err(PostingError::InsufficientBalance { .. })));
    }

    #[test]
    fn test_petty_cash_and_release_are_money_out() {
        assert!(!OperationKind::PettyCash.is_money_in());
        assert!(!OperationKind::LoanRelease.is_money_in());
        assert!(OperationKind::Payment.is_money_in());
    }

    #[test]
    fn test_account_type_parse_roundtrip() {
        for account_type in AccountType::ALL {
            let parsed: AccountType = account_type.to_string().parse().unwrap();
            assert_eq!(parsed, account_type);
        }
    }

    #[test]
    fn test_unknown_account_type_rejected() {
        let result: Result<AccountType, _> = "savings_plus".parse();
        assert!(matches!(result, Err(PostingError::UnknownAccountType(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// For any positive amount, the balance delta of a money-in posting
        /// is +amount for savings-style accounts and -amount for
        /// liability-style accounts.
        #[test]
        fn prop_deposit_balance_delta(
            cents in 1i64..100_000_000i64,
            type_idx in 0usize..11,
        ) {
            let amount = Decimal::new(cents, 2);
            let account_type = AccountType::ALL[type_idx];
            let effect = SignPolicy::apply(
                account_type,
                OperationKind::Deposit,
                amount,
                Decimal::ZERO,
            ).unwrap();

            if account_type.is_deposit_family() {
                prop_assert_eq!(effect.balance_delta, amount);
            } else {
                prop_assert_eq!(effect.balance_delta, -amount);
            }
        }

        /// `balance_delta == credit - debit` holds for every effect.
        #[test]
        fn prop_delta_is_credit_minus_debit(
            cents in -100_000_000i64..100_000_000i64,
            type_idx in 0usize..11,
            money_in in any::<bool>(),
        ) {
            prop_assume!(cents != 0);
            let amount = Decimal::new(cents, 2);
            let operation = if money_in {
                OperationKind::Deposit
            } else {
                OperationKind::Withdraw
            };

            let effect = SignPolicy::apply(
                AccountType::ALL[type_idx],
                operation,
                amount,
                BIG_BALANCE,
            ).unwrap();

            prop_assert_eq!(effect.balance_delta, effect.credit - effect.debit);
        }

        /// Exactly one of debit/credit is non-zero and equals |amount|.
        #[test]
        fn prop_single_sided_effect(
            cents in 1i64..100_000_000i64,
            type_idx in 0usize..11,
        ) {
            let amount = Decimal::new(cents, 2);
            let effect = SignPolicy::apply(
                AccountType::ALL[type_idx],
                OperationKind::Payment,
                amount,
                Decimal::ZERO,
            ).unwrap();

            prop_assert!(effect.debit.is_zero() != effect.credit.is_zero());
            prop_assert_eq!(effect.debit + effect.credit, amount);
        }
    }
}

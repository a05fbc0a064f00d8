//! Automatic loan deduction computation.
//!
//! A deduction rule describes a fee or charge withheld from a loan
//! disbursement: flat amounts, percentages, per-thousand divisor schedules,
//! and term scaling. The computation is pure and deterministic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A configurable automatic-deduction rule.
///
/// Numeric fields use zero to mean "not set", matching how the rules are
/// stored. `number_of_months` is special-cased: `0` means no explicit term
/// count, `-1` means scale by the loan's terms over a year.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeductionRule {
    /// First percentage rate (e.g., `1.5` for 1.5%).
    pub charges_percentage_1: Decimal,
    /// Second percentage rate, used by add-on rules.
    pub charges_percentage_2: Decimal,
    /// Flat charge amount; also the multiplier for divisor schedules and the
    /// fallback when no other field modifies the base.
    pub charges_amount: Decimal,
    /// Divisor for per-N fee schedules (e.g., `1000` for per-thousand fees).
    pub charges_divisor: Decimal,
    /// Base amounts below this do not incur the deduction.
    pub min_amount: Decimal,
    /// Base amounts above this do not incur the deduction.
    pub max_amount: Decimal,
    /// Explicit term count; `0` = unset, `-1` = scale by terms over 12.
    pub number_of_months: i32,
    /// Add-on rules prefer the second percentage when both are set.
    pub add_on: bool,
    /// Annualized rules divide by 12 when no term count is set.
    pub per_annum: bool,
}

/// The slice of a loan transaction the computation reads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LoanTerms {
    /// The applied (disbursed) base amount.
    pub applied_amount: Decimal,
    /// The loan's term count in months.
    pub terms: i32,
}

/// Stateless deduction computation.
pub struct DeductionComputer;

impl DeductionComputer {
    /// Computes the deduction a rule yields for a loan transaction.
    ///
    /// Steps, in order: min/max hard cutoffs (return zero, not clamped),
    /// percentage selection, divisor schedule, per-annum annualization, term
    /// scaling, and finally the flat-charge fallback when nothing modified
    /// the base amount.
    #[must_use]
    pub fn compute(rule: &DeductionRule, loan: &LoanTerms) -> Decimal {
        let base = loan.applied_amount;

        // Min/max are hard cutoffs: outside the band the rule does not apply.
        if !rule.min_amount.is_zero() && base < rule.min_amount {
            return Decimal::ZERO;
        }
        if !rule.max_amount.is_zero() && base > rule.max_amount {
            return Decimal::ZERO;
        }

        let mut result = base;

        let percentage = Self::select_percentage(rule);
        if !percentage.is_zero() {
            result = result * percentage / Decimal::ONE_HUNDRED;
        }

        if !rule.charges_divisor.is_zero() {
            result = (result / rule.charges_divisor) * rule.charges_amount;
        }

        if rule.number_of_months == 0 && rule.per_annum {
            result /= Decimal::from(12);
        }

        if rule.number_of_months == -1 {
            result = result * Decimal::from(loan.terms) / Decimal::from(12);
        } else if rule.number_of_months > 0 {
            result = result * Decimal::from(loan.terms) / Decimal::from(rule.number_of_months);
        }

        // Nothing matched: fall back to the flat charge. Note a percentage of
        // exactly 100% also lands here, by the original comparison semantics.
        if result == base {
            return rule.charges_amount;
        }

        result
    }

    /// Picks which percentage applies: add-on rules prefer the second when
    /// both are set; otherwise whichever one is set.
    fn select_percentage(rule: &DeductionRule) -> Decimal {
        let p1 = rule.charges_percentage_1;
        let p2 = rule.charges_percentage_2;

        if !p1.is_zero() && !p2.is_zero() {
            if rule.add_on { p2 } else { p1 }
        } else if !p1.is_zero() {
            p1
        } else {
            p2
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn loan(applied: Decimal, terms: i32) -> LoanTerms {
        LoanTerms {
            applied_amount: applied,
            terms,
        }
    }

    #[test]
    fn test_below_min_yields_zero() {
        let rule = DeductionRule {
            min_amount: dec!(5000),
            charges_percentage_1: dec!(2),
            ..DeductionRule::default()
        };

        assert_eq!(
            DeductionComputer::compute(&rule, &loan(dec!(4999), 12)),
            dec!(0)
        );
    }

    #[test]
    fn test_above_max_yields_zero() {
        let rule = DeductionRule {
            max_amount: dec!(100000),
            charges_percentage_1: dec!(2),
            ..DeductionRule::default()
        };

        assert_eq!(
            DeductionComputer::compute(&rule, &loan(dec!(100001), 12)),
            dec!(0)
        );
    }

    #[test]
    fn test_simple_percentage() {
        let rule = DeductionRule {
            charges_percentage_1: dec!(2),
            ..DeductionRule::default()
        };

        // 2% of 10,000
        assert_eq!(
            DeductionComputer::compute(&rule, &loan(dec!(10000), 0)),
            dec!(200)
        );
    }

    #[rstest]
    #[case(false, dec!(100))] // standard rule picks percentage 1
    #[case(true, dec!(300))] // add-on rule picks percentage 2
    fn test_percentage_selection(#[case] add_on: bool, #[case] expected: Decimal) {
        let rule = DeductionRule {
            charges_percentage_1: dec!(1),
            charges_percentage_2: dec!(3),
            add_on,
            ..DeductionRule::default()
        };

        assert_eq!(
            DeductionComputer::compute(&rule, &loan(dec!(10000), 0)),
            expected
        );
    }

    #[test]
    fn test_second_percentage_used_when_only_one_set() {
        let rule = DeductionRule {
            charges_percentage_2: dec!(5),
            ..DeductionRule::default()
        };

        assert_eq!(
            DeductionComputer::compute(&rule, &loan(dec!(1000), 0)),
            dec!(50)
        );
    }

    #[test]
    fn test_divisor_schedule() {
        // 2.50 per thousand of the applied amount.
        let rule = DeductionRule {
            charges_divisor: dec!(1000),
            charges_amount: dec!(2.50),
            ..DeductionRule::default()
        };

        assert_eq!(
            DeductionComputer::compute(&rule, &loan(dec!(50000), 0)),
            dec!(125)
        );
    }

    #[test]
    fn test_per_annum_divides_by_twelve() {
        let rule = DeductionRule {
            charges_percentage_1: dec!(12),
            per_annum: true,
            ..DeductionRule::default()
        };

        // 12% p.a. of 12,000 = 1,440 per year = 120 per month.
        assert_eq!(
            DeductionComputer::compute(&rule, &loan(dec!(12000), 0)),
            dec!(120)
        );
    }

    #[test]
    fn test_terms_over_year_scaling() {
        let rule = DeductionRule {
            charges_percentage_1: dec!(1),
            number_of_months: -1,
            ..DeductionRule::default()
        };

        let one_year = DeductionComputer::compute(&rule, &loan(dec!(10000), 12));
        let two_years = DeductionComputer::compute(&rule, &loan(dec!(10000), 24));

        // Terms of 24 months scale the result by 2x.
        assert_eq!(one_year, dec!(100));
        assert_eq!(two_years, dec!(200));
    }

    #[test]
    fn test_explicit_month_count_scaling() {
        let rule = DeductionRule {
            charges_percentage_1: dec!(1),
            number_of_months: 6,
            ..DeductionRule::default()
        };

        // 1% of 10,000 = 100, scaled by 12/6.
        assert_eq!(
            DeductionComputer::compute(&rule, &loan(dec!(10000), 12)),
            dec!(200)
        );
    }

    #[test]
    fn test_unmodified_result_falls_back_to_flat_charge() {
        // No percentage, divisor, or month fields: the rule yields its flat
        // charge amount.
        let rule = DeductionRule {
            charges_amount: dec!(150),
            ..DeductionRule::default()
        };

        assert_eq!(
            DeductionComputer::compute(&rule, &loan(dec!(10000), 12)),
            dec!(150)
        );
    }

    #[test]
    fn test_hundred_percent_triggers_fallback() {
        // A 100% percentage leaves the base unchanged, which the original
        // comparison treats as "no rule matched".
        let rule = DeductionRule {
            charges_percentage_1: dec!(100),
            charges_amount: dec!(75),
            ..DeductionRule::default()
        };

        assert_eq!(
            DeductionComputer::compute(&rule, &loan(dec!(10000), 0)),
            dec!(75)
        );
    }

    #[test]
    fn test_compute_is_deterministic() {
        let rule = DeductionRule {
            charges_percentage_1: dec!(1.5),
            charges_divisor: dec!(1000),
            charges_amount: dec!(2),
            number_of_months: -1,
            ..DeductionRule::default()
        };
        let terms = loan(dec!(250000), 36);

        let first = DeductionComputer::compute(&rule, &terms);
        let second = DeductionComputer::compute(&rule, &terms);
        assert_eq!(first, second);
    }
}

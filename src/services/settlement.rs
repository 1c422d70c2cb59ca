//! Pure settlement rules shared by the sales and purchase sides.
//!
//! Settlement status is always derived from `(total, paid)` at read time and
//! never stored, so both invoice kinds classify identically.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment classification of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum SettlementStatus {
    Paid,
    Partial,
    Unpaid,
}

/// Classifies an invoice: Paid when paid covers the total (a zero-total
/// invoice counts as Paid), Unpaid when nothing has been paid, Partial
/// otherwise.
pub fn classify(total: Decimal, paid: Decimal) -> SettlementStatus {
    if paid >= total {
        SettlementStatus::Paid
    } else if paid.is_zero() {
        SettlementStatus::Unpaid
    } else {
        SettlementStatus::Partial
    }
}

/// Outstanding balance. Never clamped: an overpayment shows as a negative
/// balance, which the caller must preserve.
pub fn balance(total: Decimal, paid: Decimal) -> Decimal {
    total - paid
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use test_case::test_case;

    #[test_case(dec!(100), dec!(100), SettlementStatus::Paid; "exactly paid")]
    #[test_case(dec!(100), dec!(150), SettlementStatus::Paid; "overpaid")]
    #[test_case(dec!(100), dec!(0), SettlementStatus::Unpaid; "nothing paid")]
    #[test_case(dec!(100), dec!(40), SettlementStatus::Partial; "partially paid")]
    #[test_case(dec!(0), dec!(0), SettlementStatus::Paid; "zero total counts as paid")]
    fn classification(total: Decimal, paid: Decimal, expected: SettlementStatus) {
        assert_eq!(classify(total, paid), expected);
    }

    #[test]
    fn balance_is_never_clamped() {
        assert_eq!(balance(dec!(100), dec!(40)), dec!(60));
        assert_eq!(balance(dec!(100), dec!(150)), dec!(-50));
    }

    #[test]
    fn paid_exactly_when_balance_not_positive() {
        let cases = [
            (dec!(100), dec!(100)),
            (dec!(100), dec!(120)),
            (dec!(100), dec!(99.99)),
            (dec!(0), dec!(0)),
            (dec!(50), dec!(0)),
        ];
        for (total, paid) in cases {
            let is_paid = classify(total, paid) == SettlementStatus::Paid;
            assert_eq!(is_paid, balance(total, paid) <= Decimal::ZERO);
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn money() -> impl Strategy<Value = Decimal> {
            // Cent amounts up to ten million.
            (0i64..=1_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
        }

        proptest! {
            #[test]
            fn classification_agrees_with_balance(total in money(), paid in money()) {
                let status = classify(total, paid);
                let outstanding = balance(total, paid);
                prop_assert_eq!(status == SettlementStatus::Paid, outstanding <= Decimal::ZERO);
                prop_assert_eq!(
                    status == SettlementStatus::Unpaid,
                    paid.is_zero() && outstanding > Decimal::ZERO
                );
            }

            #[test]
            fn balance_and_paid_reconstruct_the_total(total in money(), paid in money()) {
                prop_assert_eq!(balance(total, paid) + paid, total);
            }
        }
    }
}

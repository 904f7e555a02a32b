//! Per-type totals and net balance
//!
//! Both report builders take their numbers from [`Totals`], so the
//! spreadsheet and the PDF always agree on the balance.

use crate::error::{CoreError, CoreResult};
use crate::models::{negate, Movement, MovementKind};
use rust_decimal::Decimal;

/// Totals of a movement list, computed from unsigned amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Totals {
    pub income: Decimal,
    pub expense: Decimal,
    pub saving: Decimal,
    /// income - expense - saving
    pub net_balance: Decimal,
}

impl Totals {
    /// Sum a movement list.
    ///
    /// Movements with a missing or unknown type are not counted. Fails when a
    /// total leaves the range of `Decimal`.
    pub fn from_movements(movements: &[Movement]) -> CoreResult<Self> {
        let mut totals = Totals::default();
        for movement in movements {
            let (total, label) = match movement.kind {
                Some(MovementKind::Income) => (&mut totals.income, "ingreso"),
                Some(MovementKind::Expense) => (&mut totals.expense, "gasto"),
                Some(MovementKind::Saving) => (&mut totals.saving, "ahorro"),
                Some(MovementKind::Other(_)) | None => continue,
            };
            *total = total
                .checked_add(movement.amount)
                .ok_or_else(|| overflow(label))?;
        }
        totals.net_balance = totals
            .income
            .checked_sub(totals.expense)
            .and_then(|net| net.checked_sub(totals.saving))
            .ok_or_else(|| overflow("saldo neto"))?;
        Ok(totals)
    }

    /// Expense total as shown in the footer
    pub fn signed_expense(&self) -> Decimal {
        negate(self.expense)
    }

    /// Saving total as shown in the footer
    pub fn signed_saving(&self) -> Decimal {
        negate(self.saving)
    }

    pub fn is_balance_non_negative(&self) -> bool {
        !self.net_balance.is_sign_negative() || self.net_balance.is_zero()
    }
}

fn overflow(total: &str) -> CoreError {
    CoreError::AmountOverflow {
        total: total.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn test_example_scenario() {
        let movements = vec![
            Movement::new(MovementKind::Income, dec(1000)),
            Movement::new(MovementKind::Expense, dec(300)),
            Movement::new(MovementKind::Saving, dec(200)),
        ];
        let totals = Totals::from_movements(&movements).unwrap();

        assert_eq!(totals.income, dec(1000));
        assert_eq!(totals.expense, dec(300));
        assert_eq!(totals.saving, dec(200));
        assert_eq!(totals.net_balance, dec(500));
        assert_eq!(totals.signed_expense(), dec(-300));
        assert_eq!(totals.signed_saving(), dec(-200));
        assert!(totals.is_balance_non_negative());
    }

    #[test]
    fn test_empty_list() {
        let totals = Totals::from_movements(&[]).unwrap();
        assert_eq!(totals, Totals::default());
        assert_eq!(totals.signed_expense(), Decimal::ZERO);
        assert!(totals.is_balance_non_negative());
    }

    #[test]
    fn test_negative_balance() {
        let movements = vec![
            Movement::new(MovementKind::Income, dec(100)),
            Movement::new(MovementKind::Expense, dec(250)),
        ];
        let totals = Totals::from_movements(&movements).unwrap();
        assert_eq!(totals.net_balance, dec(-150));
        assert!(!totals.is_balance_non_negative());
    }

    #[test]
    fn test_non_numeric_amount_counts_as_zero() {
        let movements: Vec<Movement> = serde_json::from_str(
            r#"[{"type": "ingreso", "amount": "abc"}, {"type": "ingreso", "amount": 50},
                {"type": "gasto", "amount": null}]"#,
        ).unwrap();
        let totals = Totals::from_movements(&movements).unwrap();
        assert_eq!(totals.income, dec(50));
        assert_eq!(totals.expense, Decimal::ZERO);
        assert_eq!(totals.net_balance, dec(50));
    }

    #[test]
    fn test_unknown_and_missing_types_are_not_totaled() {
        let movements = vec![
            Movement::new(MovementKind::Income, dec(500)),
            Movement::new(MovementKind::Other("transferencia".to_string()), dec(900)),
            Movement { amount: dec(70), ..Default::default() },
        ];
        let totals = Totals::from_movements(&movements).unwrap();
        assert_eq!(totals.income, dec(500));
        assert_eq!(totals.expense, Decimal::ZERO);
        assert_eq!(totals.saving, Decimal::ZERO);
        assert_eq!(totals.net_balance, dec(500));
    }

    #[test]
    fn test_decimal_sums_are_exact() {
        let movements = vec![
            Movement::new(MovementKind::Income, Decimal::new(1, 1)),
            Movement::new(MovementKind::Income, Decimal::new(2, 1)),
        ];
        assert_eq!(Totals::from_movements(&movements).unwrap().income, Decimal::new(3, 1));
    }

    #[test]
    fn test_overflowing_total_is_an_error() {
        let huge = "70000000000000000000000000000".parse::<Decimal>().unwrap();
        let movements = vec![
            Movement::new(MovementKind::Income, huge),
            Movement::new(MovementKind::Income, huge),
        ];
        let error = Totals::from_movements(&movements).unwrap_err();
        assert!(matches!(error, CoreError::AmountOverflow { ref total } if total == "ingreso"));
    }

    #[test]
    fn test_overflowing_net_balance_is_an_error() {
        let huge = "70000000000000000000000000000".parse::<Decimal>().unwrap();
        let movements = vec![
            Movement::new(MovementKind::Income, -huge),
            Movement::new(MovementKind::Expense, huge),
        ];
        let error = Totals::from_movements(&movements).unwrap_err();
        assert!(matches!(error, CoreError::AmountOverflow { ref total } if total == "saldo neto"));
    }
}

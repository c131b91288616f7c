//! One-year debt amortization in monthly steps

use serde::{Deserialize, Serialize};

use crate::money::round2;
use crate::plan::Debt;

/// Outcome of amortizing a single debt for twelve months
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DebtYear {
    pub balance: f64,
    pub principal_paid: f64,
    pub interest_paid: f64,
}

/// Outcome of amortizing every debt for one year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AmortizationResult {
    pub per_debt: Vec<DebtYear>,
    pub principal_paid: f64,
    pub interest_paid: f64,
}

impl AmortizationResult {
    /// Updated balances, aligned with the input debt list
    pub fn balances(&self) -> Vec<f64> {
        self.per_debt.iter().map(|d| d.balance).collect()
    }

    pub fn total_balance(&self) -> f64 {
        round2(self.per_debt.iter().map(|d| d.balance).sum())
    }

    /// Cash actually paid toward debts this year
    pub fn total_paid(&self) -> f64 {
        round2(self.principal_paid + self.interest_paid)
    }
}

/// Run twelve monthly payments against one debt starting from `balance`
pub fn amortize_debt(debt: &Debt, balance: f64) -> DebtYear {
    let mut year = DebtYear { balance, ..Default::default() };

    for _month in 1..=12 {
        if year.balance <= 0.0 {
            break;
        }

        let interest = round2(year.balance * debt.apr_pct / 100.0 / 12.0);
        let after_interest = round2(year.balance + interest);
        let payment = round2(debt.monthly_payment.min(after_interest));

        // Payment below interest leaves principal untouched and the balance grows
        year.interest_paid = round2(year.interest_paid + round2(payment.min(interest)));
        year.principal_paid = round2(year.principal_paid + round2((payment - interest).max(0.0)));
        year.balance = round2(after_interest - payment);
    }

    year
}

/// Amortize all debts for one year
///
/// `balances` holds the opening balance of each debt, in the same order as
/// `debts`. Debts already at or below zero are carried through untouched.
pub fn amortize_one_year(debts: &[Debt], balances: &[f64]) -> AmortizationResult {
    let per_debt: Vec<DebtYear> = debts
        .iter()
        .zip(balances)
        .map(|(debt, &balance)| amortize_debt(debt, balance))
        .collect();

    let principal_paid = round2(per_debt.iter().map(|d| d.principal_paid).sum());
    let interest_paid = round2(per_debt.iter().map(|d| d.interest_paid).sum());

    AmortizationResult {
        per_debt,
        principal_paid,
        interest_paid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn debt(balance: f64, apr_pct: f64, monthly_payment: f64) -> Debt {
        Debt {
            name: "test".to_string(),
            balance,
            apr_pct,
            monthly_payment,
        }
    }

    #[test]
    fn test_negative_amortization() {
        let card = debt(5000.0, 30.0, 50.0);
        let result = amortize_one_year(&[card.clone()], &[card.balance]);

        assert!(result.per_debt[0].balance > 5000.0);
        assert_eq!(result.principal_paid, 0.0);
        assert_abs_diff_eq!(result.interest_paid, 600.0, epsilon = 1e-9);
    }

    #[test]
    fn test_principal_reduces_balance() {
        let loan = debt(1000.0, 12.0, 50.0);
        let year = amortize_debt(&loan, 1000.0);

        // Month 1: interest 10.00, principal 40.00
        assert!(year.balance < 960.0);
        assert_abs_diff_eq!(year.principal_paid + year.balance, 1000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(year.principal_paid + year.interest_paid, 600.0, epsilon = 1e-6);
    }

    #[test]
    fn test_payoff_mid_year() {
        let loan = debt(250.0, 0.0, 100.0);
        let year = amortize_debt(&loan, 250.0);

        assert_eq!(year.balance, 0.0);
        assert_abs_diff_eq!(year.principal_paid, 250.0, epsilon = 1e-9);
        assert_eq!(year.interest_paid, 0.0);
    }

    #[test]
    fn test_zero_balance_is_skipped() {
        let loan = debt(0.0, 20.0, 300.0);
        let result = amortize_one_year(&[loan], &[0.0]);

        assert_eq!(result.per_debt[0], DebtYear::default());
        assert_eq!(result.total_paid(), 0.0);
    }

    #[test]
    fn test_running_totals_stay_in_cents() {
        // Summing cent amounts in f64 leaves residue unless re-rounded
        let loan = debt(2_093.0, 7.3, 183.17);
        let year = amortize_debt(&loan, loan.balance);

        assert_eq!(year.principal_paid, round2(year.principal_paid));
        assert_eq!(year.interest_paid, round2(year.interest_paid));
        assert_abs_diff_eq!(year.principal_paid + year.balance, 2_093.0, epsilon = 1e-6);
    }

    #[test]
    fn test_totals_sum_over_debts() {
        let debts = vec![debt(4000.0, 22.0, 200.0), debt(18000.0, 6.0, 450.0)];
        let balances: Vec<f64> = debts.iter().map(|d| d.balance).collect();
        let result = amortize_one_year(&debts, &balances);

        let principal: f64 = result.per_debt.iter().map(|d| d.principal_paid).sum();
        assert_eq!(result.principal_paid, round2(principal));
        assert_eq!(result.balances().len(), 2);
        // Every payment was made in full
        assert_abs_diff_eq!(result.total_paid(), 12.0 * 650.0, epsilon = 1e-6);
    }
}

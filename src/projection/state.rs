//! Running balances threaded from one projection year to the next

use serde::{Deserialize, Serialize};

use crate::money::clamp_near_zero;
use crate::plan::{PlanState, StartingBalances};

use super::inputs::Bucket;

/// Asset bucket balances
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Balances {
    pub cash: f64,
    pub brokerage: f64,
    pub tax_deferred: f64,
    pub roth: f64,
}

impl Balances {
    pub fn total(&self) -> f64 {
        self.cash + self.brokerage + self.tax_deferred + self.roth
    }

    /// One period of growth: cash at the cash yield, invested buckets at the
    /// market return. Rates are in percent units.
    pub fn grow(&mut self, cash_yield_pct: f64, market_return_pct: f64) {
        let market = 1.0 + market_return_pct / 100.0;
        self.cash *= 1.0 + cash_yield_pct / 100.0;
        self.brokerage *= market;
        self.tax_deferred *= market;
        self.roth *= market;
    }

    pub fn credit(&mut self, bucket: Bucket, amount: f64) {
        match bucket {
            Bucket::Cash => self.cash += amount,
            Bucket::Brokerage => self.brokerage += amount,
            Bucket::TaxDeferred => self.tax_deferred += amount,
            Bucket::Roth => self.roth += amount,
        }
    }

    pub fn clamp_near_zero(&mut self, epsilon: f64) {
        self.cash = clamp_near_zero(self.cash, epsilon);
        self.brokerage = clamp_near_zero(self.brokerage, epsilon);
        self.tax_deferred = clamp_near_zero(self.tax_deferred, epsilon);
        self.roth = clamp_near_zero(self.roth, epsilon);
    }
}

impl From<StartingBalances> for Balances {
    fn from(start: StartingBalances) -> Self {
        Self {
            cash: start.cash,
            brokerage: start.brokerage,
            tax_deferred: start.tax_deferred,
            roth: start.roth,
        }
    }
}

/// Household state at the start of a projection year
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionState {
    /// Index of the next period to project
    pub index: usize,

    pub balances: Balances,

    /// Outstanding balance per debt, aligned with the plan's debt list
    pub debt_balances: Vec<f64>,

    pub home_value: f64,
}

impl ProjectionState {
    /// Opening state taken from the plan's starting balances
    pub fn from_plan(plan: &PlanState) -> Self {
        Self {
            index: 0,
            balances: plan.assets.into(),
            debt_balances: plan.debts.iter().map(|d| d.balance).collect(),
            home_value: plan.housing.home_value(),
        }
    }

    pub fn total_debt(&self) -> f64 {
        self.debt_balances.iter().sum()
    }

    pub fn net_worth(&self) -> f64 {
        self.balances.total() + self.home_value - self.total_debt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::fixtures::{couple_owner, single_renter};
    use approx::assert_relative_eq;

    #[test]
    fn test_from_plan() {
        let state = ProjectionState::from_plan(&couple_owner());

        assert_eq!(state.index, 0);
        assert_eq!(state.balances.total(), 280_000.0);
        assert_eq!(state.debt_balances, vec![18_000.0]);
        assert_eq!(state.home_value, 500_000.0);
        assert_eq!(state.net_worth(), 762_000.0);
    }

    #[test]
    fn test_renter_has_no_home_value() {
        let state = ProjectionState::from_plan(&single_renter());
        assert_eq!(state.home_value, 0.0);
        assert_eq!(state.total_debt(), 4_000.0);
    }

    #[test]
    fn test_growth_rates_per_bucket() {
        let mut balances = Balances {
            cash: 1000.0,
            brokerage: 1000.0,
            tax_deferred: 2000.0,
            roth: -0.0,
        };
        balances.grow(2.0, 10.0);

        assert_relative_eq!(balances.cash, 1020.0, max_relative = 1e-12);
        assert_relative_eq!(balances.brokerage, 1100.0, max_relative = 1e-12);
        assert_relative_eq!(balances.tax_deferred, 2200.0, max_relative = 1e-12);
        assert_eq!(balances.roth, 0.0);
    }

    #[test]
    fn test_credit_and_clamp() {
        let mut balances = Balances::default();
        balances.credit(Bucket::Roth, 500.0);
        balances.credit(Bucket::Cash, 0.001);
        balances.credit(Bucket::Brokerage, -0.004);
        balances.clamp_near_zero(0.005);

        assert_eq!(balances.roth, 500.0);
        assert_eq!(balances.cash, 0.0);
        assert_eq!(balances.brokerage, 0.0);
    }
}

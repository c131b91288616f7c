//! Year-by-year output rows and projection summaries

use serde::{Deserialize, Serialize};

/// One projected year for the household
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearRow {
    pub index: usize,
    pub age: u32,

    // Income
    pub user_gross: f64,
    pub partner_gross: f64,
    pub gross_income: f64,

    // Retirement contributions
    pub employee_pre_tax: f64,
    pub employee_roth: f64,
    pub employer_match: f64,
    pub pre_tax_deductions: f64,

    // Taxable income
    /// Before the standard deduction
    pub taxable_income: f64,
    pub standard_deduction: f64,
    pub taxable_after_deduction: f64,

    // Taxes
    pub federal_income_tax: f64,
    pub state_income_tax: f64,
    pub social_security_tax: f64,
    pub medicare_tax: f64,
    pub additional_medicare_tax: f64,
    pub payroll_tax: f64,
    pub taxes_paid: f64,

    pub after_tax_income: f64,
    /// After-tax income less Roth deferrals
    pub take_home: f64,

    // Monthly outflow
    pub lifestyle_monthly: f64,
    pub housing_monthly: f64,
    pub debt_monthly: f64,
    pub total_monthly_outflow: f64,

    // Savings
    pub net_one_time_events: f64,
    pub annual_savings: f64,
    pub buffer_target: f64,

    // End-of-year balances
    pub cash: f64,
    pub brokerage: f64,
    pub tax_deferred: f64,
    pub roth: f64,
    pub end_asset_value: f64,
    pub home_value: f64,
    pub net_worth: f64,

    // Debt
    pub debt_principal_paid: f64,
    pub debt_interest_paid: f64,
    pub debt_balance: f64,
}

impl YearRow {
    pub fn new(index: usize, age: u32) -> Self {
        Self {
            index,
            age,
            ..Default::default()
        }
    }
}

/// Rows produced for one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    pub scenario: String,
    pub rows: Vec<YearRow>,
}

impl ProjectionResult {
    pub fn new(scenario: impl Into<String>, rows: Vec<YearRow>) -> Self {
        Self {
            scenario: scenario.into(),
            rows,
        }
    }

    pub fn final_row(&self) -> Option<&YearRow> {
        self.rows.last()
    }

    /// First age whose ending net worth reaches `threshold`
    pub fn first_age_net_worth_at_least(&self, threshold: f64) -> Option<u32> {
        self.rows
            .iter()
            .find(|row| row.net_worth >= threshold)
            .map(|row| row.age)
    }

    /// First age that ends with every debt paid off
    pub fn debt_free_age(&self) -> Option<u32> {
        self.rows
            .iter()
            .find(|row| row.debt_balance <= 0.0)
            .map(|row| row.age)
    }

    pub fn summary(&self) -> ProjectionSummary {
        let total = |f: fn(&YearRow) -> f64| self.rows.iter().map(f).sum::<f64>();
        let last = self.final_row();

        ProjectionSummary {
            scenario: self.scenario.clone(),
            years: self.rows.len(),
            total_gross_income: total(|r| r.gross_income),
            total_taxes_paid: total(|r| r.taxes_paid),
            total_annual_savings: total(|r| r.annual_savings),
            total_retirement_contributions: total(|r| {
                r.employee_pre_tax + r.employee_roth + r.employer_match
            }),
            total_debt_interest: total(|r| r.debt_interest_paid),
            final_end_asset_value: last.map_or(0.0, |r| r.end_asset_value),
            final_net_worth: last.map_or(0.0, |r| r.net_worth),
            min_cash: self.rows.iter().map(|r| r.cash).reduce(f64::min).unwrap_or(0.0),
            debt_free_age: self.debt_free_age(),
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub scenario: String,
    pub years: usize,
    pub total_gross_income: f64,
    pub total_taxes_paid: f64,
    pub total_annual_savings: f64,
    pub total_retirement_contributions: f64,
    pub total_debt_interest: f64,
    pub final_end_asset_value: f64,
    pub final_net_worth: f64,
    /// Lowest year-end cash balance; negative means an unfunded shortfall
    pub min_cash: f64,
    pub debt_free_age: Option<u32>,
}

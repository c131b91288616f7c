//! Plan data structures describing a household's starting position

use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::tax::FilingStatus;
use crate::timeline::Timeline;

fn finite(field: &str, value: f64) -> Result<(), PlanError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PlanError::NonFinite { field: field.to_string(), value })
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), PlanError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(PlanError::Negative { field: field.to_string(), value });
    }
    Ok(())
}

fn percent(field: &str, value: f64) -> Result<(), PlanError> {
    finite(field, value)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(PlanError::PercentOutOfRange { field: field.to_string(), value });
    }
    Ok(())
}

/// Workplace retirement plan election (all values in percent)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetirementPlan {
    /// Employee deferral as a percent of base pay
    pub employee_pct: f64,
    /// Share of the employee deferral that goes to Roth
    #[serde(default)]
    pub roth_pct_of_employee: f64,
    /// Employer match rate applied to matched deferrals
    #[serde(default)]
    pub employer_match_pct: f64,
    /// Deferral percent of base pay the employer matches up to
    #[serde(default)]
    pub match_up_to_pct: f64,
}

impl RetirementPlan {
    pub fn validate(&self, prefix: &str) -> Result<(), PlanError> {
        percent(&format!("{}.employee_pct", prefix), self.employee_pct)?;
        percent(&format!("{}.roth_pct_of_employee", prefix), self.roth_pct_of_employee)?;
        percent(&format!("{}.employer_match_pct", prefix), self.employer_match_pct)?;
        percent(&format!("{}.match_up_to_pct", prefix), self.match_up_to_pct)
    }
}

/// Employment income of one household member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonIncome {
    pub base_annual: f64,
    #[serde(default)]
    pub bonus_annual: Option<f64>,
    /// Annual pay growth in percent
    #[serde(default)]
    pub growth_pct: f64,
    /// Pre-tax payroll deductions (health premiums, HSA, ...) per year
    #[serde(default)]
    pub pre_tax_deductions_annual: f64,
    #[serde(default)]
    pub retirement: Option<RetirementPlan>,
}

impl PersonIncome {
    pub fn new(base_annual: f64) -> Self {
        Self {
            base_annual,
            bonus_annual: None,
            growth_pct: 0.0,
            pre_tax_deductions_annual: 0.0,
            retirement: None,
        }
    }

    fn validate(&self, prefix: &str) -> Result<(), PlanError> {
        non_negative(&format!("{}.base_annual", prefix), self.base_annual)?;
        if let Some(bonus) = self.bonus_annual {
            non_negative(&format!("{}.bonus_annual", prefix), bonus)?;
        }
        finite(&format!("{}.growth_pct", prefix), self.growth_pct)?;
        non_negative(
            &format!("{}.pre_tax_deductions_annual", prefix),
            self.pre_tax_deductions_annual,
        )?;
        if let Some(plan) = &self.retirement {
            plan.validate(&format!("{}.retirement", prefix))?;
        }
        Ok(())
    }
}

/// Housing arrangement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Housing {
    Rent { monthly_rent: f64 },
    Own { monthly_payment: f64, home_value: f64 },
}

impl Housing {
    pub fn monthly_amount(&self) -> f64 {
        match self {
            Housing::Rent { monthly_rent } => *monthly_rent,
            Housing::Own { monthly_payment, .. } => *monthly_payment,
        }
    }

    /// Market value of an owned home; zero when renting
    pub fn home_value(&self) -> f64 {
        match self {
            Housing::Rent { .. } => 0.0,
            Housing::Own { home_value, .. } => *home_value,
        }
    }
}

/// One line of an itemized budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub label: String,
    pub monthly: f64,
}

/// Non-housing lifestyle spending
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Expenses {
    Flat { monthly: f64 },
    Itemized { items: Vec<ExpenseItem> },
}

impl Expenses {
    pub fn monthly_total(&self) -> f64 {
        match self {
            Expenses::Flat { monthly } => *monthly,
            Expenses::Itemized { items } => items.iter().map(|item| item.monthly).sum(),
        }
    }
}

/// An amortizing debt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Debt {
    pub name: String,
    pub balance: f64,
    pub apr_pct: f64,
    pub monthly_payment: f64,
}

/// Asset bucket balances at the start of the projection
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StartingBalances {
    #[serde(default)]
    pub cash: f64,
    #[serde(default)]
    pub brokerage: f64,
    #[serde(default)]
    pub tax_deferred: f64,
    #[serde(default)]
    pub roth: f64,
}

/// Market, inflation and tax-rate assumptions (all in percent per year)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    pub market_return_pct: f64,
    pub inflation_pct: f64,
    pub cash_yield_pct: f64,
    #[serde(default)]
    pub state_tax_pct: f64,
    #[serde(default)]
    pub home_appreciation_pct: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            market_return_pct: 6.0,
            inflation_pct: 2.5,
            cash_yield_pct: 2.0,
            state_tax_pct: 0.0,
            home_appreciation_pct: 0.0,
        }
    }
}

/// Complete household description for one simulation request
///
/// Never mutated by the engine; edits are expressed as scenarios.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanState {
    pub start_age: u32,
    /// Last projected age (inclusive)
    pub end_age: u32,
    pub filing_status: FilingStatus,
    pub user: PersonIncome,
    #[serde(default)]
    pub partner: Option<PersonIncome>,
    pub housing: Housing,
    pub expenses: Expenses,
    #[serde(default)]
    pub debts: Vec<Debt>,
    #[serde(default)]
    pub assets: StartingBalances,
    #[serde(default)]
    pub assumptions: Assumptions,
}

impl PlanState {
    pub fn timeline(&self) -> Result<Timeline, PlanError> {
        Ok(Timeline::from_age_range(self.start_age, self.end_age)?)
    }

    pub fn has_partner(&self) -> bool {
        self.partner.is_some()
    }

    /// Check every structural invariant of the plan
    pub fn validate(&self) -> Result<(), PlanError> {
        self.timeline()?;

        self.user.validate("user")?;
        if let Some(partner) = &self.partner {
            partner.validate("partner")?;
        }

        match &self.housing {
            Housing::Rent { monthly_rent } => non_negative("housing.monthly_rent", *monthly_rent)?,
            Housing::Own { monthly_payment, home_value } => {
                non_negative("housing.monthly_payment", *monthly_payment)?;
                non_negative("housing.home_value", *home_value)?;
            }
        }

        match &self.expenses {
            Expenses::Flat { monthly } => non_negative("expenses.monthly", *monthly)?,
            Expenses::Itemized { items } => {
                for item in items {
                    non_negative(&format!("expenses.{}", item.label), item.monthly)?;
                }
            }
        }

        for debt in &self.debts {
            non_negative(&format!("debts.{}.balance", debt.name), debt.balance)?;
            non_negative(&format!("debts.{}.apr_pct", debt.name), debt.apr_pct)?;
            non_negative(&format!("debts.{}.monthly_payment", debt.name), debt.monthly_payment)?;
        }

        let assets = &self.assets;
        finite("assets.cash", assets.cash)?;
        non_negative("assets.brokerage", assets.brokerage)?;
        non_negative("assets.tax_deferred", assets.tax_deferred)?;
        non_negative("assets.roth", assets.roth)?;

        let rates = &self.assumptions;
        finite("assumptions.market_return_pct", rates.market_return_pct)?;
        finite("assumptions.inflation_pct", rates.inflation_pct)?;
        finite("assumptions.cash_yield_pct", rates.cash_yield_pct)?;
        percent("assumptions.state_tax_pct", rates.state_tax_pct)?;
        finite("assumptions.home_appreciation_pct", rates.home_appreciation_pct)?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// Single renter, one credit card, modest savings
    pub fn single_renter() -> PlanState {
        PlanState {
            start_age: 30,
            end_age: 39,
            filing_status: FilingStatus::Single,
            user: PersonIncome {
                base_annual: 90_000.0,
                bonus_annual: Some(5_000.0),
                growth_pct: 3.0,
                pre_tax_deductions_annual: 2_400.0,
                retirement: Some(RetirementPlan {
                    employee_pct: 8.0,
                    roth_pct_of_employee: 25.0,
                    employer_match_pct: 50.0,
                    match_up_to_pct: 6.0,
                }),
            },
            partner: None,
            housing: Housing::Rent { monthly_rent: 1_800.0 },
            expenses: Expenses::Flat { monthly: 2_000.0 },
            debts: vec![Debt {
                name: "card".to_string(),
                balance: 4_000.0,
                apr_pct: 22.0,
                monthly_payment: 200.0,
            }],
            assets: StartingBalances {
                cash: 5_000.0,
                brokerage: 10_000.0,
                tax_deferred: 20_000.0,
                roth: 3_000.0,
            },
            assumptions: Assumptions {
                market_return_pct: 6.0,
                inflation_pct: 2.5,
                cash_yield_pct: 2.0,
                state_tax_pct: 4.0,
                home_appreciation_pct: 0.0,
            },
        }
    }

    /// Two earners who own their home
    pub fn couple_owner() -> PlanState {
        PlanState {
            start_age: 40,
            end_age: 49,
            filing_status: FilingStatus::MarriedFilingJointly,
            user: PersonIncome {
                base_annual: 150_000.0,
                bonus_annual: None,
                growth_pct: 2.0,
                pre_tax_deductions_annual: 3_000.0,
                retirement: Some(RetirementPlan {
                    employee_pct: 10.0,
                    roth_pct_of_employee: 0.0,
                    employer_match_pct: 100.0,
                    match_up_to_pct: 4.0,
                }),
            },
            partner: Some(PersonIncome {
                base_annual: 80_000.0,
                bonus_annual: Some(8_000.0),
                growth_pct: 2.0,
                pre_tax_deductions_annual: 1_200.0,
                retirement: None,
            }),
            housing: Housing::Own { monthly_payment: 2_600.0, home_value: 500_000.0 },
            expenses: Expenses::Itemized {
                items: vec![
                    ExpenseItem { label: "groceries".to_string(), monthly: 1_200.0 },
                    ExpenseItem { label: "childcare".to_string(), monthly: 1_500.0 },
                    ExpenseItem { label: "other".to_string(), monthly: 1_300.0 },
                ],
            },
            debts: vec![Debt {
                name: "car".to_string(),
                balance: 18_000.0,
                apr_pct: 6.0,
                monthly_payment: 450.0,
            }],
            assets: StartingBalances {
                cash: 30_000.0,
                brokerage: 60_000.0,
                tax_deferred: 150_000.0,
                roth: 40_000.0,
            },
            assumptions: Assumptions {
                market_return_pct: 5.0,
                inflation_pct: 3.0,
                cash_yield_pct: 1.5,
                state_tax_pct: 5.0,
                home_appreciation_pct: 3.0,
            },
        }
    }
}

//! Core projection engine for year-by-year household projections

use log::{debug, trace};

use crate::error::SimulationError;
use crate::money::{round2, ZERO_EPSILON};
use crate::plan::PlanState;
use crate::scenario::Scenario;
use crate::tax::{
    employee_payroll_taxes, federal_income_tax, standard_deduction, PayrollWages, TaxPolicy,
};
use crate::timeline::Timeline;

use super::debt::amortize_one_year;
use super::inputs::{materialize, materialize_baseline, PerPeriodInput, PersonPeriod};
use super::rows::{ProjectionResult, YearRow};
use super::state::ProjectionState;

/// Configuration for a projection run
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionConfig {
    /// Federal and payroll tax table applied to every year
    pub tax_policy: TaxPolicy,

    /// Emergency buffer held in cash, in months of total outflow
    pub buffer_months: f64,

    /// Balances smaller than this in magnitude are snapped to zero
    pub zero_epsilon: f64,

    /// Optional cap on each person's employee deferral (pre-tax plus Roth)
    ///
    /// `None` applies the plan percentage uncapped.
    pub deferral_limit: Option<f64>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            tax_policy: TaxPolicy::latest(),
            buffer_months: 6.0,
            zero_epsilon: ZERO_EPSILON,
            deferral_limit: None,
        }
    }
}

impl ProjectionConfig {
    /// Default config using a built-in tax table
    pub fn for_tax_year(year: u16) -> Result<Self, SimulationError> {
        let tax_policy = TaxPolicy::for_year(year).ok_or(SimulationError::UnsupportedTaxYear(year))?;
        Ok(Self {
            tax_policy,
            ..Default::default()
        })
    }

    /// Cap employee deferrals at the tax table's 402(g) limit
    pub fn with_policy_deferral_limit(mut self) -> Self {
        self.deferral_limit = Some(self.tax_policy.elective_deferral_limit);
        self
    }
}

/// Retirement contributions and gross pay for one person in one year
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Contributions {
    gross: f64,
    pre_tax: f64,
    roth: f64,
    employer_match: f64,
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Project a plan under a scenario
    pub fn project(
        &self,
        plan: &PlanState,
        scenario: &Scenario,
    ) -> Result<ProjectionResult, SimulationError> {
        let inputs = materialize(plan, scenario)?;
        let rows = self.simulate(plan, Some(inputs.as_slice()))?;
        Ok(ProjectionResult::new(scenario.name.clone(), rows))
    }

    /// Produce one row per timeline period
    ///
    /// Without explicit inputs the baseline (no edits) is materialized.
    /// Every precondition is checked before the first row is produced.
    pub fn simulate(
        &self,
        plan: &PlanState,
        inputs: Option<&[PerPeriodInput]>,
    ) -> Result<Vec<YearRow>, SimulationError> {
        plan.validate()?;
        let timeline = plan.timeline()?;

        let baseline;
        let inputs = match inputs {
            Some(inputs) => inputs,
            None => {
                baseline = materialize_baseline(plan)?;
                baseline.as_slice()
            }
        };
        check_inputs(plan, &timeline, inputs)?;

        debug!(
            "simulating ages {}..={} ({} periods, tax year {})",
            timeline.start_age(),
            timeline.end_age(),
            timeline.len(),
            self.config.tax_policy.year
        );

        let mut rows = Vec::with_capacity(inputs.len());
        let closing = inputs
            .iter()
            .fold(ProjectionState::from_plan(plan), |state, input| {
                let (next, row) = self.step(plan, state, input);
                rows.push(row);
                next
            });
        trace!("closing net worth {:.2}", closing.net_worth());

        Ok(rows)
    }

    /// Advance the household by one year
    ///
    /// Takes the opening state and returns the closing state with the row
    /// describing the year. Inputs must already be checked.
    pub fn step(
        &self,
        plan: &PlanState,
        mut state: ProjectionState,
        input: &PerPeriodInput,
    ) -> (ProjectionState, YearRow) {
        let policy = &self.config.tax_policy;
        let status = plan.filing_status;
        let mut row = YearRow::new(input.index, input.age);

        // (a) debts
        let amortization = amortize_one_year(&plan.debts, &state.debt_balances);
        state.debt_balances = amortization.balances();
        row.debt_principal_paid = amortization.principal_paid;
        row.debt_interest_paid = amortization.interest_paid;
        row.debt_balance = amortization.total_balance();
        row.debt_monthly = amortization.total_paid() / 12.0;

        // (b) income and retirement contributions
        let limit = self.config.deferral_limit;
        let user = contributions(&input.user, limit);
        let partner = input
            .partner
            .as_ref()
            .map(|p| contributions(p, limit))
            .unwrap_or_default();

        row.user_gross = user.gross;
        row.partner_gross = partner.gross;
        row.gross_income = user.gross + partner.gross;
        row.employee_pre_tax = user.pre_tax + partner.pre_tax;
        row.employee_roth = user.roth + partner.roth;
        row.employer_match = user.employer_match + partner.employer_match;

        let user_deductions = input.user.pre_tax_deductions_annual;
        let partner_deductions = input
            .partner
            .as_ref()
            .map_or(0.0, |p| p.pre_tax_deductions_annual);
        row.pre_tax_deductions = user_deductions + partner_deductions;

        // (c) income taxes
        row.taxable_income = (row.gross_income - row.employee_pre_tax - row.pre_tax_deductions).max(0.0);
        row.standard_deduction = standard_deduction(policy, status);
        row.taxable_after_deduction = (row.taxable_income - row.standard_deduction).max(0.0);
        row.federal_income_tax = federal_income_tax(policy, row.taxable_after_deduction, status);
        row.state_income_tax = round2(row.taxable_after_deduction * input.state_tax_pct / 100.0);

        // (d) payroll taxes; FICA wages are not reduced by elective deferrals
        let wages = PayrollWages {
            user: (user.gross - user_deductions).max(0.0),
            partner: (partner.gross - partner_deductions).max(0.0),
        };
        let payroll = employee_payroll_taxes(policy, wages, status);
        row.social_security_tax = payroll.social_security;
        row.medicare_tax = payroll.medicare;
        row.additional_medicare_tax = payroll.additional_medicare;
        row.payroll_tax = payroll.total;
        row.taxes_paid = round2(row.federal_income_tax + row.state_income_tax + row.payroll_tax);

        // (e) savings
        row.after_tax_income =
            row.gross_income - row.employee_pre_tax - row.pre_tax_deductions - row.taxes_paid;
        row.take_home = row.after_tax_income - row.employee_roth;
        row.lifestyle_monthly = input.lifestyle_monthly;
        row.housing_monthly = input.housing_monthly;
        row.total_monthly_outflow = row.lifestyle_monthly + row.housing_monthly + row.debt_monthly;
        row.buffer_target = self.config.buffer_months * row.total_monthly_outflow;
        row.net_one_time_events = input.net_events();

        // Events are allocated to their own bucket in (i), not through the buffer
        let savings = row.take_home - row.total_monthly_outflow * 12.0;
        row.annual_savings = savings + row.net_one_time_events;

        // (f) growth before new money
        let balances = &mut state.balances;
        balances.grow(input.cash_yield_pct, input.market_return_pct);
        state.home_value *= 1.0 + plan.assumptions.home_appreciation_pct / 100.0;

        // (g) retirement contributions
        balances.tax_deferred += row.employee_pre_tax + row.employer_match;
        balances.roth += row.employee_roth;

        // (h) buffer first, then brokerage; shortfalls only draw on cash
        if savings >= 0.0 {
            let room = (row.buffer_target - balances.cash).max(0.0);
            let to_cash = savings.min(room);
            balances.cash += to_cash;
            balances.brokerage += savings - to_cash;
        } else {
            balances.cash += savings;
        }

        // (i) one-time events
        for event in &input.events {
            balances.credit(event.bucket, event.amount);
        }

        // (j)
        balances.clamp_near_zero(self.config.zero_epsilon);

        // (k)
        row.cash = balances.cash;
        row.brokerage = balances.brokerage;
        row.tax_deferred = balances.tax_deferred;
        row.roth = balances.roth;
        row.end_asset_value = balances.total();
        row.home_value = state.home_value;
        row.net_worth = row.end_asset_value + row.home_value - row.debt_balance;

        trace!(
            "age {}: savings {:.2}, cash {:.2}, net worth {:.2}",
            row.age,
            row.annual_savings,
            row.cash,
            row.net_worth
        );

        state.index += 1;
        (state, row)
    }
}

/// Project a plan with the default configuration
pub fn simulate(
    plan: &PlanState,
    inputs: Option<&[PerPeriodInput]>,
) -> Result<Vec<YearRow>, SimulationError> {
    ProjectionEngine::default().simulate(plan, inputs)
}

/// Gross pay, employee deferrals and employer match for one person
///
/// Deferrals and match are computed on base pay only. The employee deferral
/// is split pre-tax/Roth, after the optional limit is applied.
fn contributions(person: &PersonPeriod, deferral_limit: Option<f64>) -> Contributions {
    let gross = person.base_annual + person.bonus_annual;
    let Some(plan) = person.retirement else {
        return Contributions { gross, ..Default::default() };
    };

    let base = person.base_annual;
    let elected = base * plan.employee_pct / 100.0;
    let employee = round2(deferral_limit.map_or(elected, |limit| elected.min(limit)));
    let roth = round2(employee * plan.roth_pct_of_employee / 100.0);
    let matched_pct = plan.employee_pct.min(plan.match_up_to_pct);
    let employer_match = round2(matched_pct / 100.0 * plan.employer_match_pct / 100.0 * base);

    Contributions {
        gross,
        pre_tax: employee - roth,
        roth,
        employer_match,
    }
}

fn check_inputs(
    plan: &PlanState,
    timeline: &Timeline,
    inputs: &[PerPeriodInput],
) -> Result<(), SimulationError> {
    if inputs.len() != timeline.len() {
        return Err(SimulationError::PeriodCountMismatch {
            expected: timeline.len(),
            actual: inputs.len(),
        });
    }

    for (position, (input, expected_age)) in inputs.iter().zip(timeline.ages()).enumerate() {
        if input.index != position || input.age != expected_age {
            return Err(SimulationError::IndexMismatch {
                position,
                index: input.index,
                age: input.age,
                expected_age,
            });
        }

        match (plan.has_partner(), input.partner.is_some()) {
            (false, true) => return Err(SimulationError::UnexpectedPartnerInput { index: position }),
            (true, false) => return Err(SimulationError::MissingPartnerInput { index: position }),
            _ => {}
        }

        check_finite(input)?;
    }

    Ok(())
}

fn check_finite(input: &PerPeriodInput) -> Result<(), SimulationError> {
    let person = |p: &PersonPeriod, base, bonus, deductions| {
        [
            (base, p.base_annual),
            (bonus, p.bonus_annual),
            (deductions, p.pre_tax_deductions_annual),
        ]
    };

    let mut fields = vec![
        ("lifestyle_monthly", input.lifestyle_monthly),
        ("housing_monthly", input.housing_monthly),
        ("market_return_pct", input.market_return_pct),
        ("inflation_pct", input.inflation_pct),
        ("cash_yield_pct", input.cash_yield_pct),
        ("state_tax_pct", input.state_tax_pct),
    ];
    fields.extend(person(
        &input.user,
        "user.base_annual",
        "user.bonus_annual",
        "user.pre_tax_deductions_annual",
    ));
    if let Some(partner) = &input.partner {
        fields.extend(person(
            partner,
            "partner.base_annual",
            "partner.bonus_annual",
            "partner.pre_tax_deductions_annual",
        ));
    }
    fields.extend(input.events.iter().map(|e| ("event amount", e.amount)));

    match fields.into_iter().find(|(_, value)| !value.is_finite()) {
        Some((field, value)) => Err(SimulationError::NonFiniteInput {
            index: input.index,
            field,
            value,
        }),
        None => Ok(()),
    }
}

//! Per-period input records and the materializer that builds them
//!
//! Every tracked quantity is compiled from its own baseline growth and its
//! own override list, then the series are zipped into one dense record per
//! timeline index. Inflation is compiled first because it drives the growth
//! of lifestyle spending and rent.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::overrides::{compile, ComponentSpec, GrowthOverride, GrowthRule};
use crate::plan::{Housing, PersonIncome, PlanState, RetirementPlan};
use crate::scenario::{Scenario, ScenarioEdit};
use crate::timeline::Timeline;

/// Household quantity compiled into its own per-period series
///
/// Ordering follows declaration order, which is also the order of [`Component::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    UserBase,
    UserBonus,
    PartnerBase,
    PartnerBonus,
    Lifestyle,
    Housing,
    MarketReturn,
    Inflation,
    CashYield,
    StateTax,
}

impl Component {
    pub const ALL: [Component; 10] = [
        Component::UserBase,
        Component::UserBonus,
        Component::PartnerBase,
        Component::PartnerBonus,
        Component::Lifestyle,
        Component::Housing,
        Component::MarketReturn,
        Component::Inflation,
        Component::CashYield,
        Component::StateTax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Component::UserBase => "user_base",
            Component::UserBonus => "user_bonus",
            Component::PartnerBase => "partner_base",
            Component::PartnerBonus => "partner_bonus",
            Component::Lifestyle => "lifestyle",
            Component::Housing => "housing",
            Component::MarketReturn => "market_return",
            Component::Inflation => "inflation",
            Component::CashYield => "cash_yield",
            Component::StateTax => "state_tax",
        }
    }

    pub fn is_partner(&self) -> bool {
        matches!(self, Component::PartnerBase | Component::PartnerBonus)
    }
}

/// Whether a component grows with the compiled inflation series
///
/// Lifestyle spending always does; housing only while renting, since an
/// owned-home payment is flat.
pub fn is_inflation_linked(plan: &PlanState, component: Component) -> bool {
    match component {
        Component::Lifestyle => true,
        Component::Housing => matches!(plan.housing, Housing::Rent { .. }),
        _ => false,
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Household member an edit applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Person {
    User,
    Partner,
}

/// Asset bucket receiving a one-time cash event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    #[default]
    Cash,
    Brokerage,
    TaxDeferred,
    Roth,
}

/// Signed one-time cash flow (inheritance, wedding, car purchase, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneTimeEvent {
    #[serde(default)]
    pub label: String,
    pub amount: f64,
    #[serde(default)]
    pub bucket: Bucket,
}

/// Resolved income and plan parameters for one person in one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonPeriod {
    pub base_annual: f64,
    pub bonus_annual: f64,
    pub pre_tax_deductions_annual: f64,
    pub retirement: Option<RetirementPlan>,
}

/// Everything the engine needs for one period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerPeriodInput {
    pub index: usize,
    pub age: u32,
    pub user: PersonPeriod,
    pub partner: Option<PersonPeriod>,
    pub lifestyle_monthly: f64,
    pub housing_monthly: f64,
    pub market_return_pct: f64,
    pub inflation_pct: f64,
    pub cash_yield_pct: f64,
    pub state_tax_pct: f64,
    /// Kept as a list; summed only by the engine
    pub events: Vec<OneTimeEvent>,
}

impl PerPeriodInput {
    pub fn net_events(&self) -> f64 {
        self.events.iter().map(|e| e.amount).sum()
    }
}

fn pay_growth(person: &PersonIncome) -> GrowthRule {
    GrowthRule::Percent(person.growth_pct / 100.0)
}

/// Baseline specification of a component with no edits applied
///
/// Returns `None` for partner components when the plan has no partner.
pub fn baseline_spec(plan: &PlanState, component: Component) -> Option<ComponentSpec> {
    let inflation = GrowthRule::Percent(plan.assumptions.inflation_pct / 100.0);
    let rates = &plan.assumptions;

    let spec = match component {
        Component::UserBase => ComponentSpec::new(plan.user.base_annual, pay_growth(&plan.user)),
        Component::UserBonus => {
            ComponentSpec::new(plan.user.bonus_annual.unwrap_or(0.0), pay_growth(&plan.user))
        }
        Component::PartnerBase => {
            let partner = plan.partner.as_ref()?;
            ComponentSpec::new(partner.base_annual, pay_growth(partner))
        }
        Component::PartnerBonus => {
            let partner = plan.partner.as_ref()?;
            ComponentSpec::new(partner.bonus_annual.unwrap_or(0.0), pay_growth(partner))
        }
        Component::Lifestyle => ComponentSpec::new(plan.expenses.monthly_total(), inflation),
        Component::Housing => match &plan.housing {
            Housing::Rent { monthly_rent } => ComponentSpec::new(*monthly_rent, inflation),
            Housing::Own { monthly_payment, .. } => {
                ComponentSpec::new(*monthly_payment, GrowthRule::flat())
            }
        },
        Component::MarketReturn => ComponentSpec::rate(rates.market_return_pct),
        Component::Inflation => ComponentSpec::rate(rates.inflation_pct),
        Component::CashYield => ComponentSpec::rate(rates.cash_yield_pct),
        Component::StateTax => ComponentSpec::rate(rates.state_tax_pct),
    };

    Some(spec)
}

fn check_age(
    timeline: &Timeline,
    what: &'static str,
    age: u32,
) -> Result<usize, SimulationError> {
    timeline.index_of(age).ok_or(SimulationError::AgeOutOfRange {
        what,
        age,
        start_age: timeline.start_age(),
        end_age: timeline.end_age(),
    })
}

/// Resolve the retirement plan in force at every index
///
/// A change replaces the whole record at its start age and stays in force
/// until the next change; later-listed changes win on the same age.
fn retirement_schedule(
    timeline: &Timeline,
    initial: Option<RetirementPlan>,
    mut changes: Vec<(u32, Option<RetirementPlan>)>,
) -> Vec<Option<RetirementPlan>> {
    changes.sort_by_key(|(from_age, _)| *from_age);

    timeline
        .ages()
        .map(|age| {
            changes
                .iter()
                .rev()
                .find(|(from_age, _)| *from_age <= age)
                .map(|(_, plan)| *plan)
                .unwrap_or(initial)
        })
        .collect()
}

/// Build one input record per period for a plan under a scenario
pub fn materialize(
    plan: &PlanState,
    scenario: &Scenario,
) -> Result<Vec<PerPeriodInput>, SimulationError> {
    plan.validate()?;
    let timeline = plan.timeline()?;

    let mut specs: BTreeMap<Component, ComponentSpec> = Component::ALL
        .iter()
        .filter_map(|&component| baseline_spec(plan, component).map(|spec| (component, spec)))
        .collect();

    let mut retirement_changes: HashMap<Person, Vec<(u32, Option<RetirementPlan>)>> = HashMap::new();
    let mut events: Vec<Vec<OneTimeEvent>> = vec![Vec::new(); timeline.len()];

    for edit in &scenario.edits {
        match edit {
            ScenarioEdit::Override { component, edit } => {
                specs
                    .get_mut(component)
                    .ok_or(SimulationError::MissingPartner { component: *component })?
                    .overrides
                    .push(*edit);
            }
            ScenarioEdit::Growth { component, from_age, value } => {
                specs
                    .get_mut(component)
                    .ok_or(SimulationError::MissingPartner { component: *component })?
                    .growth_overrides
                    .push(GrowthOverride { from_age: *from_age, value: *value });
            }
            ScenarioEdit::RetirementPlanChange { person, from_age, plan: replacement } => {
                if *person == Person::Partner && !plan.has_partner() {
                    return Err(SimulationError::MissingPartner { component: Component::PartnerBase });
                }
                check_age(&timeline, "retirement plan change", *from_age)?;
                if let Some(replacement) = replacement {
                    replacement.validate("retirement_plan_change")?;
                }
                retirement_changes
                    .entry(*person)
                    .or_default()
                    .push((*from_age, *replacement));
            }
            ScenarioEdit::OneTimeEvent { age, label, amount, bucket } => {
                let index = check_age(&timeline, "one-time event", *age)?;
                if !amount.is_finite() {
                    return Err(SimulationError::NonFiniteInput {
                        index,
                        field: "event amount",
                        value: *amount,
                    });
                }
                events[index].push(OneTimeEvent {
                    label: label.clone(),
                    amount: *amount,
                    bucket: *bucket,
                });
            }
        }
    }

    let compile_component = |component: Component, spec: &ComponentSpec| {
        compile(spec, &timeline).map_err(|source| SimulationError::Compile { component, source })
    };

    let mut series: BTreeMap<Component, Vec<f64>> = BTreeMap::new();
    if let Some(spec) = specs.remove(&Component::Inflation) {
        let inflation = compile_component(Component::Inflation, &spec)?;
        let path: Vec<f64> = inflation.iter().map(|pct| pct / 100.0).collect();
        for (component, spec) in specs.iter_mut() {
            if is_inflation_linked(plan, *component) {
                spec.growth_path = Some(path.clone());
            }
        }
        series.insert(Component::Inflation, inflation);
    }

    for (component, spec) in &specs {
        series.insert(*component, compile_component(*component, spec)?);
    }

    debug!(
        "materialized scenario '{}': {} components, {} edits, {} periods",
        scenario.name,
        series.len(),
        scenario.edits.len(),
        timeline.len()
    );

    let user_plans = retirement_schedule(
        &timeline,
        plan.user.retirement,
        retirement_changes.remove(&Person::User).unwrap_or_default(),
    );
    let partner_plans = plan.partner.as_ref().map(|partner| {
        retirement_schedule(
            &timeline,
            partner.retirement,
            retirement_changes.remove(&Person::Partner).unwrap_or_default(),
        )
    });

    let at = |component: Component, index: usize| series[&component][index];

    let inputs = timeline
        .ages()
        .enumerate()
        .zip(events)
        .map(|((index, age), events)| PerPeriodInput {
            index,
            age,
            user: PersonPeriod {
                base_annual: at(Component::UserBase, index),
                bonus_annual: at(Component::UserBonus, index),
                pre_tax_deductions_annual: plan.user.pre_tax_deductions_annual,
                retirement: user_plans[index],
            },
            partner: plan.partner.as_ref().zip(partner_plans.as_ref()).map(|(partner, plans)| {
                PersonPeriod {
                    base_annual: at(Component::PartnerBase, index),
                    bonus_annual: at(Component::PartnerBonus, index),
                    pre_tax_deductions_annual: partner.pre_tax_deductions_annual,
                    retirement: plans[index],
                }
            }),
            lifestyle_monthly: at(Component::Lifestyle, index),
            housing_monthly: at(Component::Housing, index),
            market_return_pct: at(Component::MarketReturn, index),
            inflation_pct: at(Component::Inflation, index),
            cash_yield_pct: at(Component::CashYield, index),
            state_tax_pct: at(Component::StateTax, index),
            events,
        })
        .collect();

    Ok(inputs)
}

/// Baseline inputs: every component compiled with no edits
pub fn materialize_baseline(plan: &PlanState) -> Result<Vec<PerPeriodInput>, SimulationError> {
    materialize(plan, &Scenario::baseline())
}

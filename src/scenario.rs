//! What-if scenarios and a runner for comparing them against the baseline
//!
//! A scenario is a named list of typed edits over an unchanged plan. The
//! runner holds one plan and one engine, then projects any number of
//! scenarios against them.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::overrides::Override;
use crate::plan::{PlanState, RetirementPlan};
use crate::projection::{
    Bucket, Component, Person, ProjectionConfig, ProjectionEngine, ProjectionResult,
    ProjectionSummary,
};

/// Name used for the scenario with no edits
pub const BASELINE: &str = "baseline";

/// One time-scoped edit to the baseline plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioEdit {
    /// Value override on one component series
    Override { component: Component, edit: Override },

    /// Replace the component's growth parameter from an age onward
    Growth {
        component: Component,
        from_age: u32,
        value: f64,
    },

    /// Swap a person's retirement plan election; `None` stops contributions
    RetirementPlanChange {
        person: Person,
        from_age: u32,
        #[serde(default)]
        plan: Option<RetirementPlan>,
    },

    OneTimeEvent {
        age: u32,
        #[serde(default)]
        label: String,
        amount: f64,
        #[serde(default)]
        bucket: Bucket,
    },
}

/// Named set of edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub edits: Vec<ScenarioEdit>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            edits: Vec::new(),
        }
    }

    pub fn baseline() -> Self {
        Self::new(BASELINE)
    }

    pub fn with_edit(mut self, edit: ScenarioEdit) -> Self {
        self.edits.push(edit);
        self
    }

    pub fn is_baseline(&self) -> bool {
        self.edits.is_empty()
    }
}

/// Year-level difference between a scenario and the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearDelta {
    pub age: u32,
    pub net_worth: f64,
    pub end_asset_value: f64,
    pub cash: f64,
    pub taxes_paid: f64,
    pub annual_savings: f64,
}

/// Scenario projection alongside its differences from the baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub scenario: String,
    pub baseline: ProjectionSummary,
    pub summary: ProjectionSummary,
    pub final_net_worth_delta: f64,
    pub total_taxes_delta: f64,
    pub total_savings_delta: f64,
    pub years: Vec<YearDelta>,
}

impl ScenarioComparison {
    pub fn between(baseline: &ProjectionResult, scenario: &ProjectionResult) -> Self {
        let base = baseline.summary();
        let summary = scenario.summary();

        let years = baseline
            .rows
            .iter()
            .zip(&scenario.rows)
            .map(|(b, s)| YearDelta {
                age: s.age,
                net_worth: s.net_worth - b.net_worth,
                end_asset_value: s.end_asset_value - b.end_asset_value,
                cash: s.cash - b.cash,
                taxes_paid: s.taxes_paid - b.taxes_paid,
                annual_savings: s.annual_savings - b.annual_savings,
            })
            .collect();

        Self {
            scenario: scenario.scenario.clone(),
            final_net_worth_delta: summary.final_net_worth - base.final_net_worth,
            total_taxes_delta: summary.total_taxes_paid - base.total_taxes_paid,
            total_savings_delta: summary.total_annual_savings - base.total_annual_savings,
            baseline: base,
            summary,
            years,
        }
    }
}

/// Plan-bound runner for scenario projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(plan, ProjectionConfig::default());
/// let comparisons = runner.compare_all(&scenarios)?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    plan: PlanState,
    engine: ProjectionEngine,
}

impl ScenarioRunner {
    pub fn new(plan: PlanState, config: ProjectionConfig) -> Self {
        Self {
            plan,
            engine: ProjectionEngine::new(config),
        }
    }

    pub fn plan(&self) -> &PlanState {
        &self.plan
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    pub fn baseline(&self) -> Result<ProjectionResult, SimulationError> {
        self.run(&Scenario::baseline())
    }

    pub fn run(&self, scenario: &Scenario) -> Result<ProjectionResult, SimulationError> {
        debug!("running scenario '{}' ({} edits)", scenario.name, scenario.edits.len());
        self.engine.project(&self.plan, scenario)
    }

    /// Project independent scenarios in parallel, preserving input order
    pub fn run_all(&self, scenarios: &[Scenario]) -> Vec<Result<ProjectionResult, SimulationError>> {
        scenarios.par_iter().map(|s| self.run(s)).collect()
    }

    pub fn compare(&self, scenario: &Scenario) -> Result<ScenarioComparison, SimulationError> {
        let baseline = self.baseline()?;
        let result = self.run(scenario)?;
        Ok(ScenarioComparison::between(&baseline, &result))
    }

    /// Compare every scenario against one baseline run
    ///
    /// Fails on the first scenario that cannot be projected.
    pub fn compare_all(
        &self,
        scenarios: &[Scenario],
    ) -> Result<Vec<ScenarioComparison>, SimulationError> {
        let baseline = self.baseline()?;
        self.run_all(scenarios)
            .into_iter()
            .map(|result| result.map(|r| ScenarioComparison::between(&baseline, &r)))
            .collect()
    }
}

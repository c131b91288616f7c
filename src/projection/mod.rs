//! Year-by-year household projection: inputs, debts, balances and rows

mod debt;
mod engine;
mod inputs;
mod rows;
mod state;

pub use debt::{amortize_debt, amortize_one_year, AmortizationResult, DebtYear};
pub use engine::{simulate, ProjectionConfig, ProjectionEngine};
pub use inputs::{
    baseline_spec, is_inflation_linked, materialize, materialize_baseline, Bucket, Component, OneTimeEvent,
    PerPeriodInput, Person, PersonPeriod,
};
pub use rows::{ProjectionResult, ProjectionSummary, YearRow};
pub use state::{Balances, ProjectionState};

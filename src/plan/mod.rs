//! Household plan description and file loading

mod data;
pub mod loader;

pub use data::{
    Assumptions, Debt, ExpenseItem, Expenses, Housing, PersonIncome, PlanState, RetirementPlan,
    StartingBalances,
};
pub use loader::{load_plan, load_plan_from_reader, load_scenario, load_scenario_from_reader};

#[cfg(test)]
pub(crate) use data::fixtures;

//! Household Projection - deterministic what-if engine for household finances
//!
//! This library provides:
//! - Override series compilation (set/add/mult/cap edits over a growth rule)
//! - Per-period input materialization from a plan plus scenario edits
//! - Year-by-year projection of income, taxes, savings, debts and balances
//! - Federal income and payroll tax tables
//! - Multi-scenario comparison against the baseline

pub mod error;
pub mod money;
pub mod timeline;
pub mod overrides;
pub mod tax;
pub mod plan;
pub mod projection;
pub mod scenario;

// Re-export commonly used types
pub use error::{CompileError, LoadError, PlanError, SimulationError, TaxTableError, TimelineError};
pub use overrides::{compile_series, ComponentSpec, GrowthRule, Override};
pub use plan::PlanState;
pub use projection::{simulate, PerPeriodInput, ProjectionConfig, ProjectionEngine, ProjectionResult, YearRow};
pub use scenario::{Scenario, ScenarioEdit, ScenarioRunner};
pub use tax::{FilingStatus, TaxPolicy};
pub use timeline::Timeline;

//! Error types for series compilation, plan validation and simulation
//!
//! Every failure carries enough context (field, override position, index,
//! value) for a caller to build a user-facing message.

use std::path::PathBuf;

use thiserror::Error;

use crate::overrides::OverrideKind;
use crate::projection::Component;

/// Invalid timeline construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimelineError {
    #[error("timeline must contain at least one period (start age {start_age}, {period_count} periods)")]
    Empty { start_age: u32, period_count: usize },

    #[error("end age {end_age} is before start age {start_age}")]
    Inverted { start_age: u32, end_age: u32 },

    #[error("{period_count} periods from start age {start_age} run past the largest representable age")]
    TooLong { start_age: u32, period_count: usize },
}

/// Failure compiling one component's per-period series
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("start value must be finite, got {0}")]
    NonFiniteStartValue(f64),

    #[error("start value must be >= 0 for a non-negative quantity, got {0}")]
    NegativeStartValue(f64),

    #[error("growth parameter must be finite, got {0}")]
    NonFiniteGrowth(f64),

    #[error("growth path has {actual} entries, expected one per period ({expected})")]
    GrowthPathLength { expected: usize, actual: usize },

    #[error("growth path entry at index {index} is not finite: {value}")]
    NonFiniteGrowthPath { index: usize, value: f64 },

    #[error("growth override #{position} (from age {from_age}) has non-finite value {value}")]
    NonFiniteGrowthOverride { position: usize, from_age: u32, value: f64 },

    #[error("growth override #{position} starts at age {from_age}, outside {start_age}..={end_age}")]
    GrowthOverrideOutOfRange {
        position: usize,
        from_age: u32,
        start_age: u32,
        end_age: u32,
    },

    #[error("{kind} override #{position} has non-finite value {value}")]
    NonFiniteOverride { position: usize, kind: OverrideKind, value: f64 },

    #[error("{kind} override #{position} requires a value >= 0, got {value}")]
    NegativeOverrideValue { position: usize, kind: OverrideKind, value: f64 },

    #[error("mult override #{position} requires a factor > 0, got {value}")]
    NonPositiveMultiplier { position: usize, value: f64 },

    #[error("{kind} override #{position} starts at age {from_age}, outside {start_age}..={end_age}")]
    OverrideOutOfRange {
        position: usize,
        kind: OverrideKind,
        from_age: u32,
        start_age: u32,
        end_age: u32,
    },

    #[error("{kind} override #{position} ends at age {to_age}, before its start age {from_age}")]
    InvertedOverrideRange {
        position: usize,
        kind: OverrideKind,
        from_age: u32,
        to_age: u32,
    },

    #[error("{kind} override #{position} drives the value to {value} at index {index} (age {age})")]
    NegativeResult {
        position: usize,
        kind: OverrideKind,
        index: usize,
        age: u32,
        value: f64,
    },
}

/// A plan field that is structurally invalid
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: String, value: f64 },

    #[error("{field} must be >= 0, got {value}")]
    Negative { field: String, value: f64 },

    #[error("{field} must be within 0..=100 percent, got {value}")]
    PercentOutOfRange { field: String, value: f64 },

    #[error(transparent)]
    Timeline(#[from] TimelineError),
}

/// Failure preparing or running a simulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("invalid plan: {0}")]
    InvalidPlan(#[from] PlanError),

    #[error("failed to compile {component}: {source}")]
    Compile {
        component: Component,
        #[source]
        source: CompileError,
    },

    #[error("expected {expected} per-period inputs, got {actual}")]
    PeriodCountMismatch { expected: usize, actual: usize },

    #[error("input at position {position} is tagged index {index} / age {age}, expected index {position} / age {expected_age}")]
    IndexMismatch {
        position: usize,
        index: usize,
        age: u32,
        expected_age: u32,
    },

    #[error("input at index {index} carries partner fields but the plan has no partner")]
    UnexpectedPartnerInput { index: usize },

    #[error("input at index {index} is missing partner fields required by the plan")]
    MissingPartnerInput { index: usize },

    #[error("edit targets {component} but the plan has no partner")]
    MissingPartner { component: Component },

    #[error("{what} at age {age} is outside the plan's ages {start_age}..={end_age}")]
    AgeOutOfRange {
        what: &'static str,
        age: u32,
        start_age: u32,
        end_age: u32,
    },

    #[error("input at index {index} has non-finite {field}: {value}")]
    NonFiniteInput {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("no built-in tax policy for year {0}")]
    UnsupportedTaxYear(u16),
}

/// Failure loading a tax policy table
#[derive(Debug, Error)]
pub enum TaxTableError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed tax table: {0}")]
    Csv(#[from] csv::Error),

    #[error("unknown filing status {0:?}")]
    UnknownFilingStatus(String),

    #[error("no {table} entries for filing status {status}")]
    MissingEntries { table: &'static str, status: String },

    #[error("unknown payroll parameter {0:?}")]
    UnknownParameter(String),

    #[error("payroll parameter {0} is missing")]
    MissingParameter(&'static str),

    #[error("brackets for {status} are not ascending or the top bracket is bounded")]
    InvalidBrackets { status: String },
}

/// Failure reading a plan or scenario file
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid plan: {0}")]
    Plan(#[from] PlanError),
}

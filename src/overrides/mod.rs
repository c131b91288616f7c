//! Override series compilation
//!
//! Turns a baseline growth rule plus a sparse set of dated edits for one
//! numeric quantity into a dense per-period series.

mod types;
mod compiler;

pub use types::{ComponentSpec, GrowthOverride, GrowthRule, Override, OverrideKind, ValueDomain};
pub use compiler::{application_order, compile, compile_series, effective_growth};

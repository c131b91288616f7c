//! Federal income tax and employee payroll tax utilities
//!
//! All functions are stateless and parameterised by a versioned
//! [`TaxPolicy`] table.

mod policy;
mod calc;
pub mod loader;

pub use policy::{Bracket, ByFilingStatus, FilingStatus, TaxPolicy, SUPPORTED_TAX_YEARS};
pub use calc::{
    employee_payroll_taxes, federal_income_tax, standard_deduction, PayrollTaxes, PayrollWages,
};

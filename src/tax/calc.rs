//! Bracketed income tax and capped payroll tax calculations

use serde::{Deserialize, Serialize};

use crate::money::round2;

use super::policy::{FilingStatus, TaxPolicy};

/// Wages subject to payroll tax, per household member
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollWages {
    pub user: f64,
    pub partner: f64,
}

impl PayrollWages {
    pub fn combined(&self) -> f64 {
        self.user.max(0.0) + self.partner.max(0.0)
    }
}

/// Employee share of payroll taxes, each component rounded to cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollTaxes {
    pub social_security: f64,
    pub medicare: f64,
    pub additional_medicare: f64,
    /// Sum of the three rounded components, in cents
    pub total: f64,
}

/// Standard deduction for a filing status
pub fn standard_deduction(policy: &TaxPolicy, filing_status: FilingStatus) -> f64 {
    *policy.standard_deduction.get(filing_status)
}

/// Federal income tax on income after the standard deduction
///
/// Walks the brackets in order, taxing the slice of income inside each one
/// until the income is exhausted. Negative input is treated as zero.
pub fn federal_income_tax(
    policy: &TaxPolicy,
    taxable_after_deduction: f64,
    filing_status: FilingStatus,
) -> f64 {
    let taxable = taxable_after_deduction.max(0.0);
    let mut tax = 0.0;
    let mut lower = 0.0;

    for bracket in policy.brackets.get(filing_status) {
        if taxable <= lower {
            break;
        }
        let upper = bracket.up_to.unwrap_or(f64::INFINITY);
        tax += (taxable.min(upper) - lower) * bracket.rate;
        lower = upper;
    }

    round2(tax)
}

/// Employee Social Security, Medicare and Additional Medicare tax
///
/// The Social Security wage base caps each person's wages independently;
/// Medicare applies to combined wages without a cap.
pub fn employee_payroll_taxes(
    policy: &TaxPolicy,
    wages: PayrollWages,
    filing_status: FilingStatus,
) -> PayrollTaxes {
    let wage_base = policy.social_security_wage_base;
    let capped = wages.user.max(0.0).min(wage_base) + wages.partner.max(0.0).min(wage_base);
    let combined = wages.combined();
    let threshold = *policy.additional_medicare_threshold.get(filing_status);

    let social_security = round2(capped * policy.social_security_rate);
    let medicare = round2(combined * policy.medicare_rate);
    let additional_medicare = round2((combined - threshold).max(0.0) * policy.additional_medicare_rate);

    PayrollTaxes {
        social_security,
        medicare,
        additional_medicare,
        total: round2(social_security + medicare + additional_medicare),
    }
}

//! CSV-based tax policy loader
//!
//! Loads a tax year's tables from a directory holding
//! `standard_deductions.csv`, `federal_brackets.csv` and `payroll.csv`.

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::TaxTableError;

use super::policy::{Bracket, ByFilingStatus, FilingStatus, TaxPolicy};

/// Default location of tax tables, one sub-directory per year
pub const DEFAULT_TAX_TABLE_PATH: &str = "data/tax";

#[derive(Debug, Deserialize)]
struct DeductionRow {
    filing_status: String,
    amount: f64,
}

#[derive(Debug, Deserialize)]
struct BracketRow {
    filing_status: String,
    /// Empty for the top bracket
    up_to: Option<f64>,
    rate: f64,
}

#[derive(Debug, Deserialize)]
struct ParameterRow {
    parameter: String,
    value: f64,
}

fn parse_status(raw: &str) -> Result<FilingStatus, TaxTableError> {
    raw.parse().map_err(TaxTableError::UnknownFilingStatus)
}

fn open(path: &Path) -> Result<File, TaxTableError> {
    File::open(path).map_err(|source| TaxTableError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Collect one value per filing status, failing if any status is missing
fn per_status<T>(
    mut values: HashMap<FilingStatus, T>,
    table: &'static str,
) -> Result<ByFilingStatus<T>, TaxTableError> {
    let mut take = |status: FilingStatus| {
        values.remove(&status).ok_or_else(|| TaxTableError::MissingEntries {
            table,
            status: status.to_string(),
        })
    };
    Ok(ByFilingStatus {
        single: take(FilingStatus::Single)?,
        married_filing_jointly: take(FilingStatus::MarriedFilingJointly)?,
        head_of_household: take(FilingStatus::HeadOfHousehold)?,
    })
}

/// Load standard deductions from any reader
pub fn load_standard_deductions_from_reader<R: Read>(
    reader: R,
) -> Result<ByFilingStatus<f64>, TaxTableError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut amounts = HashMap::new();

    for result in csv_reader.deserialize() {
        let row: DeductionRow = result?;
        amounts.insert(parse_status(&row.filing_status)?, row.amount);
    }

    per_status(amounts, "standard_deductions")
}

/// Load bracket schedules from any reader
///
/// Rows for a filing status must appear in ascending order with the
/// unbounded top bracket last.
pub fn load_brackets_from_reader<R: Read>(
    reader: R,
) -> Result<ByFilingStatus<Vec<Bracket>>, TaxTableError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut schedules: HashMap<FilingStatus, Vec<Bracket>> = HashMap::new();

    for result in csv_reader.deserialize() {
        let row: BracketRow = result?;
        schedules
            .entry(parse_status(&row.filing_status)?)
            .or_default()
            .push(Bracket { up_to: row.up_to, rate: row.rate });
    }

    for (status, brackets) in &schedules {
        let top_is_open = brackets.last().map(|b| b.up_to.is_none()).unwrap_or(false);
        let bounded: Vec<Option<f64>> = brackets.iter().map(|b| b.up_to).collect();
        let ascending = bounded[..bounded.len() - 1]
            .windows(2)
            .all(|w| matches!((w[0], w[1]), (Some(a), Some(b)) if a < b));
        let only_top_open = bounded[..bounded.len() - 1].iter().all(Option::is_some);

        if !top_is_open || !ascending || !only_top_open {
            return Err(TaxTableError::InvalidBrackets { status: status.to_string() });
        }
    }

    per_status(schedules, "federal_brackets")
}

/// Partial payroll parameter set read from `payroll.csv`
#[derive(Debug, Default)]
struct PayrollParameters {
    year: Option<f64>,
    social_security_rate: Option<f64>,
    social_security_wage_base: Option<f64>,
    medicare_rate: Option<f64>,
    additional_medicare_rate: Option<f64>,
    thresholds: HashMap<FilingStatus, f64>,
    elective_deferral_limit: Option<f64>,
}

fn load_payroll_from_reader<R: Read>(reader: R) -> Result<PayrollParameters, TaxTableError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut params = PayrollParameters::default();

    for result in csv_reader.deserialize() {
        let row: ParameterRow = result?;
        let slot = match row.parameter.as_str() {
            "year" => &mut params.year,
            "social_security_rate" => &mut params.social_security_rate,
            "social_security_wage_base" => &mut params.social_security_wage_base,
            "medicare_rate" => &mut params.medicare_rate,
            "additional_medicare_rate" => &mut params.additional_medicare_rate,
            "elective_deferral_limit" => &mut params.elective_deferral_limit,
            other => match other.strip_prefix("additional_medicare_threshold_") {
                Some(status) => {
                    params.thresholds.insert(parse_status(status)?, row.value);
                    continue;
                }
                None => return Err(TaxTableError::UnknownParameter(other.to_string())),
            },
        };
        *slot = Some(row.value);
    }

    Ok(params)
}

fn required(value: Option<f64>, name: &'static str) -> Result<f64, TaxTableError> {
    value.ok_or(TaxTableError::MissingParameter(name))
}

/// Assemble a policy from the three table readers
pub fn load_policy_from_readers<D: Read, B: Read, P: Read>(
    deductions: D,
    brackets: B,
    payroll: P,
) -> Result<TaxPolicy, TaxTableError> {
    let standard_deduction = load_standard_deductions_from_reader(deductions)?;
    let brackets = load_brackets_from_reader(brackets)?;
    let payroll = load_payroll_from_reader(payroll)?;

    Ok(TaxPolicy {
        year: required(payroll.year, "year")? as u16,
        standard_deduction,
        brackets,
        social_security_rate: required(payroll.social_security_rate, "social_security_rate")?,
        social_security_wage_base: required(
            payroll.social_security_wage_base,
            "social_security_wage_base",
        )?,
        medicare_rate: required(payroll.medicare_rate, "medicare_rate")?,
        additional_medicare_rate: required(
            payroll.additional_medicare_rate,
            "additional_medicare_rate",
        )?,
        additional_medicare_threshold: per_status(payroll.thresholds, "payroll")?,
        elective_deferral_limit: required(
            payroll.elective_deferral_limit,
            "elective_deferral_limit",
        )?,
    })
}

/// Load a tax policy from CSV files in a specific directory
pub fn load_policy(path: &Path) -> Result<TaxPolicy, TaxTableError> {
    load_policy_from_readers(
        open(&path.join("standard_deductions.csv"))?,
        open(&path.join("federal_brackets.csv"))?,
        open(&path.join("payroll.csv"))?,
    )
}

impl TaxPolicy {
    /// Load the policy for `year` from the default table location
    pub fn from_csv(year: u16) -> Result<Self, TaxTableError> {
        Self::from_csv_path(&Path::new(DEFAULT_TAX_TABLE_PATH).join(year.to_string()))
    }

    /// Load a policy from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, TaxTableError> {
        load_policy(path)
    }
}

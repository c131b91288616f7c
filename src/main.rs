//! Household Projection CLI
//!
//! Projects one plan (optionally under a what-if scenario) and writes the
//! year-by-year rows to CSV or JSON.
//!
//! Usage:
//!   household-projection --plan demos/plan.json --scenario demos/sabbatical.json

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use household_projection::plan::{load_plan, load_scenario};
use household_projection::projection::{ProjectionConfig, ProjectionEngine, ProjectionResult};
use household_projection::scenario::Scenario;
use household_projection::tax::TaxPolicy;

/// Environment variable selecting the built-in tax year when no flag is given
const TAX_YEAR_ENV: &str = "HOUSEHOLD_TAX_YEAR";

#[derive(Parser, Debug)]
#[command(name = "household-projection")]
#[command(about = "Year-by-year household financial projection")]
struct Args {
    /// Plan file (JSON)
    #[arg(long)]
    plan: PathBuf,

    /// Scenario file (JSON); the baseline is projected when omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Built-in tax year (falls back to $HOUSEHOLD_TAX_YEAR, then the latest table)
    #[arg(long)]
    tax_year: Option<u16>,

    /// Directory with standard_deductions.csv, federal_brackets.csv and payroll.csv
    #[arg(long, conflicts_with = "tax_year")]
    tax_dir: Option<PathBuf>,

    /// Months of outflow to hold as a cash buffer
    #[arg(long, default_value = "6")]
    buffer_months: f64,

    /// Cap employee retirement deferrals at the tax year's 402(g) limit
    #[arg(long)]
    cap_deferrals: bool,

    /// Output file for every row
    #[arg(long, default_value = "projection_output.csv")]
    output: PathBuf,

    /// Write JSON instead of CSV
    #[arg(long)]
    json: bool,
}

fn tax_policy(args: &Args) -> Result<TaxPolicy> {
    if let Some(dir) = &args.tax_dir {
        return TaxPolicy::from_csv_path(dir)
            .with_context(|| format!("loading tax tables from {}", dir.display()));
    }

    let year = match args.tax_year {
        Some(year) => Some(year),
        None => match std::env::var(TAX_YEAR_ENV) {
            Ok(value) => Some(
                value
                    .parse::<u16>()
                    .with_context(|| format!("{} is not a year: {:?}", TAX_YEAR_ENV, value))?,
            ),
            Err(_) => None,
        },
    };

    match year {
        Some(year) => Ok(ProjectionConfig::for_tax_year(year)?.tax_policy),
        None => Ok(TaxPolicy::latest()),
    }
}

fn write_csv(result: &ProjectionResult, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in &result.rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_json(result: &ProjectionResult, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, result)?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let plan = load_plan(&args.plan)
        .with_context(|| format!("loading plan {}", args.plan.display()))?;
    let scenario = match &args.scenario {
        Some(path) => {
            load_scenario(path).with_context(|| format!("loading scenario {}", path.display()))?
        }
        None => Scenario::baseline(),
    };

    let mut config = ProjectionConfig {
        tax_policy: tax_policy(&args)?,
        buffer_months: args.buffer_months,
        ..Default::default()
    };
    if args.cap_deferrals {
        config = config.with_policy_deferral_limit();
    }
    info!(
        "projecting '{}' with {} edits, tax year {}",
        scenario.name,
        scenario.edits.len(),
        config.tax_policy.year
    );

    let engine = ProjectionEngine::new(config);
    let result = engine
        .project(&plan, &scenario)
        .with_context(|| format!("projecting scenario '{}'", scenario.name))?;

    println!("Household Projection v{}", env!("CARGO_PKG_VERSION"));
    if scenario.is_baseline() {
        println!("Scenario: {} (no edits)\n", result.scenario);
    } else {
        println!("Scenario: {} ({} edits)\n", result.scenario, scenario.edits.len());
    }
    println!(
        "{:>4} {:>12} {:>12} {:>12} {:>12} {:>12} {:>12} {:>14}",
        "Age", "Gross", "Taxes", "Savings", "Cash", "Brokerage", "Debt", "Net Worth"
    );
    println!("{}", "-".repeat(98));
    for row in &result.rows {
        println!(
            "{:>4} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
            row.age,
            row.gross_income,
            row.taxes_paid,
            row.annual_savings,
            row.cash,
            row.brokerage,
            row.debt_balance,
            row.net_worth,
        );
    }

    if args.json {
        write_json(&result, &args.output)?;
    } else {
        write_csv(&result, &args.output)?;
    }
    println!("\nFull results written to: {}", args.output.display());

    let summary = result.summary();
    println!("\nSummary:");
    println!("  Years: {}", summary.years);
    println!("  Total Gross Income: ${:.2}", summary.total_gross_income);
    println!("  Total Taxes Paid: ${:.2}", summary.total_taxes_paid);
    println!("  Total Retirement Contributions: ${:.2}", summary.total_retirement_contributions);
    println!("  Total Debt Interest: ${:.2}", summary.total_debt_interest);
    println!("  Final Net Worth: ${:.2}", summary.final_net_worth);
    if summary.min_cash < 0.0 {
        println!("  Lowest Cash: ${:.2} (unfunded shortfall)", summary.min_cash);
    }
    match summary.debt_free_age {
        Some(age) => println!("  Debt Free At: {}", age),
        None => println!("  Debt Free At: not within the plan"),
    }

    Ok(())
}

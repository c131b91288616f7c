//! Compare what-if scenarios against the baseline for one plan
//!
//! Scenarios are projected in parallel; each is reported as a difference
//! from the unedited baseline.
//!
//! Usage:
//!   cargo run --bin compare_scenarios -- --plan demos/plan.json demos/sabbatical.json

use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use log::info;
use rayon::prelude::*;
use serde::Serialize;

use household_projection::plan::{load_plan, load_scenario};
use household_projection::projection::ProjectionConfig;
use household_projection::scenario::{Scenario, ScenarioComparison, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "compare_scenarios")]
#[command(about = "Compare what-if scenarios against the baseline projection")]
struct Args {
    /// Plan file (JSON)
    #[arg(long)]
    plan: PathBuf,

    /// Scenario files (JSON)
    #[arg(required = true)]
    scenarios: Vec<PathBuf>,

    /// Built-in tax year
    #[arg(long)]
    tax_year: Option<u16>,

    /// Optional JSON report with every per-age delta
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct ComparisonReport {
    generated_at: DateTime<Utc>,
    plan: String,
    tax_year: u16,
    comparisons: Vec<ScenarioComparison>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    let plan = load_plan(&args.plan)
        .with_context(|| format!("loading plan {}", args.plan.display()))?;
    let scenarios = args
        .scenarios
        .par_iter()
        .map(|path| {
            load_scenario(path).with_context(|| format!("loading scenario {}", path.display()))
        })
        .collect::<Result<Vec<Scenario>>>()?;

    let config = match args.tax_year {
        Some(year) => ProjectionConfig::for_tax_year(year)?,
        None => ProjectionConfig::default(),
    };
    let tax_year = config.tax_policy.year;

    info!("Comparing {} scenarios against the baseline", scenarios.len());
    let runner = ScenarioRunner::new(plan, config);
    let comparisons = runner
        .compare_all(&scenarios)
        .context("projecting scenarios")?;
    let elapsed = start.elapsed();

    println!("Scenario Comparison ({} scenarios, tax year {})", comparisons.len(), tax_year);
    println!(
        "{:<24} {:>16} {:>16} {:>14} {:>14} {:>10}",
        "Scenario", "Final NW", "NW Delta", "Tax Delta", "Savings Delta", "Debt Free"
    );
    println!("{}", "-".repeat(100));
    for comparison in &comparisons {
        let debt_free = comparison
            .summary
            .debt_free_age
            .map_or_else(|| "-".to_string(), |age| age.to_string());
        println!(
            "{:<24} {:>16.2} {:>16.2} {:>14.2} {:>14.2} {:>10}",
            comparison.scenario,
            comparison.summary.final_net_worth,
            comparison.final_net_worth_delta,
            comparison.total_taxes_delta,
            comparison.total_savings_delta,
            debt_free,
        );
    }
    println!("\nCompleted in {:.2?}", elapsed);

    if let Some(path) = &args.output {
        let report = ComparisonReport {
            generated_at: Utc::now(),
            plan: args.plan.display().to_string(),
            tax_year,
            comparisons,
        };
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &report)?;
        println!("Report written to: {}", path.display());
    }

    Ok(())
}

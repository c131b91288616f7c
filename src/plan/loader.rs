//! Load plans and scenarios from JSON

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::LoadError;
use crate::scenario::Scenario;

use super::PlanState;

fn open<P: AsRef<Path>>(path: P) -> Result<BufReader<File>, LoadError> {
    let path = path.as_ref();
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

/// Load and validate a plan from a JSON file
pub fn load_plan<P: AsRef<Path>>(path: P) -> Result<PlanState, LoadError> {
    load_plan_from_reader(open(path)?)
}

/// Load and validate a plan from any reader
pub fn load_plan_from_reader<R: Read>(reader: R) -> Result<PlanState, LoadError> {
    let plan: PlanState = serde_json::from_reader(reader)?;
    plan.validate()?;
    Ok(plan)
}

/// Load a scenario from a JSON file
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario, LoadError> {
    load_scenario_from_reader(open(path)?)
}

/// Load a scenario from any reader
///
/// Edits are only checked structurally here; ages and values are validated
/// when the scenario is materialized against a plan.
pub fn load_scenario_from_reader<R: Read>(reader: R) -> Result<Scenario, LoadError> {
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{Expenses, Housing};
    use crate::scenario::ScenarioEdit;
    use crate::tax::FilingStatus;

    const DEMO_PLAN: &str = include_str!("../../demos/plan.json");
    const DEMO_SCENARIO: &str = include_str!("../../demos/sabbatical.json");

    #[test]
    fn test_load_demo_plan() {
        let plan = load_plan_from_reader(DEMO_PLAN.as_bytes()).expect("Failed to load demo plan");
        assert_eq!(plan.start_age, 32);
        assert_eq!(plan.filing_status, FilingStatus::MarriedFilingJointly);
        assert!(plan.has_partner());
        assert!(matches!(plan.housing, Housing::Rent { .. }));
        assert!(matches!(plan.expenses, Expenses::Itemized { .. }));
        assert_eq!(plan.debts.len(), 2);
    }

    #[test]
    fn test_load_demo_scenario() {
        let scenario = load_scenario_from_reader(DEMO_SCENARIO.as_bytes()).expect("Failed to load scenario");
        assert_eq!(scenario.name, "sabbatical");
        assert!(scenario
            .edits
            .iter()
            .any(|edit| matches!(edit, ScenarioEdit::OneTimeEvent { .. })));
    }

    #[test]
    fn test_invalid_plan_is_rejected_after_parse() {
        let broken = DEMO_PLAN.replacen("\"start_age\": 32", "\"start_age\": 99", 1);
        let err = load_plan_from_reader(broken.as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Plan(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = load_plan_from_reader("{ not json".as_bytes()).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = load_plan("does/not/exist.json").unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }
}

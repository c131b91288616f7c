//! Single forward-pass override compiler
//!
//! Each period advances the previous value by that period's effective growth,
//! then applies every override firing at that age in a fixed application
//! order. Point edits (set/add/mult) fire once and are carried forward by
//! growth ("anchor and regrow"); caps clamp at every age in their range.

use std::cmp::Ordering;

use log::{debug, trace};

use crate::error::CompileError;
use crate::timeline::Timeline;

use super::types::{ComponentSpec, Override, ValueDomain};

/// Compile one component into a dense series with one value per period
pub fn compile(spec: &ComponentSpec, timeline: &Timeline) -> Result<Vec<f64>, CompileError> {
    validate(spec, timeline)?;

    let growth = effective_growth(spec, timeline);
    let order = application_order(&spec.overrides);
    let end_age = timeline.end_age();

    debug!(
        "compiling series: {} periods, {} overrides, {} growth overrides",
        timeline.len(),
        spec.overrides.len(),
        spec.growth_overrides.len()
    );

    let mut series = Vec::with_capacity(timeline.len());
    let mut value = spec.start_value;

    for (index, age) in timeline.ages().enumerate() {
        if index > 0 {
            value = spec.growth.advance(value, growth[index]);
        }

        for &position in &order {
            let edit = &spec.overrides[position];
            if edit.fires_at(age, end_age) {
                let before = value;
                value = apply(edit, position, value, index, age, spec.domain)?;
                trace!("age {}: {} override #{} {} -> {}", age, edit.kind(), position, before, value);
            }
        }

        series.push(value);
    }

    Ok(series)
}

/// Alias of [`compile`] under the name upstream callers use
pub fn compile_series(spec: &ComponentSpec, timeline: &Timeline) -> Result<Vec<f64>, CompileError> {
    compile(spec, timeline)
}

/// Growth parameter in effect at every index
///
/// The latest growth override at or before an age wins; otherwise the
/// component's growth path (or the rule's own parameter) applies. Index 0 carries
/// a parameter too, although the compiler never grows into the first period.
pub fn effective_growth(spec: &ComponentSpec, timeline: &Timeline) -> Vec<f64> {
    let mut sorted: Vec<_> = spec.growth_overrides.iter().collect();
    // Stable: equal from_age keeps insertion order, so the later entry wins
    sorted.sort_by_key(|g| g.from_age);

    let baseline = |index: usize| {
        spec.growth_path
            .as_ref()
            .and_then(|path| path.get(index).copied())
            .unwrap_or_else(|| spec.growth.parameter())
    };

    timeline
        .ages()
        .enumerate()
        .map(|(index, age)| {
            sorted
                .iter()
                .rev()
                .find(|g| g.from_age <= age)
                .map(|g| g.value)
                .unwrap_or_else(|| baseline(index))
        })
        .collect()
}

/// Positions of `overrides` in application order
///
/// from_age ascending, then to_age ascending with open-ended last, then
/// insertion order.
pub fn application_order(overrides: &[Override]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..overrides.len()).collect();
    order.sort_by(|&a, &b| {
        let (left, right) = (&overrides[a], &overrides[b]);
        left.from_age()
            .cmp(&right.from_age())
            .then_with(|| compare_to_age(left.to_age(), right.to_age()))
    });
    order
}

fn compare_to_age(left: Option<u32>, right: Option<u32>) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => l.cmp(&r),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn apply(
    edit: &Override,
    position: usize,
    value: f64,
    index: usize,
    age: u32,
    domain: ValueDomain,
) -> Result<f64, CompileError> {
    let result = match *edit {
        Override::Set { value: target, .. } => target,
        Override::Add { value: delta, .. } => value + delta,
        Override::Mult { value: factor, .. } => value * factor,
        Override::Cap { value: ceiling, .. } => value.min(ceiling),
    };

    let checked = matches!(edit, Override::Add { .. } | Override::Mult { .. });
    if checked && domain == ValueDomain::NonNegative && result < 0.0 {
        return Err(CompileError::NegativeResult {
            position,
            kind: edit.kind(),
            index,
            age,
            value: result,
        });
    }

    Ok(result)
}

fn validate(spec: &ComponentSpec, timeline: &Timeline) -> Result<(), CompileError> {
    if !spec.start_value.is_finite() {
        return Err(CompileError::NonFiniteStartValue(spec.start_value));
    }
    if spec.domain == ValueDomain::NonNegative && spec.start_value < 0.0 {
        return Err(CompileError::NegativeStartValue(spec.start_value));
    }

    let parameter = spec.growth.parameter();
    if !parameter.is_finite() {
        return Err(CompileError::NonFiniteGrowth(parameter));
    }

    if let Some(path) = &spec.growth_path {
        if path.len() != timeline.len() {
            return Err(CompileError::GrowthPathLength {
                expected: timeline.len(),
                actual: path.len(),
            });
        }
        if let Some((index, &value)) = path.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(CompileError::NonFiniteGrowthPath { index, value });
        }
    }

    let (start_age, end_age) = (timeline.start_age(), timeline.end_age());

    for (position, growth) in spec.growth_overrides.iter().enumerate() {
        if !growth.value.is_finite() {
            return Err(CompileError::NonFiniteGrowthOverride {
                position,
                from_age: growth.from_age,
                value: growth.value,
            });
        }
        if !timeline.contains_age(growth.from_age) {
            return Err(CompileError::GrowthOverrideOutOfRange {
                position,
                from_age: growth.from_age,
                start_age,
                end_age,
            });
        }
    }

    for (position, edit) in spec.overrides.iter().enumerate() {
        let (kind, value, from_age) = (edit.kind(), edit.value(), edit.from_age());

        if !value.is_finite() {
            return Err(CompileError::NonFiniteOverride { position, kind, value });
        }

        match edit {
            Override::Set { .. } | Override::Cap { .. } if value < 0.0 => {
                return Err(CompileError::NegativeOverrideValue { position, kind, value });
            }
            Override::Mult { .. } if value <= 0.0 => {
                return Err(CompileError::NonPositiveMultiplier { position, value });
            }
            _ => {}
        }

        if !timeline.contains_age(from_age) {
            return Err(CompileError::OverrideOutOfRange {
                position,
                kind,
                from_age,
                start_age,
                end_age,
            });
        }

        if let Some(to_age) = edit.to_age() {
            if to_age < from_age {
                return Err(CompileError::InvertedOverrideRange {
                    position,
                    kind,
                    from_age,
                    to_age,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overrides::{GrowthRule, OverrideKind};
    use approx::assert_relative_eq;

    fn regrow(rule: GrowthRule, value: f64, periods: usize) -> f64 {
        (0..periods).fold(value, |v, _| rule.advance(v, rule.parameter()))
    }

    fn timeline() -> Timeline {
        Timeline::new(30, 10).unwrap()
    }

    fn salary() -> ComponentSpec {
        ComponentSpec::new(100_000.0, GrowthRule::Percent(0.03))
    }

    #[test]
    fn test_no_overrides_is_pure_growth() {
        let series = compile(&salary(), &timeline()).unwrap();
        assert_eq!(series.len(), 10);
        assert_eq!(series[0], 100_000.0);
        for i in 1..series.len() {
            assert_relative_eq!(series[i], series[i - 1] * 1.03, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_fixed_growth() {
        let spec = ComponentSpec::new(500.0, GrowthRule::Fixed(25.0));
        let series = compile(&spec, &timeline()).unwrap();
        assert_eq!(series[0], 500.0);
        assert_eq!(series[4], 600.0);
    }

    #[test]
    fn test_set_anchors_and_regrows_ignoring_to_age() {
        // Ranged set: the to_age must not revert the value at 36
        let spec = salary().with_override(Override::set(33, 80_000.0).until(35));
        let series = compile(&spec, &timeline()).unwrap();

        assert_eq!(series[3], 80_000.0);
        for i in 4..series.len() {
            let expected = regrow(GrowthRule::Percent(0.03), 80_000.0, i - 3);
            assert_relative_eq!(series[i], expected, max_relative = 1e-12);
        }

        // Open-ended and ranged set produce the same series
        let open = compile(&salary().with_override(Override::set(33, 80_000.0)), &timeline()).unwrap();
        assert_eq!(series, open);
    }

    #[test]
    fn test_sabbatical_set_to_zero_stays_zero() {
        // Zero anchored under percentage growth stays at zero
        let spec = salary().with_override(Override::set(32, 0.0).until(33));
        let series = compile(&spec, &timeline()).unwrap();
        assert!(series[2..].iter().all(|&v| v == 0.0));
        assert!(series[1] > 0.0);
    }

    #[test]
    fn test_add_and_mult_fire_once() {
        let spec = salary()
            .with_override(Override::add(32, 10_000.0).until(34))
            .with_override(Override::mult(36, 1.5));
        let series = compile(&spec, &timeline()).unwrap();
        let baseline = compile(&salary(), &timeline()).unwrap();

        assert_eq!(&series[..2], &baseline[..2]);
        assert_relative_eq!(series[2], baseline[2] + 10_000.0, max_relative = 1e-12);
        assert_relative_eq!(series[3], (baseline[2] + 10_000.0) * 1.03, max_relative = 1e-12);
        assert_relative_eq!(series[6], series[5] * 1.03 * 1.5, max_relative = 1e-12);
        assert_relative_eq!(series[7], series[6] * 1.03, max_relative = 1e-12);
    }

    #[test]
    fn test_cap_is_continuous_within_range_only() {
        let spec = salary().with_override(Override::cap(32, Some(35), 105_000.0));
        let series = compile(&spec, &timeline()).unwrap();
        let baseline = compile(&salary(), &timeline()).unwrap();

        for i in 2..=5 {
            assert!(series[i] <= 105_000.0, "index {} = {}", i, series[i]);
        }
        assert_eq!(&series[..2], &baseline[..2]);
        // After the range the clamped value regrows from the ceiling
        assert_relative_eq!(series[6], 105_000.0 * 1.03, max_relative = 1e-12);
    }

    #[test]
    fn test_open_cap_runs_to_end() {
        let spec = salary().with_override(Override::cap(31, None, 101_000.0));
        let series = compile(&spec, &timeline()).unwrap();
        assert!(series[1..].iter().all(|&v| v == 101_000.0));
    }

    #[test]
    fn test_application_order() {
        let overrides = vec![
            Override::add(35, 1.0),                   // 0: open-ended
            Override::mult(35, 2.0).until(40),        // 1
            Override::set(33, 5.0),                   // 2
            Override::add(35, 3.0).until(36),         // 3
            Override::cap(35, None, 10.0),            // 4: open-ended, after 0
        ];
        assert_eq!(application_order(&overrides), vec![2, 3, 1, 0, 4]);
    }

    #[test]
    fn test_same_age_order_is_deterministic() {
        // add then mult differs from mult then add; sort key decides
        let add_first = salary()
            .with_override(Override::mult(34, 2.0))
            .with_override(Override::add(34, 1_000.0).until(34));
        let mult_first = salary()
            .with_override(Override::add(34, 1_000.0).until(34))
            .with_override(Override::mult(34, 2.0));

        let a = compile(&add_first, &timeline()).unwrap();
        let b = compile(&mult_first, &timeline()).unwrap();
        // Ranged add sorts before open-ended mult in both insertion orders
        assert_eq!(a, b);

        let base = compile(&salary(), &timeline()).unwrap();
        assert_relative_eq!(a[4], (base[4] + 1_000.0) * 2.0, max_relative = 1e-12);

        // With identical keys insertion order decides, and recompiling is stable
        let tie = salary()
            .with_override(Override::mult(34, 2.0))
            .with_override(Override::add(34, 1_000.0));
        let first = compile(&tie, &timeline()).unwrap();
        assert_relative_eq!(first[4], base[4] * 2.0 + 1_000.0, max_relative = 1e-12);
        assert_eq!(first, compile(&tie, &timeline()).unwrap());
    }

    #[test]
    fn test_growth_overrides_latest_wins() {
        let spec = salary()
            .with_growth_override(35, 0.10)
            .with_growth_override(33, 0.0)
            .with_growth_override(35, 0.05);
        let growth = effective_growth(&spec, &timeline());
        assert_eq!(growth[2], 0.03);
        assert_eq!(growth[3], 0.0);
        assert_eq!(growth[4], 0.0);
        assert_eq!(growth[5], 0.05);
        assert_eq!(growth[9], 0.05);

        let series = compile(&spec, &timeline()).unwrap();
        assert_eq!(series[4], series[3]);
        assert_relative_eq!(series[5], series[4] * 1.05, max_relative = 1e-12);
    }

    #[test]
    fn test_growth_path_varies_baseline_growth() {
        let path = vec![0.0, 0.03, 0.03, 0.10, 0.10, 0.10, 0.02, 0.02, 0.02, 0.02];
        let spec = ComponentSpec::new(2_000.0, GrowthRule::Percent(0.03)).with_growth_path(path.clone());
        let series = compile(&spec, &timeline()).unwrap();

        assert_eq!(effective_growth(&spec, &timeline()), path);
        assert_eq!(series[0], 2_000.0);
        assert_relative_eq!(series[3], series[2] * 1.10, max_relative = 1e-12);
        assert_relative_eq!(series[6], series[5] * 1.02, max_relative = 1e-12);

        // Growth overrides still win over the path
        let pinned = spec.with_growth_override(36, 0.0);
        let series = compile(&pinned, &timeline()).unwrap();
        assert_eq!(series[6], series[5]);
        assert_eq!(series[9], series[5]);
    }

    #[test]
    fn test_constant_growth_path_matches_rule() {
        let spec = salary();
        let with_path = salary().with_growth_path(vec![0.03; 10]);
        assert_eq!(compile(&spec, &timeline()), compile(&with_path, &timeline()));
    }

    #[test]
    fn test_invalid_growth_path() {
        let short = salary().with_growth_path(vec![0.03; 9]);
        assert_eq!(
            compile(&short, &timeline()),
            Err(CompileError::GrowthPathLength { expected: 10, actual: 9 })
        );

        let mut path = vec![0.03; 10];
        path[4] = f64::NAN;
        assert!(matches!(
            compile(&salary().with_growth_path(path), &timeline()),
            Err(CompileError::NonFiniteGrowthPath { index: 4, .. })
        ));
    }

    #[test]
    fn test_growth_applies_before_override_at_same_index() {
        let spec = salary().with_override(Override::set(31, 50_000.0));
        let series = compile(&spec, &timeline()).unwrap();
        assert_eq!(series[1], 50_000.0);
    }

    #[test]
    fn test_invalid_specifications() {
        let t = timeline();

        let spec = ComponentSpec::new(f64::NAN, GrowthRule::Percent(0.0));
        assert!(matches!(compile(&spec, &t), Err(CompileError::NonFiniteStartValue(_))));

        let spec = ComponentSpec::new(1.0, GrowthRule::Percent(f64::INFINITY));
        assert!(matches!(compile(&spec, &t), Err(CompileError::NonFiniteGrowth(_))));

        let spec = salary().with_override(Override::set(32, -1.0));
        assert_eq!(
            compile(&spec, &t),
            Err(CompileError::NegativeOverrideValue { position: 0, kind: OverrideKind::Set, value: -1.0 })
        );

        let spec = salary().with_override(Override::add(31, 1.0)).with_override(Override::cap(32, None, -5.0));
        assert!(matches!(
            compile(&spec, &t),
            Err(CompileError::NegativeOverrideValue { position: 1, kind: OverrideKind::Cap, .. })
        ));

        let spec = salary().with_override(Override::mult(32, 0.0));
        assert_eq!(compile(&spec, &t), Err(CompileError::NonPositiveMultiplier { position: 0, value: 0.0 }));

        let spec = salary().with_override(Override::add(32, f64::NAN));
        assert!(matches!(compile(&spec, &t), Err(CompileError::NonFiniteOverride { position: 0, .. })));

        let spec = salary().with_override(Override::set(45, 1.0));
        assert!(matches!(compile(&spec, &t), Err(CompileError::OverrideOutOfRange { from_age: 45, .. })));

        let spec = salary().with_override(Override::cap(35, Some(33), 1.0));
        assert!(matches!(compile(&spec, &t), Err(CompileError::InvertedOverrideRange { .. })));

        let spec = salary().with_growth_override(20, 0.01);
        assert!(matches!(compile(&spec, &t), Err(CompileError::GrowthOverrideOutOfRange { .. })));
    }

    #[test]
    fn test_add_below_zero_is_rejected_with_location() {
        let spec = ComponentSpec::new(1_000.0, GrowthRule::flat()).with_override(Override::add(33, -1_500.0));
        match compile(&spec, &timeline()) {
            Err(CompileError::NegativeResult { position, kind, index, age, value }) => {
                assert_eq!(position, 0);
                assert_eq!(kind, OverrideKind::Add);
                assert_eq!(index, 3);
                assert_eq!(age, 33);
                assert_eq!(value, -500.0);
            }
            other => panic!("expected NegativeResult, got {:?}", other),
        }
    }

    #[test]
    fn test_signed_domain_allows_negative_rates() {
        let spec = ComponentSpec::rate(2.0).with_override(Override::add(32, -5.0));
        let series = compile(&spec, &timeline()).unwrap();
        assert_eq!(series[1], 2.0);
        assert_eq!(series[2], -3.0);
        assert_eq!(series[9], -3.0);
    }
}

//! Component specification and override types

use std::fmt;

use serde::{Deserialize, Serialize};

/// Baseline per-period growth of a quantity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum GrowthRule {
    /// Compounding rate per period as a decimal fraction (0.03 = 3%)
    Percent(f64),
    /// Fixed additive amount per period
    Fixed(f64),
}

impl GrowthRule {
    /// The rule's own parameter (rate or amount)
    pub fn parameter(&self) -> f64 {
        match self {
            GrowthRule::Percent(rate) => *rate,
            GrowthRule::Fixed(amount) => *amount,
        }
    }

    /// Advance a value by one period using `parameter` in place of the
    /// rule's own rate or amount
    pub fn advance(&self, value: f64, parameter: f64) -> f64 {
        match self {
            GrowthRule::Percent(_) => value * (1.0 + parameter),
            GrowthRule::Fixed(_) => value + parameter,
        }
    }

    /// No growth at all
    pub fn flat() -> Self {
        GrowthRule::Fixed(0.0)
    }
}

/// Sign constraint on a compiled quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueDomain {
    /// Money amounts: start value and every edit result must stay >= 0
    #[default]
    NonNegative,
    /// Rates, which may legitimately go negative
    Signed,
}

/// Discriminant of an [`Override`], used for ordering and error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverrideKind {
    Set,
    Add,
    Mult,
    Cap,
}

impl fmt::Display for OverrideKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OverrideKind::Set => "set",
            OverrideKind::Add => "add",
            OverrideKind::Mult => "mult",
            OverrideKind::Cap => "cap",
        };
        f.write_str(name)
    }
}

/// A dated edit to one quantity
///
/// `Set`, `Add` and `Mult` fire exactly once, at `from_age`, and the edited
/// value keeps compounding under the normal growth rule afterwards. Their
/// `to_age` is reserved and currently unused. `Cap` clamps the running value
/// at every age in `from_age..=to_age` (or through the end of the timeline
/// when `to_age` is absent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Override {
    Set {
        from_age: u32,
        #[serde(default)]
        to_age: Option<u32>,
        value: f64,
    },
    Add {
        from_age: u32,
        #[serde(default)]
        to_age: Option<u32>,
        value: f64,
    },
    Mult {
        from_age: u32,
        #[serde(default)]
        to_age: Option<u32>,
        value: f64,
    },
    Cap {
        from_age: u32,
        #[serde(default)]
        to_age: Option<u32>,
        value: f64,
    },
}

impl Override {
    pub fn set(from_age: u32, value: f64) -> Self {
        Override::Set { from_age, to_age: None, value }
    }

    pub fn add(from_age: u32, value: f64) -> Self {
        Override::Add { from_age, to_age: None, value }
    }

    pub fn mult(from_age: u32, value: f64) -> Self {
        Override::Mult { from_age, to_age: None, value }
    }

    pub fn cap(from_age: u32, to_age: Option<u32>, value: f64) -> Self {
        Override::Cap { from_age, to_age, value }
    }

    /// Same override with `to_age` set
    pub fn until(self, age: u32) -> Self {
        match self {
            Override::Set { from_age, value, .. } => Override::Set { from_age, to_age: Some(age), value },
            Override::Add { from_age, value, .. } => Override::Add { from_age, to_age: Some(age), value },
            Override::Mult { from_age, value, .. } => Override::Mult { from_age, to_age: Some(age), value },
            Override::Cap { from_age, value, .. } => Override::Cap { from_age, to_age: Some(age), value },
        }
    }

    pub fn kind(&self) -> OverrideKind {
        match self {
            Override::Set { .. } => OverrideKind::Set,
            Override::Add { .. } => OverrideKind::Add,
            Override::Mult { .. } => OverrideKind::Mult,
            Override::Cap { .. } => OverrideKind::Cap,
        }
    }

    pub fn from_age(&self) -> u32 {
        match self {
            Override::Set { from_age, .. }
            | Override::Add { from_age, .. }
            | Override::Mult { from_age, .. }
            | Override::Cap { from_age, .. } => *from_age,
        }
    }

    pub fn to_age(&self) -> Option<u32> {
        match self {
            Override::Set { to_age, .. }
            | Override::Add { to_age, .. }
            | Override::Mult { to_age, .. }
            | Override::Cap { to_age, .. } => *to_age,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Override::Set { value, .. }
            | Override::Add { value, .. }
            | Override::Mult { value, .. }
            | Override::Cap { value, .. } => *value,
        }
    }

    /// Whether this override transforms the running value at `age`
    pub fn fires_at(&self, age: u32, end_age: u32) -> bool {
        match self {
            Override::Set { from_age, .. }
            | Override::Add { from_age, .. }
            | Override::Mult { from_age, .. } => age == *from_age,
            Override::Cap { from_age, to_age, .. } => {
                age >= *from_age && age <= to_age.unwrap_or(end_age)
            }
        }
    }
}

/// Replaces the baseline growth parameter from `from_age` onward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthOverride {
    pub from_age: u32,
    pub value: f64,
}

/// Baseline definition of one household quantity for a compilation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub start_value: f64,
    pub growth: GrowthRule,
    #[serde(default)]
    pub domain: ValueDomain,
    #[serde(default)]
    pub overrides: Vec<Override>,
    #[serde(default)]
    pub growth_overrides: Vec<GrowthOverride>,
    /// Per-index baseline growth parameter replacing the rule's constant
    /// one; growth overrides still take precedence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub growth_path: Option<Vec<f64>>,
}

impl ComponentSpec {
    /// Non-negative quantity with no edits
    pub fn new(start_value: f64, growth: GrowthRule) -> Self {
        Self {
            start_value,
            growth,
            domain: ValueDomain::NonNegative,
            overrides: Vec::new(),
            growth_overrides: Vec::new(),
            growth_path: None,
        }
    }

    /// Signed rate quantity that stays flat unless edited
    pub fn rate(start_value: f64) -> Self {
        Self {
            domain: ValueDomain::Signed,
            ..Self::new(start_value, GrowthRule::flat())
        }
    }

    pub fn with_override(mut self, edit: Override) -> Self {
        self.overrides.push(edit);
        self
    }

    pub fn with_growth_override(mut self, from_age: u32, value: f64) -> Self {
        self.growth_overrides.push(GrowthOverride { from_age, value });
        self
    }

    pub fn with_growth_path(mut self, path: Vec<f64>) -> Self {
        self.growth_path = Some(path);
        self
    }
}

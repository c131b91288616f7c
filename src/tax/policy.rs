//! Versioned tax policy tables

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Tax years with a built-in policy table
pub const SUPPORTED_TAX_YEARS: [u16; 2] = [2024, 2025];

/// Federal filing status of the household
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
    HeadOfHousehold,
}

impl FilingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedFilingJointly => "married_filing_jointly",
            FilingStatus::HeadOfHousehold => "head_of_household",
        }
    }

    pub fn all() -> [FilingStatus; 3] {
        [
            FilingStatus::Single,
            FilingStatus::MarriedFilingJointly,
            FilingStatus::HeadOfHousehold,
        ]
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "single" => Ok(FilingStatus::Single),
            "married_filing_jointly" | "mfj" => Ok(FilingStatus::MarriedFilingJointly),
            "head_of_household" | "hoh" => Ok(FilingStatus::HeadOfHousehold),
            other => Err(other.to_string()),
        }
    }
}

/// One marginal bracket; `up_to` is `None` for the unbounded top bracket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub up_to: Option<f64>,
    pub rate: f64,
}

impl Bracket {
    pub const fn new(up_to: f64, rate: f64) -> Self {
        Self { up_to: Some(up_to), rate }
    }

    pub const fn top(rate: f64) -> Self {
        Self { up_to: None, rate }
    }
}

/// A value kept separately for each filing status
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ByFilingStatus<T> {
    pub single: T,
    pub married_filing_jointly: T,
    pub head_of_household: T,
}

impl<T> ByFilingStatus<T> {
    pub fn get(&self, status: FilingStatus) -> &T {
        match status {
            FilingStatus::Single => &self.single,
            FilingStatus::MarriedFilingJointly => &self.married_filing_jointly,
            FilingStatus::HeadOfHousehold => &self.head_of_household,
        }
    }
}

/// Federal and payroll parameters for one tax year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxPolicy {
    pub year: u16,
    pub standard_deduction: ByFilingStatus<f64>,
    /// Ordered brackets, ascending `up_to`, last one unbounded
    pub brackets: ByFilingStatus<Vec<Bracket>>,
    pub social_security_rate: f64,
    pub social_security_wage_base: f64,
    pub medicare_rate: f64,
    pub additional_medicare_rate: f64,
    pub additional_medicare_threshold: ByFilingStatus<f64>,
    /// Annual cap on employee elective deferrals (402(g))
    pub elective_deferral_limit: f64,
}

impl TaxPolicy {
    /// Built-in table for a supported year
    pub fn for_year(year: u16) -> Option<Self> {
        match year {
            2024 => Some(Self::year_2024()),
            2025 => Some(Self::year_2025()),
            _ => None,
        }
    }

    /// Most recent built-in table
    pub fn latest() -> Self {
        Self::year_2025()
    }

    pub fn year_2024() -> Self {
        Self {
            year: 2024,
            standard_deduction: ByFilingStatus {
                single: 14_600.0,
                married_filing_jointly: 29_200.0,
                head_of_household: 21_900.0,
            },
            brackets: ByFilingStatus {
                single: vec![
                    Bracket::new(11_600.0, 0.10),
                    Bracket::new(47_150.0, 0.12),
                    Bracket::new(100_525.0, 0.22),
                    Bracket::new(191_950.0, 0.24),
                    Bracket::new(243_725.0, 0.32),
                    Bracket::new(609_350.0, 0.35),
                    Bracket::top(0.37),
                ],
                married_filing_jointly: vec![
                    Bracket::new(23_200.0, 0.10),
                    Bracket::new(94_300.0, 0.12),
                    Bracket::new(201_050.0, 0.22),
                    Bracket::new(383_900.0, 0.24),
                    Bracket::new(487_450.0, 0.32),
                    Bracket::new(731_200.0, 0.35),
                    Bracket::top(0.37),
                ],
                head_of_household: vec![
                    Bracket::new(16_550.0, 0.10),
                    Bracket::new(63_100.0, 0.12),
                    Bracket::new(100_500.0, 0.22),
                    Bracket::new(191_950.0, 0.24),
                    Bracket::new(243_700.0, 0.32),
                    Bracket::new(609_350.0, 0.35),
                    Bracket::top(0.37),
                ],
            },
            social_security_rate: 0.062,
            social_security_wage_base: 168_600.0,
            medicare_rate: 0.0145,
            additional_medicare_rate: 0.009,
            additional_medicare_threshold: Self::additional_medicare_thresholds(),
            elective_deferral_limit: 23_000.0,
        }
    }

    pub fn year_2025() -> Self {
        Self {
            year: 2025,
            standard_deduction: ByFilingStatus {
                single: 15_000.0,
                married_filing_jointly: 30_000.0,
                head_of_household: 22_500.0,
            },
            brackets: ByFilingStatus {
                single: vec![
                    Bracket::new(11_925.0, 0.10),
                    Bracket::new(48_475.0, 0.12),
                    Bracket::new(103_350.0, 0.22),
                    Bracket::new(197_300.0, 0.24),
                    Bracket::new(250_525.0, 0.32),
                    Bracket::new(626_350.0, 0.35),
                    Bracket::top(0.37),
                ],
                married_filing_jointly: vec![
                    Bracket::new(23_850.0, 0.10),
                    Bracket::new(96_950.0, 0.12),
                    Bracket::new(206_700.0, 0.22),
                    Bracket::new(394_600.0, 0.24),
                    Bracket::new(501_050.0, 0.32),
                    Bracket::new(751_600.0, 0.35),
                    Bracket::top(0.37),
                ],
                head_of_household: vec![
                    Bracket::new(17_000.0, 0.10),
                    Bracket::new(64_850.0, 0.12),
                    Bracket::new(103_350.0, 0.22),
                    Bracket::new(197_300.0, 0.24),
                    Bracket::new(250_500.0, 0.32),
                    Bracket::new(626_350.0, 0.35),
                    Bracket::top(0.37),
                ],
            },
            social_security_rate: 0.062,
            social_security_wage_base: 176_100.0,
            medicare_rate: 0.0145,
            additional_medicare_rate: 0.009,
            additional_medicare_threshold: Self::additional_medicare_thresholds(),
            elective_deferral_limit: 23_500.0,
        }
    }

    // Not indexed for inflation
    fn additional_medicare_thresholds() -> ByFilingStatus<f64> {
        ByFilingStatus {
            single: 200_000.0,
            married_filing_jointly: 250_000.0,
            head_of_household: 200_000.0,
        }
    }
}

impl Default for TaxPolicy {
    fn default() -> Self {
        Self::latest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_built_in_tables_are_well_formed() {
        for year in SUPPORTED_TAX_YEARS {
            let policy = TaxPolicy::for_year(year).unwrap();
            assert_eq!(policy.year, year);
            for status in FilingStatus::all() {
                let brackets = policy.brackets.get(status);
                assert!(brackets.last().unwrap().up_to.is_none());
                let bounds: Vec<f64> = brackets.iter().filter_map(|b| b.up_to).collect();
                assert!(bounds.windows(2).all(|w| w[0] < w[1]), "{} {}", year, status);
                assert!(*policy.standard_deduction.get(status) > 0.0);
            }
        }
        assert!(TaxPolicy::for_year(1999).is_none());
    }

    #[test]
    fn test_filing_status_parse() {
        assert_eq!("single".parse::<FilingStatus>(), Ok(FilingStatus::Single));
        assert_eq!("mfj".parse::<FilingStatus>(), Ok(FilingStatus::MarriedFilingJointly));
        assert_eq!(
            FilingStatus::HeadOfHousehold.as_str().parse::<FilingStatus>(),
            Ok(FilingStatus::HeadOfHousehold)
        );
        assert!("widow".parse::<FilingStatus>().is_err());
    }
}

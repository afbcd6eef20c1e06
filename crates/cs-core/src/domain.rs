//! Domain vocabulary shared by every stage: geographies, offense families,
//! offense names and state codes.

use crate::error::{CoreError, CoreResult};
use crate::newtype_string::{define_newtype_string, trimmed, trimmed_upper};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reporting geography of an incident count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Geography {
    #[serde(rename = "On-campus")]
    OnCampus,
    /// Subset of [`Geography::OnCampus`]; never summed into [`Geography::All`].
    #[serde(rename = "Residence halls")]
    ResidenceHalls,
    #[serde(rename = "Non-campus")]
    NonCampus,
    #[serde(rename = "Public property")]
    PublicProperty,
    /// Synthetic rollup; never present in source data.
    #[serde(rename = "All")]
    All,
}

impl Geography {
    /// Geographies that sum to [`Geography::All`] without double counting.
    pub const ALL_ROLLUP: [Geography; 3] = [
        Geography::OnCampus,
        Geography::NonCampus,
        Geography::PublicProperty,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Geography::OnCampus => "On-campus",
            Geography::ResidenceHalls => "Residence halls",
            Geography::NonCampus => "Non-campus",
            Geography::PublicProperty => "Public property",
            Geography::All => "All",
        }
    }

    /// The rollup geography, produced by aggregation and never accepted from input.
    pub fn is_synthetic(self) -> bool {
        self == Geography::All
    }

    /// Whether counts in this geography contribute to the "All" rollup.
    pub fn rolls_up(self) -> bool {
        Self::ALL_ROLLUP.contains(&self)
    }
}

impl fmt::Display for Geography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Geography {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "On-campus" => Ok(Geography::OnCampus),
            "Residence halls" => Ok(Geography::ResidenceHalls),
            "Non-campus" => Ok(Geography::NonCampus),
            "Public property" => Ok(Geography::PublicProperty),
            "All" => Ok(Geography::All),
            other => Err(CoreError::InvalidValue {
                field: "geography",
                value: other.to_string(),
            }),
        }
    }
}

/// Coarse grouping of offenses, one per Clery file category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OffenseFamily {
    Criminal,
    #[serde(rename = "VAWA")]
    Vawa,
    Arrest,
    Disciplinary,
}

impl OffenseFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            OffenseFamily::Criminal => "Criminal",
            OffenseFamily::Vawa => "VAWA",
            OffenseFamily::Arrest => "Arrest",
            OffenseFamily::Disciplinary => "Disciplinary",
        }
    }
}

impl fmt::Display for OffenseFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OffenseFamily {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "Criminal" => Ok(OffenseFamily::Criminal),
            "VAWA" => Ok(OffenseFamily::Vawa),
            "Arrest" => Ok(OffenseFamily::Arrest),
            "Disciplinary" => Ok(OffenseFamily::Disciplinary),
            other => Err(CoreError::InvalidValue {
                field: "offense_family",
                value: other.to_string(),
            }),
        }
    }
}

define_newtype_string! {
    /// Display name of an offense, e.g. `"Aggravated Assault"`.
    pub struct OffenseName;
    normalize = trimmed;
}

impl OffenseName {
    /// Lowercase, underscore-separated code used as a JSON key.
    pub fn code(&self) -> String {
        offense_code(self.as_str())
    }
}

define_newtype_string! {
    /// Two-letter postal code, stored uppercase.
    pub struct StateCode;
    normalize = trimmed_upper;
}

/// Map an offense display name to its JSON key (`"Motor Vehicle Theft"` -> `"motor_vehicle_theft"`).
pub fn offense_code(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// Round to `decimals` places, ties to even.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Incidents per 10,000 FTE students, rounded to 2 decimals.
///
/// `None` when FTE is unknown or zero so no inf/NaN reaches downstream tables.
pub fn rate_per_10k(count: i64, fte: Option<i32>) -> Option<f64> {
    match fte {
        Some(fte) if fte > 0 => Some(round_to(count as f64 / fte as f64 * 10_000.0, 2)),
        _ => None,
    }
}

#[cfg(test)]
#[path = "domain_test.rs"]
mod tests;

//! Row types of the aggregate and ranking tables.

use crate::domain::{offense_code, Geography, OffenseFamily, OffenseName, StateCode};
use crate::error::{CoreError, CoreResult};
use crate::ids::InstitutionId;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Key of the synthetic cross-offense ranking.
pub const ALL_OFFENSES: &str = "all";

/// Offense dimension of a ranking: one offense, or every offense summed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OffenseKey {
    /// Sorts before every named offense.
    All,
    Offense(OffenseName),
}

impl OffenseKey {
    /// JSON key: `"all"` or the lowercase-underscored offense code.
    pub fn code(&self) -> String {
        match self {
            OffenseKey::All => ALL_OFFENSES.to_string(),
            OffenseKey::Offense(name) => offense_code(name.as_str()),
        }
    }

    /// Value stored in the `offense` column.
    pub fn as_stored(&self) -> &str {
        match self {
            OffenseKey::All => ALL_OFFENSES,
            OffenseKey::Offense(name) => name.as_str(),
        }
    }

    /// Inverse of [`as_stored`](Self::as_stored).
    pub fn from_stored(value: &str) -> CoreResult<Self> {
        if value == ALL_OFFENSES {
            return Ok(OffenseKey::All);
        }
        OffenseName::try_new(value)
            .map(OffenseKey::Offense)
            .ok_or(CoreError::InvalidValue {
                field: "offense",
                value: value.to_string(),
            })
    }
}

impl Serialize for OffenseKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_stored())
    }
}

impl fmt::Display for OffenseKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_stored())
    }
}

/// Population a ranking is computed over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScopeKey {
    Ivy,
    State(StateCode),
    National,
}

impl ScopeKey {
    /// Preset id used in file names and stored rows (`ivy`, `MA`, `national`).
    pub fn preset_id(&self) -> String {
        match self {
            ScopeKey::Ivy => "ivy".to_string(),
            ScopeKey::State(code) => code.as_str().to_string(),
            ScopeKey::National => "national".to_string(),
        }
    }

    pub fn from_preset_id(value: &str) -> CoreResult<Self> {
        match value {
            "ivy" => Ok(ScopeKey::Ivy),
            "national" => Ok(ScopeKey::National),
            other => StateCode::try_new(other)
                .map(ScopeKey::State)
                .ok_or(CoreError::InvalidValue {
                    field: "scope",
                    value: other.to_string(),
                }),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        match self {
            ScopeKey::Ivy => ScopeKind::Ivy,
            ScopeKey::State(_) => ScopeKind::State,
            ScopeKey::National => ScopeKind::National,
        }
    }
}

impl Serialize for ScopeKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.preset_id())
    }
}

impl fmt::Display for ScopeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.preset_id())
    }
}

/// The three ranking tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScopeKind {
    Ivy,
    State,
    National,
}

impl ScopeKind {
    pub const ALL: [ScopeKind; 3] = [ScopeKind::Ivy, ScopeKind::State, ScopeKind::National];
}

/// One row of `agg_school_year_offense`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolYearOffense {
    pub year: i16,
    pub unitid: InstitutionId,
    pub offense: OffenseName,
    pub offense_family: OffenseFamily,
    #[serde(rename = "geo")]
    pub geography: Geography,
    pub count: i64,
    pub institution_name: Option<String>,
    pub fte: Option<i32>,
    pub rate_per_10k: Option<f64>,
}

/// One row of a ranking table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub scope: ScopeKey,
    pub year: i16,
    pub offense: OffenseKey,
    #[serde(rename = "geo")]
    pub geography: Geography,
    pub unitid: InstitutionId,
    pub institution_name: Option<String>,
    pub count: i64,
    pub fte: Option<i32>,
    pub rate_per_10k: Option<f64>,
    /// 1-based position by count desc, then name asc.
    pub rank: u32,
    /// Position among entries with a known rate; `None` otherwise.
    pub rank_by_rate: Option<u32>,
    pub pct_of_total: f64,
}

/// Partition key shared by every entry in one ranked list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionKey {
    pub scope: ScopeKey,
    pub year: i16,
    pub offense: OffenseKey,
    pub geography: Geography,
}

impl RankingEntry {
    pub fn partition_key(&self) -> PartitionKey {
        PartitionKey {
            scope: self.scope.clone(),
            year: self.year,
            offense: self.offense.clone(),
            geography: self.geography,
        }
    }
}

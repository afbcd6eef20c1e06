//! Serialized shapes of every JSON artifact.
//!
//! Field names are camelCase. Optional values serialize as explicit
//! `null` keys so consumers never need to distinguish absent from null.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `metadata.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataDocument {
    pub years: Vec<i16>,
    pub offenses: Vec<OffenseMeta>,
    pub geographies: Vec<String>,
    pub presets: Vec<PresetMeta>,
    pub last_updated: String,
    pub data_source: String,
    pub data_source_url: String,
    pub coverage: String,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OffenseMeta {
    pub code: String,
    pub display: String,
    pub family: String,
    pub family_display: String,
    pub description: String,
    pub display_order: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetMeta {
    pub id: String,
    pub name: String,
    pub description: String,
    pub school_count: usize,
}

/// One entry of `presets.json`, keyed by preset id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetDocument {
    pub id: String,
    pub name: String,
    pub schools: Vec<SchoolRef>,
}

/// School listed under a preset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolRef {
    pub unitid: i32,
    pub name: String,
    pub short: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// `rankings/{preset}-{year}-all.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingDocument {
    pub preset: String,
    pub year: i16,
    /// Offense code (`all` included) to entries in rank order.
    pub rankings: BTreeMap<String, Vec<RankingRow>>,
    pub totals: BTreeMap<String, i64>,
}

impl RankingDocument {
    pub fn file_name(&self) -> String {
        format!("{}-{}-all.json", self.preset, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingRow {
    pub rank: u32,
    pub rank_by_rate: Option<u32>,
    pub unitid: i32,
    pub name: Option<String>,
    pub short: Option<String>,
    pub state: Option<String>,
    pub count: i64,
    pub pct: f64,
    pub fte: Option<i32>,
    pub rate: Option<f64>,
    pub is_main_campus: bool,
}

/// `schools/{unitid}.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDocument {
    pub unitid: i32,
    pub name: String,
    pub short_name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub ivy_league: bool,
    pub is_main_campus: bool,
    pub campus_type: String,
    /// FTE of the most recent year that has one.
    pub fte: Option<i32>,
    pub fte_by_year: Option<BTreeMap<i16, i32>>,
    pub summary: ProfileSummary,
    pub yearly_totals: Vec<YearTotal>,
    pub trends: Vec<TrendPoint>,
    pub breakdown_by_offense: Vec<OffenseCount>,
    pub breakdown_by_geo: Vec<GeoCount>,
}

impl ProfileDocument {
    pub fn file_name(&self) -> String {
        format!("{}.json", self.unitid)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub latest_year: i16,
    pub total_incidents: i64,
    pub top_offense: Option<String>,
    pub top_offense_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearTotal {
    pub year: i16,
    pub total: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub year: i16,
    pub offense: String,
    pub offense_family: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffenseCount {
    pub offense: String,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCount {
    pub geo: String,
    pub count: i64,
}

/// `school-index.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolIndexDocument {
    pub schools: Vec<SchoolIndexEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolIndexEntry {
    pub unitid: i32,
    pub name: String,
    pub short: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub is_main_campus: bool,
    pub base_unitid: i32,
}

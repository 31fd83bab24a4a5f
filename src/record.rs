//! NASS Record Schema
//!
//! Typed representation of one QuickStats row as produced by the external
//! data loader. The engine never mutates records; every analytics pass
//! derives fresh output structures from a borrowed slice.
//!
//! Field names follow the QuickStats export columns (source_desc,
//! sector_desc, ...) collapsed to the subset the dashboard needs. Columns
//! outside this subset are ignored on deserialization.

use serde::{Deserialize, Serialize};

use crate::utils::value::normalize;

/// State code used by NATIONAL aggregate rows.
pub const NATIONAL_STATE_CODE: &str = "US";

/// Canonical (non-subdivided) domain label.
pub const DOMAIN_TOTAL: &str = "TOTAL";

/// Synthetic bookkeeping commodity reported by the census program only.
pub const FARM_OPERATIONS: &str = "FARM OPERATIONS";

/// Data provenance: annual survey vs. periodic census program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    Survey,
    Census,
    Other(String),
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "SURVEY" => Source::Survey,
            "CENSUS" => Source::Census,
            _ => Source::Other(s),
        }
    }
}

impl From<Source> for String {
    fn from(s: Source) -> String {
        match s {
            Source::Survey => "SURVEY".to_string(),
            Source::Census => "CENSUS".to_string(),
            Source::Other(other) => other,
        }
    }
}

/// Geographic granularity of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AggLevel {
    State,
    National,
    Other(String),
}

impl From<String> for AggLevel {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "STATE" => AggLevel::State,
            "NATIONAL" => AggLevel::National,
            _ => AggLevel::Other(s),
        }
    }
}

impl From<AggLevel> for String {
    fn from(l: AggLevel) -> String {
        match l {
            AggLevel::State => "STATE".to_string(),
            AggLevel::National => "NATIONAL".to_string(),
            AggLevel::Other(other) => other,
        }
    }
}

/// Raw Value cell before normalization. QuickStats mixes plain numbers,
/// comma-formatted strings and suppression codes in one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Missing,
}

impl Default for RawValue {
    fn default() -> Self {
        RawValue::Missing
    }
}

/// One observation from the combined NASS dataset.
///
/// All descriptive fields are optional: QuickStats exports vary by sector
/// and an absent field means "unknown", not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub commodity: Option<String>,
    #[serde(default)]
    pub statistic_category: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub aggregation_level: Option<AggLevel>,
    #[serde(default)]
    pub state_code: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub raw_value: RawValue,
}

impl Record {
    /// Normalized numeric value, or `None` for suppressed/unparseable cells.
    pub fn value(&self) -> Option<f64> {
        normalize(&self.raw_value)
    }

    pub fn is_survey(&self) -> bool {
        matches!(self.source, Some(Source::Survey))
    }

    pub fn is_census(&self) -> bool {
        matches!(self.source, Some(Source::Census))
    }

    pub fn is_national(&self) -> bool {
        matches!(self.aggregation_level, Some(AggLevel::National))
            || self.state_code.as_deref() == Some(NATIONAL_STATE_CODE)
    }

    /// Dollar-denominated rows ("$", "$ / CWT", ...).
    pub fn is_dollar_unit(&self) -> bool {
        self.unit.as_deref().map_or(false, |u| u.contains('$'))
    }

    pub fn has_statistic(&self, category: &str) -> bool {
        self.statistic_category
            .as_deref()
            .map_or(false, |c| c.eq_ignore_ascii_case(category))
    }
}

/// Which dashboard measure an aggregation pass is asked for.
///
/// `Revenue` is special: a commodity may report dollars under SALES,
/// PRODUCTION or VALUE depending on program coverage, resolved per
/// category by the aggregation engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Metric {
    AreaPlanted,
    AreaHarvested,
    Production,
    Yield,
    Operations,
    Revenue,
}

impl Metric {
    /// Statistic categories that can satisfy this metric, in preference order.
    pub fn statistic_categories(self) -> &'static [&'static str] {
        match self {
            Metric::AreaPlanted => &["AREA PLANTED"],
            Metric::AreaHarvested => &["AREA HARVESTED"],
            Metric::Production => &["PRODUCTION"],
            Metric::Yield => &["YIELD"],
            Metric::Operations => &["OPERATIONS"],
            Metric::Revenue => &["SALES", "PRODUCTION", "VALUE"],
        }
    }

    /// Revenue is only meaningful in dollars; other metrics accept any unit.
    pub fn requires_dollar_unit(self) -> bool {
        matches!(self, Metric::Revenue)
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query parameters and result types for accident analytics.
//!
//! A single [`AccidentFilter`] narrows the cleaned table; every aggregate
//! is then computed over the filtered rows.

use chrono::NaiveDate;
use road_safety_accident_models::LightingGroup;
use serde::{Deserialize, Serialize};

/// Inclusive calendar range. An open end is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// First day included.
    pub from: Option<NaiveDate>,
    /// Last day included.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Whether `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Row filter over the cleaned table.
///
/// `None` and an empty list both mean "no constraint" for that dimension.
/// When a date range is set, rows without a date never match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentFilter {
    /// Accident date range.
    pub date_range: Option<DateRange>,
    /// Accepted severity labels.
    pub severities: Option<Vec<String>>,
    /// Accepted agglomeration labels.
    pub agglomerations: Option<Vec<String>>,
    /// Accepted surface labels.
    pub surfaces: Option<Vec<String>>,
    /// Accepted lighting groups.
    pub lighting_groups: Option<Vec<LightingGroup>>,
}

/// Earliest and latest accident dates of a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateBounds {
    /// Earliest date.
    pub min: NaiveDate,
    /// Latest date.
    pub max: NaiveDate,
}

/// Count of accidents sharing a label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    /// Category label.
    pub label: String,
    /// Number of accidents.
    pub count: u64,
}

/// Count of accidents for one severity in one zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeverityZoneCount {
    /// Severity label.
    pub severity: String,
    /// Agglomeration label.
    pub zone: String,
    /// Number of accidents.
    pub count: u64,
}

/// Count of accidents in one hour of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourCount {
    /// Hour, 0-23.
    pub hour: u8,
    /// Number of accidents.
    pub count: u64,
}

/// Count of accidents in one lighting group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightingGroupCount {
    /// Lighting group.
    pub group: LightingGroup,
    /// Number of accidents.
    pub count: u64,
}

/// A located accident, for density maps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Latitude, decimal degrees.
    pub latitude: f64,
    /// Longitude, decimal degrees.
    pub longitude: f64,
}

/// Every aggregate of a filtered table at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentSummary {
    /// Accidents matching the filter.
    pub total: u64,
    /// Casualty rows across those accidents.
    pub victims: u64,
    /// Date span of the matching accidents.
    pub date_bounds: Option<DateBounds>,
    /// Severity by zone.
    pub by_severity_zone: Vec<SeverityZoneCount>,
    /// Road-surface conditions.
    pub by_surface: Vec<CategoryCount>,
    /// Hour of day.
    pub by_hour: Vec<HourCount>,
    /// Lighting groups.
    pub by_lighting_group: Vec<LightingGroupCount>,
}

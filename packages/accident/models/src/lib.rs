#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Road-accident record types.
//!
//! The three raw annual sources (characteristics, locations, casualties)
//! are read into the `Raw*` types with every cell kept as optional text.
//! The cleaning pipeline reconciles them into one [`CleanedAccident`] per
//! accident, collected in a [`CleanedTable`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Label used when a category code is missing or absent from its mapping.
pub const NOT_SPECIFIED: &str = "Non renseigne";

/// Label used when a severity code is missing or absent from its mapping.
pub const UNKNOWN_SEVERITY: &str = "Gravite inconnue";

/// One row of the characteristics source (one per accident).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCharacteristic {
    /// Accident identifier shared across all three sources.
    pub accident_id: String,
    /// Year part of the accident date.
    pub year: Option<String>,
    /// Month part of the accident date.
    pub month: Option<String>,
    /// Day part of the accident date.
    pub day: Option<String>,
    /// Time of day, nominally `HHMM`.
    pub time: Option<String>,
    /// Agglomeration code.
    pub agglomeration: Option<String>,
    /// Lighting code.
    pub lighting: Option<String>,
    /// Latitude as free-form text (may use a comma decimal separator).
    pub latitude: Option<String>,
    /// Longitude as free-form text (may use a comma decimal separator).
    pub longitude: Option<String>,
}

/// One row of the locations source (at most one per accident is used).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawLocation {
    /// Accident identifier.
    pub accident_id: String,
    /// Road-surface condition code.
    pub surface: Option<String>,
}

/// One row of the casualties source (zero or more per accident).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCasualty {
    /// Accident identifier.
    pub accident_id: String,
    /// Severity code of the person involved.
    pub severity: Option<String>,
}

/// Four-bucket coarsening of the raw lighting code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum LightingGroup {
    /// Night with public lighting switched on (code 5).
    #[serde(rename = "Eclairage public")]
    #[strum(to_string = "Eclairage public")]
    PublicLighting,
    /// Night without working public lighting (codes 3 and 4).
    #[serde(rename = "Sans eclairage public")]
    #[strum(to_string = "Sans eclairage public")]
    NoPublicLighting,
    /// Daylight, dusk or dawn (codes 1 and 2).
    #[serde(rename = "Lumiere naturelle")]
    #[strum(to_string = "Lumiere naturelle")]
    NaturalLight,
    /// Missing or unknown lighting code.
    #[serde(rename = "Non renseigne")]
    #[strum(to_string = "Non renseigne")]
    NotSpecified,
}

impl LightingGroup {
    /// Classifies a lighting code. Depends on the code only, never on
    /// its label.
    #[must_use]
    pub const fn from_code(code: Option<i64>) -> Self {
        match code {
            Some(5) => Self::PublicLighting,
            Some(3 | 4) => Self::NoPublicLighting,
            Some(1 | 2) => Self::NaturalLight,
            _ => Self::NotSpecified,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::PublicLighting,
            Self::NoPublicLighting,
            Self::NaturalLight,
            Self::NotSpecified,
        ]
    }
}

/// One reconciled accident: the row type of the cleaned table.
///
/// Serialized field names are the persisted column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedAccident {
    /// Unique accident identifier.
    pub accident_id: String,
    /// Calendar date, `None` when the raw date parts are invalid.
    pub date: Option<NaiveDate>,
    /// Hour of day (0-23).
    pub hour: Option<u8>,
    /// Agglomeration code.
    #[serde(rename = "agg")]
    pub agglomeration_code: Option<i64>,
    /// Agglomeration label.
    #[serde(rename = "agg_label")]
    pub agglomeration_label: String,
    /// Latitude (WGS84).
    #[serde(rename = "lat")]
    pub latitude: f64,
    /// Longitude (WGS84).
    #[serde(rename = "long")]
    pub longitude: f64,
    /// Road-surface code.
    #[serde(rename = "surf")]
    pub surface_code: Option<i64>,
    /// Road-surface label.
    pub surface_label: String,
    /// Lighting code.
    #[serde(rename = "lum")]
    pub lighting_code: Option<i64>,
    /// Lighting label.
    pub lighting_label: String,
    /// Coarsened lighting bucket.
    pub lighting_group: LightingGroup,
    /// Worst severity code among the accident's casualties.
    pub severity_code: Option<i64>,
    /// Severity label.
    pub severity_label: String,
    /// Number of casualty records for this accident.
    pub victim_count: u32,
}

/// The denormalized one-row-per-accident output of the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanedTable {
    rows: Vec<CleanedAccident>,
}

impl CleanedTable {
    /// Wraps already-reconciled rows.
    #[must_use]
    pub const fn new(rows: Vec<CleanedAccident>) -> Self {
        Self { rows }
    }

    /// Returns the rows in table order.
    #[must_use]
    pub fn rows(&self) -> &[CleanedAccident] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over the rows.
    pub fn iter(&self) -> std::slice::Iter<'_, CleanedAccident> {
        self.rows.iter()
    }

    /// Looks up a row by accident id.
    #[must_use]
    pub fn get(&self, accident_id: &str) -> Option<&CleanedAccident> {
        self.rows.iter().find(|row| row.accident_id == accident_id)
    }
}

impl<'a> IntoIterator for &'a CleanedTable {
    type Item = &'a CleanedAccident;
    type IntoIter = std::slice::Iter<'a, CleanedAccident>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

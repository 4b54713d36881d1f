//! Joins the cleaned sources into the one-row-per-accident table.
//!
//! Characteristics drive the join: every accident id found there yields at
//! most one row. Locations and severities are left-joined on the id, so a
//! miss falls back to sentinel labels instead of dropping the accident.
//! Accidents without usable coordinates are dropped.

use std::collections::{BTreeMap, BTreeSet};

use road_safety_accident_models::{
    CleanedAccident, CleanedTable, LightingGroup, RawCharacteristic, RawLocation, UNKNOWN_SEVERITY,
};
use road_safety_config::CategoryMappings;
use serde::Serialize;

use crate::parsing::{parse_code, parse_coordinate, parse_date, parse_hour};
use crate::severity::ResolvedSeverity;

/// Aggregate counts of one merge, for logging and reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MergeStats {
    /// Characteristics rows read.
    pub characteristics: usize,
    /// Rows in the cleaned table.
    pub retained: usize,
    /// Accidents dropped for a missing latitude or longitude.
    pub missing_coordinates: usize,
    /// Characteristics rows skipped because their id was already seen.
    pub duplicate_ids: usize,
    /// Retained accidents with no location row.
    pub without_location: usize,
    /// Retained accidents with no casualty row.
    pub without_casualties: usize,
}

/// The cleaned table and the counts describing how it was built.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    /// The cleaned table, in characteristics file order.
    pub table: CleanedTable,
    /// What was dropped or defaulted on the way.
    pub stats: MergeStats,
}

/// Builds the cleaned table.
///
/// Rows keep the order of `characteristics`; the first occurrence of a
/// duplicated accident id wins, as does the first location row of an id.
#[must_use]
pub fn merge_sources(
    characteristics: &[RawCharacteristic],
    locations: &[RawLocation],
    severities: &BTreeMap<String, ResolvedSeverity>,
    mappings: &CategoryMappings,
) -> MergeOutput {
    let mut surfaces: BTreeMap<&str, Option<i64>> = BTreeMap::new();
    for location in locations {
        surfaces
            .entry(location.accident_id.as_str())
            .or_insert_with(|| parse_code(location.surface.as_deref()));
    }

    let mut stats = MergeStats {
        characteristics: characteristics.len(),
        ..MergeStats::default()
    };
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let mut rows = Vec::with_capacity(characteristics.len());

    for raw in characteristics {
        if !seen.insert(raw.accident_id.as_str()) {
            stats.duplicate_ids += 1;
            continue;
        }

        let latitude = parse_coordinate(raw.latitude.as_deref());
        let longitude = parse_coordinate(raw.longitude.as_deref());
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            stats.missing_coordinates += 1;
            continue;
        };

        let agglomeration_code = parse_code(raw.agglomeration.as_deref());
        let lighting_code = parse_code(raw.lighting.as_deref());

        let surface_code = match surfaces.get(raw.accident_id.as_str()) {
            Some(code) => *code,
            None => {
                stats.without_location += 1;
                None
            }
        };

        let (severity_code, severity_label, victim_count) =
            match severities.get(&raw.accident_id) {
                Some(resolved) => (resolved.code, resolved.label.clone(), resolved.victim_count),
                None => {
                    stats.without_casualties += 1;
                    (None, UNKNOWN_SEVERITY.to_owned(), 0)
                }
            };

        rows.push(CleanedAccident {
            accident_id: raw.accident_id.clone(),
            date: parse_date(
                raw.year.as_deref(),
                raw.month.as_deref(),
                raw.day.as_deref(),
            ),
            hour: parse_hour(raw.time.as_deref()),
            agglomeration_code,
            agglomeration_label: mappings.agglomeration.label(agglomeration_code).to_owned(),
            latitude,
            longitude,
            surface_code,
            surface_label: mappings.surface.label(surface_code).to_owned(),
            lighting_code,
            lighting_label: mappings.lighting.label(lighting_code).to_owned(),
            lighting_group: LightingGroup::from_code(lighting_code),
            severity_code,
            severity_label,
            victim_count,
        });
    }

    stats.retained = rows.len();

    MergeOutput {
        table: CleanedTable::new(rows),
        stats,
    }
}

#[cfg(test)]
mod tests {
    use road_safety_accident_models::NOT_SPECIFIED;
    use road_safety_config::CodeMapping;

    use super::*;

    fn mappings() -> CategoryMappings {
        CategoryMappings {
            agglomeration: [(1, "Hors agglomeration".to_string()), (2, "En agglomeration".to_string())]
                .into_iter()
                .collect(),
            lighting: [(1, "Plein jour".to_string()), (5, "Nuit avec eclairage public allume".to_string())]
                .into_iter()
                .collect(),
            surface: [(1, "Normale".to_string()), (2, "Mouillee".to_string())]
                .into_iter()
                .collect::<CodeMapping>(),
        }
    }

    fn characteristic(id: &str, lat: Option<&str>, lng: Option<&str>) -> RawCharacteristic {
        RawCharacteristic {
            accident_id: id.to_string(),
            year: Some("2022".to_string()),
            month: Some("6".to_string()),
            day: Some("1".to_string()),
            time: Some("1745".to_string()),
            agglomeration: Some("2".to_string()),
            lighting: Some("5".to_string()),
            latitude: lat.map(str::to_string),
            longitude: lng.map(str::to_string),
        }
    }

    fn resolved(code: i64, label: &str, victim_count: u32) -> ResolvedSeverity {
        ResolvedSeverity {
            code: Some(code),
            label: label.to_string(),
            victim_count,
        }
    }

    #[test]
    fn derives_fields_from_characteristics() {
        let output = merge_sources(
            &[characteristic("1", Some("43,6"), Some("1,44"))],
            &[],
            &BTreeMap::new(),
            &mappings(),
        );
        let row = &output.table.rows()[0];
        assert_eq!(row.date, chrono::NaiveDate::from_ymd_opt(2022, 6, 1));
        assert_eq!(row.hour, Some(17));
        assert_eq!(row.agglomeration_label, "En agglomeration");
        assert_eq!(row.lighting_label, "Nuit avec eclairage public allume");
        assert_eq!(row.lighting_group, LightingGroup::PublicLighting);
        assert!((row.longitude - 1.44).abs() < f64::EPSILON);
    }

    #[test]
    fn left_joins_default_missing_matches() {
        let output = merge_sources(
            &[characteristic("1", Some("48.1"), Some("2.1"))],
            &[],
            &BTreeMap::new(),
            &mappings(),
        );
        let row = &output.table.rows()[0];
        assert_eq!(row.surface_code, None);
        assert_eq!(row.surface_label, NOT_SPECIFIED);
        assert_eq!(row.severity_code, None);
        assert_eq!(row.severity_label, UNKNOWN_SEVERITY);
        assert_eq!(row.victim_count, 0);
        assert_eq!(output.stats.without_location, 1);
        assert_eq!(output.stats.without_casualties, 1);
    }

    #[test]
    fn drops_rows_without_both_coordinates() {
        let output = merge_sources(
            &[
                characteristic("1", Some("48.1"), None),
                characteristic("2", Some("-1"), Some("2.0")),
                characteristic("3", Some("48.1"), Some("2.0")),
            ],
            &[],
            &BTreeMap::new(),
            &mappings(),
        );
        assert_eq!(output.table.len(), 1);
        assert_eq!(output.table.rows()[0].accident_id, "3");
        assert_eq!(output.stats.missing_coordinates, 2);
        assert_eq!(output.stats.retained, 1);
    }

    #[test]
    fn first_occurrence_wins_for_duplicates() {
        let locations = vec![
            RawLocation {
                accident_id: "1".to_string(),
                surface: Some("2".to_string()),
            },
            RawLocation {
                accident_id: "1".to_string(),
                surface: Some("1".to_string()),
            },
        ];
        let mut severities = BTreeMap::new();
        severities.insert("1".to_string(), resolved(2, "Tue", 3));

        let output = merge_sources(
            &[
                characteristic("1", Some("48.1"), Some("2.1")),
                characteristic("1", Some("45.0"), Some("4.0")),
            ],
            &locations,
            &severities,
            &mappings(),
        );
        assert_eq!(output.table.len(), 1);
        let row = &output.table.rows()[0];
        assert!((row.latitude - 48.1).abs() < f64::EPSILON);
        assert_eq!(row.surface_label, "Mouillee");
        assert_eq!(row.severity_label, "Tue");
        assert_eq!(row.victim_count, 3);
        assert_eq!(output.stats.duplicate_ids, 1);
    }

    #[test]
    fn empty_after_filter_is_valid() {
        let output = merge_sources(
            &[characteristic("1", None, None)],
            &[],
            &BTreeMap::new(),
            &mappings(),
        );
        assert!(output.table.is_empty());
        assert_eq!(output.stats.retained, 0);
    }
}

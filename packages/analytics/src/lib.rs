#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filtering and aggregation over the cleaned accident table.
//!
//! These are the queries behind the dashboard views: filter once with
//! [`filter`], then aggregate the matching rows. Counts are ordered by
//! descending count with ties broken by ascending label, so output is
//! stable across runs.

use std::collections::BTreeMap;

use road_safety_accident_models::{CleanedAccident, CleanedTable, LightingGroup};
use road_safety_analytics_models::{
    AccidentFilter, AccidentSummary, CategoryCount, DateBounds, GeoPoint, HourCount,
    LightingGroupCount, SeverityZoneCount,
};

/// Whether `row` satisfies every constraint of `filter`.
#[must_use]
pub fn matches(filter: &AccidentFilter, row: &CleanedAccident) -> bool {
    let in_range = filter
        .date_range
        .is_none_or(|range| row.date.is_some_and(|date| range.contains(date)));

    in_range
        && accepts(filter.severities.as_deref(), &row.severity_label)
        && accepts(filter.agglomerations.as_deref(), &row.agglomeration_label)
        && accepts(filter.surfaces.as_deref(), &row.surface_label)
        && accepts(filter.lighting_groups.as_deref(), &row.lighting_group)
}

fn accepts<T: PartialEq + ?Sized, U>(allowed: Option<&[U]>, value: &T) -> bool
where
    U: std::borrow::Borrow<T>,
{
    match allowed {
        None | Some([]) => true,
        Some(allowed) => allowed.iter().any(|candidate| candidate.borrow() == value),
    }
}

/// Returns the rows of `table` matching `filter`, in table order.
#[must_use]
pub fn filter<'a>(table: &'a CleanedTable, filter: &AccidentFilter) -> Vec<&'a CleanedAccident> {
    let rows: Vec<_> = table.iter().filter(|row| matches(filter, row)).collect();
    log::debug!("Filter kept {} of {} accidents", rows.len(), table.len());
    rows
}

/// Earliest and latest dates among `rows`, ignoring rows without a date.
#[must_use]
pub fn date_bounds(rows: &[&CleanedAccident]) -> Option<DateBounds> {
    let mut dates = rows.iter().filter_map(|row| row.date);
    let first = dates.next()?;
    let (min, max) = dates.fold((first, first), |(min, max), date| {
        (min.min(date), max.max(date))
    });
    Some(DateBounds { min, max })
}

fn sorted_desc<K: Ord>(counts: BTreeMap<K, u64>) -> Vec<(K, u64)> {
    let mut counts: Vec<(K, u64)> = counts.into_iter().collect();
    // BTreeMap order is the tie-break; the sort is stable.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Accident counts per (severity, zone) pair.
#[must_use]
pub fn severity_by_zone(rows: &[&CleanedAccident]) -> Vec<SeverityZoneCount> {
    let mut counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for row in rows {
        *counts
            .entry((&row.severity_label, &row.agglomeration_label))
            .or_default() += 1;
    }

    sorted_desc(counts)
        .into_iter()
        .map(|((severity, zone), count)| SeverityZoneCount {
            severity: severity.to_owned(),
            zone: zone.to_owned(),
            count,
        })
        .collect()
}

/// Accident counts per road-surface label.
#[must_use]
pub fn surface_counts(rows: &[&CleanedAccident]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for row in rows {
        *counts.entry(&row.surface_label).or_default() += 1;
    }

    sorted_desc(counts)
        .into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_owned(),
            count,
        })
        .collect()
}

/// Accident counts per hour of day, ascending. Rows without an hour are
/// skipped and hours with no accidents are omitted.
#[must_use]
pub fn hourly_counts(rows: &[&CleanedAccident]) -> Vec<HourCount> {
    let mut counts: BTreeMap<u8, u64> = BTreeMap::new();
    for hour in rows.iter().filter_map(|row| row.hour) {
        *counts.entry(hour).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|(hour, count)| HourCount { hour, count })
        .collect()
}

/// Accident counts per lighting group.
#[must_use]
pub fn lighting_group_counts(rows: &[&CleanedAccident]) -> Vec<LightingGroupCount> {
    let mut counts: BTreeMap<&str, (LightingGroup, u64)> = BTreeMap::new();
    for row in rows {
        counts
            .entry(row.lighting_group.as_ref())
            .or_insert((row.lighting_group, 0))
            .1 += 1;
    }

    let mut counts: Vec<LightingGroupCount> = counts
        .into_values()
        .map(|(group, count)| LightingGroupCount { group, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Coordinates of every row, for density maps.
#[must_use]
pub fn coordinates(rows: &[&CleanedAccident]) -> Vec<GeoPoint> {
    rows.iter()
        .map(|row| GeoPoint {
            latitude: row.latitude,
            longitude: row.longitude,
        })
        .collect()
}

/// Filters `table` and computes every aggregate over the matching rows.
#[must_use]
pub fn summarize(table: &CleanedTable, accident_filter: &AccidentFilter) -> AccidentSummary {
    let rows = filter(table, accident_filter);

    AccidentSummary {
        total: rows.len() as u64,
        victims: rows.iter().map(|row| u64::from(row.victim_count)).sum(),
        date_bounds: date_bounds(&rows),
        by_severity_zone: severity_by_zone(&rows),
        by_surface: surface_counts(&rows),
        by_hour: hourly_counts(&rows),
        by_lighting_group: lighting_group_counts(&rows),
    }
}

//! Plain-text rendering of CLI output.

use std::fmt::Write as _;
use std::path::Path;

use road_safety_accident_models::{LightingGroup, NOT_SPECIFIED, UNKNOWN_SEVERITY};
use road_safety_analytics_models::AccidentSummary;
use road_safety_clean::merge::MergeStats;
use road_safety_config::DatasetConfig;

/// Renders the summary as aligned text sections.
pub fn format_summary(summary: &AccidentSummary) -> String {
    let mut out = String::new();

    writeln!(out, "Accidents: {}", summary.total).unwrap();
    writeln!(out, "Victims:   {}", summary.victims).unwrap();
    if let Some(bounds) = summary.date_bounds {
        writeln!(out, "Period:    {} to {}", bounds.min, bounds.max).unwrap();
    }

    writeln!(out, "\nSeverity by zone").unwrap();
    for row in &summary.by_severity_zone {
        writeln!(out, "  {:<22} {:<22} {:>8}", row.severity, row.zone, row.count).unwrap();
    }

    writeln!(out, "\nRoad surface").unwrap();
    for row in &summary.by_surface {
        writeln!(out, "  {:<45} {:>8}", row.label, row.count).unwrap();
    }

    writeln!(out, "\nHour of day").unwrap();
    for row in &summary.by_hour {
        writeln!(out, "  {:02}h {:>8}", row.hour, row.count).unwrap();
    }

    writeln!(out, "\nLighting").unwrap();
    for row in &summary.by_lighting_group {
        writeln!(out, "  {:<45} {:>8}", row.group.as_ref(), row.count).unwrap();
    }

    out
}

/// Renders the counts of one pipeline run.
pub fn format_stats(stats: &MergeStats, cleaned_file: &Path) -> String {
    let mut out = String::new();

    writeln!(
        out,
        "Cleaned {} of {} accidents into {}",
        stats.retained,
        stats.characteristics,
        cleaned_file.display()
    )
    .unwrap();
    writeln!(out, "  without coordinates (dropped): {:>8}", stats.missing_coordinates).unwrap();
    writeln!(out, "  duplicate ids (skipped):       {:>8}", stats.duplicate_ids).unwrap();
    writeln!(out, "  without location row:          {:>8}", stats.without_location).unwrap();
    writeln!(out, "  without casualty rows:         {:>8}", stats.without_casualties).unwrap();

    out
}

/// Lists the label values accepted by the `summary` filters.
pub fn format_labels(config: &DatasetConfig) -> String {
    let mut out = String::new();

    writeln!(out, "Severities (--severity), worst first").unwrap();
    for label in config.severity.labels_by_rank() {
        writeln!(out, "  {label}").unwrap();
    }
    writeln!(out, "  {UNKNOWN_SEVERITY}").unwrap();

    let sections = [
        ("Zones (--zone)", &config.mappings.agglomeration),
        ("Road surfaces (--surface)", &config.mappings.surface),
    ];
    for (title, mapping) in sections {
        writeln!(out, "\n{title}").unwrap();
        for label in mapping.labels() {
            writeln!(out, "  {label}").unwrap();
        }
        writeln!(out, "  {NOT_SPECIFIED}").unwrap();
    }

    writeln!(out, "\nLighting groups (--lighting)").unwrap();
    for group in LightingGroup::all() {
        writeln!(out, "  {group}").unwrap();
    }

    out
}

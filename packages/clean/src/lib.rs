#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Road-accident data reconciliation pipeline.
//!
//! Joins the three raw annual files (characteristics, locations,
//! casualties) into one [`CleanedTable`] with a row per locatable accident,
//! persists it, and serves it through a [`cache::DatasetCache`].
//!
//! ```text
//! raw files -> parsing -> severity (casualties) -> merge -> store -> cache
//! ```

pub mod cache;
pub mod merge;
pub mod parsing;
pub mod provider;
pub mod raw;
pub mod severity;
pub mod store;

#[cfg(test)]
mod fixtures;

use std::path::PathBuf;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use road_safety_accident_models::CleanedTable;
use road_safety_config::{DatasetConfig, default_config};
use strum_macros::Display;

use crate::cache::DatasetCache;
use crate::merge::{MergeOutput, MergeStats, merge_sources};
use crate::provider::RawFiles;
use crate::severity::resolve_severities;

/// Errors that abort a pipeline run.
///
/// Dirty cell values never produce one of these; only structural problems
/// with the files themselves do.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    /// A raw file is absent.
    #[error("{kind} file not found: {}", .path.display())]
    MissingRawFile {
        /// Which raw source is missing.
        kind: RawSource,
        /// Where it was expected.
        path: PathBuf,
    },

    /// A raw file lacks a required column.
    #[error("{kind} file {} is missing expected column '{column}'", .path.display())]
    MissingColumn {
        /// Which raw source is malformed.
        kind: RawSource,
        /// The file that was read.
        path: PathBuf,
        /// The column (or first candidate column) that was not found.
        column: String,
    },

    /// A raw file could not be read as delimited text.
    #[error("failed to read {kind} file {}: {error}", .path.display())]
    ReadRaw {
        /// Which raw source failed.
        kind: RawSource,
        /// The file that was read.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        error: csv::Error,
    },

    /// The cleaned table could not be written.
    #[error("failed to write cleaned table {}: {error}", .path.display())]
    WriteCleaned {
        /// Destination path.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        error: csv::Error,
    },

    /// The persisted cleaned table could not be read back.
    #[error("failed to read cleaned table {}: {error}", .path.display())]
    ReadCleaned {
        /// Source path.
        path: PathBuf,
        /// Underlying CSV error.
        #[source]
        error: csv::Error,
    },

    /// Filesystem error (directory creation, rename).
    #[error("I/O error on {}: {error}", .path.display())]
    Io {
        /// Path being operated on.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        error: std::io::Error,
    },
}

/// The three raw sources of an annual release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RawSource {
    /// One row per accident: date, time, context, coordinates.
    Characteristics,
    /// Road attributes, keyed by accident.
    Locations,
    /// One row per person involved.
    Casualties,
}

/// Runs the raw pipeline over already-retrieved files: reads the three
/// sources, resolves per-accident severity and merges everything into the
/// cleaned table. Nothing is persisted.
///
/// # Errors
///
/// Returns [`CleanError`] if a file cannot be read or lacks a required
/// column.
pub fn run_pipeline(config: &DatasetConfig, files: &RawFiles) -> Result<MergeOutput, CleanError> {
    let start = Instant::now();
    let delimiter = config.delimiter();

    let characteristics = raw::read_characteristics(&files.characteristics, delimiter)?;
    let locations = raw::read_locations(&files.locations, delimiter)?;
    let casualties = raw::read_casualties(&files.casualties, delimiter)?;
    log::info!(
        "Read {} characteristics, {} locations, {} casualties",
        characteristics.len(),
        locations.len(),
        casualties.len()
    );

    let severities = resolve_severities(&casualties, &config.severity);
    let output = merge_sources(&characteristics, &locations, &severities, &config.mappings);

    let stats = &output.stats;
    log::info!(
        "Cleaned {} accidents in {:.1}s ({} without coordinates, {} duplicate ids, {} without location, {} without casualties)",
        stats.retained,
        start.elapsed().as_secs_f64(),
        stats.missing_coordinates,
        stats.duplicate_ids,
        stats.without_location,
        stats.without_casualties,
    );

    Ok(output)
}

static DEFAULT_CACHE: LazyLock<DatasetCache> =
    LazyLock::new(|| DatasetCache::from_config(default_config().clone()));

/// Runs the full pipeline from the raw files of the default dataset,
/// persists the result and returns it. Always recomputes; `force` is
/// passed on to the raw-data provider.
///
/// # Errors
///
/// Returns [`CleanError`] if the raw files are missing or malformed, or if
/// the cleaned table cannot be written.
pub fn clean_data(force: bool) -> Result<Arc<CleanedTable>, CleanError> {
    DEFAULT_CACHE.clean(force)
}

/// Same as [`clean_data`], also returning the counts of rows dropped or
/// defaulted by the merge.
///
/// # Errors
///
/// Returns [`CleanError`] if the raw files are missing or malformed, or if
/// the cleaned table cannot be written.
pub fn clean_data_with_stats(force: bool) -> Result<(Arc<CleanedTable>, MergeStats), CleanError> {
    DEFAULT_CACHE.clean_with_stats(force)
}

/// Returns the cleaned table of the default dataset, reading the persisted
/// copy when one exists and running [`clean_data`] otherwise. The result
/// is kept in memory for the lifetime of the process.
///
/// # Errors
///
/// Returns [`CleanError`] if neither the persisted table nor the raw files
/// can be read.
pub fn load_clean_data() -> Result<Arc<CleanedTable>, CleanError> {
    DEFAULT_CACHE.load(false)
}

#[cfg(test)]
mod tests {
    use road_safety_accident_models::{NOT_SPECIFIED, UNKNOWN_SEVERITY};

    use super::*;
    use crate::fixtures::{self, test_config};

    #[test]
    fn end_to_end_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let files = fixtures::write_scenario(&config);

        let output = run_pipeline(&config, &files).unwrap();
        let table = output.table;

        let mut ids: Vec<&str> = table.iter().map(|r| r.accident_id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["1", "2"]);

        let first = table.get("1").unwrap();
        assert_eq!(first.severity_code, Some(2));
        assert_eq!(first.severity_label, "Tue");
        assert_eq!(first.victim_count, 2);
        assert_eq!(first.surface_code, Some(2));
        assert_eq!(first.surface_label, "Mouillee");
        assert_eq!(first.hour, Some(8));
        assert!((first.latitude - 48.85).abs() < f64::EPSILON);

        let second = table.get("2").unwrap();
        assert_eq!(second.severity_code, Some(4));
        assert_eq!(second.severity_label, "Blesse leger");
        assert_eq!(second.victim_count, 1);
        assert_eq!(second.surface_code, None);
        assert_eq!(second.surface_label, NOT_SPECIFIED);

        assert!(table.get("3").is_none());
        assert_eq!(output.stats.missing_coordinates, 1);
    }

    #[test]
    fn labels_are_always_populated() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let files = fixtures::write_dirty(&config);

        let table = run_pipeline(&config, &files).unwrap().table;
        assert!(!table.is_empty());
        for row in &table {
            assert!(!row.agglomeration_label.is_empty());
            assert!(!row.lighting_label.is_empty());
            assert!(!row.surface_label.is_empty());
            assert!(!row.severity_label.is_empty());
            assert!(row.latitude.is_finite() && row.longitude.is_finite());
        }

        let orphan = table.get("20").unwrap();
        assert_eq!(orphan.severity_code, None);
        assert_eq!(orphan.severity_label, UNKNOWN_SEVERITY);
        assert_eq!(orphan.victim_count, 0);
        assert_eq!(orphan.agglomeration_label, NOT_SPECIFIED);
        assert_eq!(orphan.lighting_label, NOT_SPECIFIED);
    }

    #[test]
    fn accident_ids_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let files = fixtures::write_dirty(&config);

        let output = run_pipeline(&config, &files).unwrap();
        let mut ids: Vec<&str> = output
            .table
            .iter()
            .map(|r| r.accident_id.as_str())
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
        assert_eq!(output.stats.duplicate_ids, 1);
    }

    #[test]
    fn missing_column_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let files = fixtures::write_scenario(&config);
        std::fs::write(&files.casualties, "\"Num_Acc\";\"id_usager\"\n\"1\";\"a\"\n").unwrap();

        let err = run_pipeline(&config, &files).unwrap_err();
        assert!(
            matches!(
                err,
                CleanError::MissingColumn {
                    kind: RawSource::Casualties,
                    ..
                }
            ),
            "{err}"
        );
        assert!(err.to_string().contains("grav"));
    }

    #[test]
    fn same_inputs_give_same_table() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        let files = fixtures::write_dirty(&config);

        let first = run_pipeline(&config, &files).unwrap().table;
        let second = run_pipeline(&config, &files).unwrap().table;
        assert_eq!(first, second);
    }
}

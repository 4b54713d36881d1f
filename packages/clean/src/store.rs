//! Persistence of the cleaned table as a flat comma-separated file.
//!
//! Dates are written as `YYYY-MM-DD` and missing values as empty cells.
//! Writes go to a `.tmp` sibling first and are renamed into place, so a
//! reader never sees a truncated table.

use std::path::{Path, PathBuf};

use road_safety_accident_models::{CleanedAccident, CleanedTable};

use crate::CleanError;

/// Persisted column order. Matches the serialized field names of
/// [`CleanedAccident`].
pub const COLUMNS: [&str; 15] = [
    "accident_id",
    "date",
    "hour",
    "agg",
    "agg_label",
    "lat",
    "long",
    "surf",
    "surface_label",
    "lum",
    "lighting_label",
    "lighting_group",
    "severity_code",
    "severity_label",
    "victim_count",
];

/// Writes the table to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`CleanError`] if a directory cannot be created or the file
/// cannot be written or renamed into place.
pub fn write_table(table: &CleanedTable, path: &Path) -> Result<(), CleanError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|error| CleanError::Io {
            path: parent.to_path_buf(),
            error,
        })?;
    }

    let tmp_path = tmp_path_for(path);
    if let Err(e) = write_rows(table, &tmp_path) {
        discard_tmp(&tmp_path);
        return Err(e);
    }

    std::fs::rename(&tmp_path, path).map_err(|error| CleanError::Io {
        path: path.to_path_buf(),
        error,
    })?;

    log::info!("Wrote {} cleaned accidents to {}", table.len(), path.display());
    Ok(())
}

/// Removes a partially written temp file, if any.
fn discard_tmp(tmp_path: &Path) {
    if !tmp_path.is_file() {
        return;
    }
    if let Err(e) = std::fs::remove_file(tmp_path) {
        log::warn!("Could not remove {}: {e}", tmp_path.display());
    }
}

fn write_rows(table: &CleanedTable, tmp_path: &Path) -> Result<(), CleanError> {
    let write_error = |error| CleanError::WriteCleaned {
        path: tmp_path.to_path_buf(),
        error,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(tmp_path)
        .map_err(write_error)?;
    writer.write_record(COLUMNS).map_err(write_error)?;
    for row in table {
        writer.serialize(row).map_err(write_error)?;
    }
    writer.flush().map_err(|error| CleanError::Io {
        path: tmp_path.to_path_buf(),
        error,
    })
}

/// Reads a table previously written by [`write_table`].
///
/// # Errors
///
/// Returns [`CleanError::ReadCleaned`] if the file cannot be opened or a
/// row does not match the persisted columns.
pub fn read_table(path: &Path) -> Result<CleanedTable, CleanError> {
    let read_error = |error| CleanError::ReadCleaned {
        path: path.to_path_buf(),
        error,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_error)?;
    let rows = reader
        .deserialize::<CleanedAccident>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(read_error)?;

    log::info!("Loaded {} cleaned accidents from {}", rows.len(), path.display());
    Ok(CleanedTable::new(rows))
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

//! Readers for the three raw delimited files.
//!
//! Cells are kept as text; typing happens in [`crate::parsing`]. Invalid
//! UTF-8 is replaced rather than rejected, and rows without an accident id
//! are skipped. A missing file or column is fatal.

use std::fs::File;
use std::path::{Path, PathBuf};

use road_safety_accident_models::{RawCasualty, RawCharacteristic, RawLocation};

use crate::{CleanError, RawSource};

/// Accident id column of the characteristics file. Recent releases renamed
/// `Num_Acc` to `Accident_Id`; the first one present is used.
const CHARACTERISTICS_ID: &[&str] = &["Accident_Id", "Num_Acc"];

/// Accident id column of the locations and casualties files.
const ACCIDENT_ID: &[&str] = &["Num_Acc"];

/// Header names of a raw file, with the context needed for error messages.
struct Headers<'a> {
    kind: RawSource,
    path: &'a Path,
    names: Vec<String>,
}

impl Headers<'_> {
    /// Returns the index of the first candidate column present.
    fn require(&self, candidates: &[&str]) -> Result<usize, CleanError> {
        candidates
            .iter()
            .find_map(|candidate| self.names.iter().position(|name| name == candidate))
            .ok_or_else(|| CleanError::MissingColumn {
                kind: self.kind,
                path: self.path.to_path_buf(),
                column: candidates.first().copied().unwrap_or_default().to_string(),
            })
    }
}

/// A raw file opened for reading, headers already consumed.
struct RawReader<'a> {
    reader: csv::Reader<File>,
    headers: Headers<'a>,
}

impl<'a> RawReader<'a> {
    fn open(kind: RawSource, path: &'a Path, delimiter: u8) -> Result<Self, CleanError> {
        if !path.is_file() {
            return Err(CleanError::MissingRawFile {
                kind,
                path: path.to_path_buf(),
            });
        }

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path)
            .map_err(|error| read_error(kind, path, error))?;

        let names = reader
            .byte_headers()
            .map_err(|error| read_error(kind, path, error))?
            .iter()
            .map(|h| {
                String::from_utf8_lossy(h)
                    .trim_start_matches('\u{feff}')
                    .trim()
                    .to_owned()
            })
            .collect();

        Ok(Self {
            reader,
            headers: Headers { kind, path, names },
        })
    }

    /// Visits every row that carries an accident id in column `id_index`.
    fn for_each_row(
        mut self,
        id_index: usize,
        mut f: impl FnMut(String, &csv::ByteRecord),
    ) -> Result<(), CleanError> {
        let Headers { kind, path, .. } = self.headers;
        let mut record = csv::ByteRecord::new();
        let mut skipped = 0_usize;

        while self
            .reader
            .read_byte_record(&mut record)
            .map_err(|error| read_error(kind, path, error))?
        {
            match cell(&record, id_index) {
                Some(id) => f(id, &record),
                None => skipped += 1,
            }
        }

        if skipped > 0 {
            log::warn!("{kind}: skipped {skipped} rows without an accident id");
        }
        Ok(())
    }
}

fn read_error(kind: RawSource, path: &Path, error: csv::Error) -> CleanError {
    CleanError::ReadRaw {
        kind,
        path: PathBuf::from(path),
        error,
    }
}

/// Returns a trimmed cell, `None` when absent or blank.
fn cell(record: &csv::ByteRecord, index: usize) -> Option<String> {
    let raw = record.get(index)?;
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_owned())
}

/// Reads the characteristics file.
///
/// # Errors
///
/// Returns [`CleanError`] if the file is missing, unreadable, or lacks one
/// of the id, date, time, agglomeration, lighting or coordinate columns.
pub fn read_characteristics(
    path: &Path,
    delimiter: u8,
) -> Result<Vec<RawCharacteristic>, CleanError> {
    let reader = RawReader::open(RawSource::Characteristics, path, delimiter)?;
    let headers = &reader.headers;
    let id = headers.require(CHARACTERISTICS_ID)?;
    let year = headers.require(&["an"])?;
    let month = headers.require(&["mois"])?;
    let day = headers.require(&["jour"])?;
    let time = headers.require(&["hrmn"])?;
    let agglomeration = headers.require(&["agg"])?;
    let lighting = headers.require(&["lum"])?;
    let latitude = headers.require(&["lat"])?;
    let longitude = headers.require(&["long"])?;

    let mut rows = Vec::new();
    reader.for_each_row(id, |accident_id, record| {
        rows.push(RawCharacteristic {
            accident_id,
            year: cell(record, year),
            month: cell(record, month),
            day: cell(record, day),
            time: cell(record, time),
            agglomeration: cell(record, agglomeration),
            lighting: cell(record, lighting),
            latitude: cell(record, latitude),
            longitude: cell(record, longitude),
        });
    })?;
    Ok(rows)
}

/// Reads the locations file.
///
/// # Errors
///
/// Returns [`CleanError`] if the file is missing, unreadable, or lacks the
/// `Num_Acc` or `surf` column.
pub fn read_locations(path: &Path, delimiter: u8) -> Result<Vec<RawLocation>, CleanError> {
    let reader = RawReader::open(RawSource::Locations, path, delimiter)?;
    let id = reader.headers.require(ACCIDENT_ID)?;
    let surface = reader.headers.require(&["surf"])?;

    let mut rows = Vec::new();
    reader.for_each_row(id, |accident_id, record| {
        rows.push(RawLocation {
            accident_id,
            surface: cell(record, surface),
        });
    })?;
    Ok(rows)
}

/// Reads the casualties file.
///
/// # Errors
///
/// Returns [`CleanError`] if the file is missing, unreadable, or lacks the
/// `Num_Acc` or `grav` column.
pub fn read_casualties(path: &Path, delimiter: u8) -> Result<Vec<RawCasualty>, CleanError> {
    let reader = RawReader::open(RawSource::Casualties, path, delimiter)?;
    let id = reader.headers.require(ACCIDENT_ID)?;
    let severity = reader.headers.require(&["grav"])?;

    let mut rows = Vec::new();
    reader.for_each_row(id, |accident_id, record| {
        rows.push(RawCasualty {
            accident_id,
            severity: cell(record, severity),
        });
    })?;
    Ok(rows)
}

//! Retrieval of the raw files.
//!
//! Downloading the annual release is outside this crate; the pipeline only
//! asks a [`RawDataProvider`] for the paths of the three files.

use std::path::{Path, PathBuf};

use road_safety_config::{DatasetConfig, RawFileNames};

use crate::{CleanError, RawSource};

/// Paths of the three raw files of one release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFiles {
    /// Characteristics file.
    pub characteristics: PathBuf,
    /// Locations file.
    pub locations: PathBuf,
    /// Casualties file.
    pub casualties: PathBuf,
}

impl RawFiles {
    /// Returns the path of one source.
    #[must_use]
    pub fn path(&self, kind: RawSource) -> &Path {
        match kind {
            RawSource::Characteristics => &self.characteristics,
            RawSource::Locations => &self.locations,
            RawSource::Casualties => &self.casualties,
        }
    }
}

/// Supplies the raw files to the pipeline.
pub trait RawDataProvider: Send + Sync {
    /// Makes the three raw files available and returns their paths.
    ///
    /// `force` asks the provider to re-acquire files it already holds.
    ///
    /// # Errors
    ///
    /// Returns [`CleanError`] if any of the files cannot be made available.
    fn fetch(&self, force: bool) -> Result<RawFiles, CleanError>;
}

/// Provider for files already present in a local directory.
#[derive(Debug, Clone)]
pub struct LocalDirectory {
    dir: PathBuf,
    names: RawFileNames,
}

impl LocalDirectory {
    /// Creates a provider looking for `names` under `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, names: RawFileNames) -> Self {
        Self {
            dir: dir.into(),
            names,
        }
    }

    /// Creates a provider for the raw directory of a dataset.
    #[must_use]
    pub fn from_config(config: &DatasetConfig) -> Self {
        Self::new(config.raw_dir(), config.raw_files.clone())
    }
}

impl RawDataProvider for LocalDirectory {
    fn fetch(&self, force: bool) -> Result<RawFiles, CleanError> {
        if force {
            log::debug!(
                "Forced refresh requested; using local files in {}",
                self.dir.display()
            );
        }

        let files = RawFiles {
            characteristics: self.dir.join(&self.names.characteristics),
            locations: self.dir.join(&self.names.locations),
            casualties: self.dir.join(&self.names.casualties),
        };

        for kind in [
            RawSource::Characteristics,
            RawSource::Locations,
            RawSource::Casualties,
        ] {
            let path = files.path(kind);
            if !path.is_file() {
                return Err(CleanError::MissingRawFile {
                    kind,
                    path: path.to_path_buf(),
                });
            }
        }

        Ok(files)
    }
}

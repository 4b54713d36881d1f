//! Process-wide access to the cleaned table.
//!
//! A [`DatasetCache`] owns a dataset configuration and a raw-data provider.
//! The first successful load is memoized and shared as an `Arc`, so repeated
//! callers never re-read or re-merge the files.

use std::sync::{Arc, Mutex, PoisonError};

use road_safety_accident_models::CleanedTable;
use road_safety_config::DatasetConfig;

use crate::merge::MergeStats;
use crate::provider::{LocalDirectory, RawDataProvider};
use crate::{CleanError, run_pipeline, store};

/// Memoized loader for one dataset.
pub struct DatasetCache {
    config: DatasetConfig,
    provider: Box<dyn RawDataProvider>,
    memo: Mutex<Option<Arc<CleanedTable>>>,
}

impl std::fmt::Debug for DatasetCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetCache")
            .field("dataset", &self.config.id)
            .field("cleaned_file", &self.config.cleaned_file())
            .finish_non_exhaustive()
    }
}

impl DatasetCache {
    /// Creates a cache reading raw files through `provider`.
    #[must_use]
    pub fn new(config: DatasetConfig, provider: Box<dyn RawDataProvider>) -> Self {
        Self {
            config,
            provider,
            memo: Mutex::new(None),
        }
    }

    /// Creates a cache reading raw files from the dataset's raw directory.
    #[must_use]
    pub fn from_config(config: DatasetConfig) -> Self {
        let provider = LocalDirectory::from_config(&config);
        Self::new(config, Box::new(provider))
    }

    /// The dataset this cache serves.
    #[must_use]
    pub const fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Rebuilds the cleaned table from the raw files, persists it and
    /// replaces the memoized copy.
    ///
    /// # Errors
    ///
    /// Returns [`CleanError`] if the raw files cannot be fetched or read, or
    /// if the table cannot be written.
    pub fn clean(&self, force: bool) -> Result<Arc<CleanedTable>, CleanError> {
        self.clean_with_stats(force).map(|(table, _)| table)
    }

    /// Same as [`Self::clean`], also returning the merge counts.
    ///
    /// # Errors
    ///
    /// Returns [`CleanError`] if the raw files cannot be fetched or read, or
    /// if the table cannot be written.
    pub fn clean_with_stats(
        &self,
        force: bool,
    ) -> Result<(Arc<CleanedTable>, MergeStats), CleanError> {
        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        let (table, stats) = self.rebuild(force)?;
        *memo = Some(Arc::clone(&table));
        Ok((table, stats))
    }

    /// Returns the cleaned table.
    ///
    /// Resolution order: the memoized copy, then the persisted file, then a
    /// full rebuild. `force` skips the first two.
    ///
    /// # Errors
    ///
    /// Returns [`CleanError`] if the persisted file is unreadable, or if a
    /// rebuild is needed and fails.
    pub fn load(&self, force: bool) -> Result<Arc<CleanedTable>, CleanError> {
        if force {
            return self.clean(true);
        }

        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = memo.as_ref() {
            log::trace!("Serving memoized cleaned table for {}", self.config.id);
            return Ok(Arc::clone(table));
        }

        let path = self.config.cleaned_file();
        let table = if path.is_file() {
            log::debug!("Reading persisted cleaned table {}", path.display());
            Arc::new(store::read_table(&path)?)
        } else {
            log::info!(
                "No cleaned table at {}; building it from raw files",
                path.display()
            );
            self.rebuild(false)?.0
        };

        *memo = Some(Arc::clone(&table));
        Ok(table)
    }

    fn rebuild(&self, force: bool) -> Result<(Arc<CleanedTable>, MergeStats), CleanError> {
        let files = self.provider.fetch(force)?;
        let output = run_pipeline(&self.config, &files)?;
        store::write_table(&output.table, &self.config.cleaned_file())?;
        Ok((Arc::new(output.table), output.stats))
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset configuration for the road-accident cleaning pipeline.
//!
//! The category mappings, the severity scale, the data directories and the
//! raw filenames are read from a TOML file baked into the binary with
//! [`include_str!`]. They are parsed once by [`default_config`] and never
//! mutated afterwards.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use road_safety_accident_models::{NOT_SPECIFIED, UNKNOWN_SEVERITY};
use serde::Deserialize;

/// Environment variable overriding [`PathConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "ROAD_SAFETY_DATA_DIR";

/// The dataset config embedded at compile time.
const DEFAULT_DATASET_TOML: &str = include_str!("../datasets/baac_2022.toml");

/// Errors raised while loading a dataset config.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A mapping key is not an integer code.
    #[error("invalid category code '{key}': expected an integer")]
    InvalidCode {
        /// The offending key.
        key: String,
    },

    /// A mapping entry has an empty label.
    #[error("empty label for code {code}")]
    EmptyLabel {
        /// The code whose label is empty.
        code: i64,
    },

    /// The raw-file delimiter is not a single ASCII character.
    #[error("delimiter {0:?} is not an ASCII character")]
    Delimiter(char),
}

/// A complete dataset definition.
#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Unique identifier (e.g., `"baac_2022"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Reference year of the annual files.
    pub year: i32,
    /// Where raw and cleaned files live.
    pub paths: PathConfig,
    /// Raw filenames and their field delimiter.
    pub raw_files: RawFileNames,
    /// Code-to-label tables for the categorical columns.
    pub mappings: CategoryMappings,
    /// Severity labels and ranks.
    pub severity: SeverityScale,
}

/// Directory layout. Subdirectories are resolved under `data_dir`.
#[derive(Debug, Clone, Deserialize)]
pub struct PathConfig {
    /// Base data directory.
    pub data_dir: PathBuf,
    /// Raw files directory, relative to `data_dir`.
    pub raw_subdir: String,
    /// Cleaned table directory, relative to `data_dir`.
    pub cleaned_subdir: String,
    /// Cleaned table filename.
    pub cleaned_file: String,
}

/// Filenames of the three raw sources.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFileNames {
    /// Accident characteristics (date, time, context, coordinates).
    pub characteristics: String,
    /// Location and road attributes.
    pub locations: String,
    /// Person-level casualty records.
    pub casualties: String,
    /// Field delimiter shared by all three files.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

const fn default_delimiter() -> char {
    ';'
}

/// The three categorical mappings of the characteristics and location
/// sources.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryMappings {
    /// Agglomeration code labels.
    pub agglomeration: CodeMapping,
    /// Lighting code labels.
    pub lighting: CodeMapping,
    /// Road-surface code labels.
    pub surface: CodeMapping,
}

/// A fixed mapping from a small integer code to a label.
///
/// Codes absent from the mapping, including a missing code, resolve to
/// [`NOT_SPECIFIED`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>")]
pub struct CodeMapping(BTreeMap<i64, String>);

impl CodeMapping {
    /// Returns the mapped label, if the code is present.
    #[must_use]
    pub fn get(&self, code: Option<i64>) -> Option<&str> {
        code.and_then(|c| self.0.get(&c)).map(String::as_str)
    }

    /// Returns the label for a code, falling back to [`NOT_SPECIFIED`].
    #[must_use]
    pub fn label(&self, code: Option<i64>) -> &str {
        self.get(code).unwrap_or(NOT_SPECIFIED)
    }

    /// Iterates over the configured labels in code order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }
}

impl TryFrom<BTreeMap<String, String>> for CodeMapping {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut mapping = BTreeMap::new();
        for (key, label) in raw {
            let code = parse_code_key(&key)?;
            if label.trim().is_empty() {
                return Err(ConfigError::EmptyLabel { code });
            }
            mapping.insert(code, label);
        }
        Ok(Self(mapping))
    }
}

impl FromIterator<(i64, String)> for CodeMapping {
    fn from_iter<T: IntoIterator<Item = (i64, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Label and rank of one severity code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeverityLevel {
    /// Human-readable label.
    pub label: String,
    /// Ordering used to pick an accident's worst outcome (higher is worse).
    pub rank: i32,
}

/// Severity labels and ranks keyed by severity code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "BTreeMap<String, SeverityLevel>")]
pub struct SeverityScale(BTreeMap<i64, SeverityLevel>);

impl SeverityScale {
    /// Rank assigned to codes absent from the scale. Lower than every
    /// configured rank so an unmapped code never beats a mapped one.
    pub const UNRANKED: i32 = -1;

    /// Returns the rank of a code, or [`Self::UNRANKED`].
    #[must_use]
    pub fn rank(&self, code: Option<i64>) -> i32 {
        code.and_then(|c| self.0.get(&c))
            .map_or(Self::UNRANKED, |level| level.rank)
    }

    /// Returns the label for a code, falling back to [`UNKNOWN_SEVERITY`].
    #[must_use]
    pub fn label(&self, code: Option<i64>) -> &str {
        code.and_then(|c| self.0.get(&c))
            .map_or(UNKNOWN_SEVERITY, |level| level.label.as_str())
    }

    /// Returns the configured labels, worst severity first.
    #[must_use]
    pub fn labels_by_rank(&self) -> Vec<&str> {
        let mut levels: Vec<&SeverityLevel> = self.0.values().collect();
        levels.sort_by(|a, b| b.rank.cmp(&a.rank).then_with(|| a.label.cmp(&b.label)));
        levels.into_iter().map(|level| level.label.as_str()).collect()
    }
}

impl TryFrom<BTreeMap<String, SeverityLevel>> for SeverityScale {
    type Error = ConfigError;

    fn try_from(raw: BTreeMap<String, SeverityLevel>) -> Result<Self, Self::Error> {
        let mut scale = BTreeMap::new();
        for (key, level) in raw {
            let code = parse_code_key(&key)?;
            if level.label.trim().is_empty() {
                return Err(ConfigError::EmptyLabel { code });
            }
            scale.insert(code, level);
        }
        Ok(Self(scale))
    }
}

impl FromIterator<(i64, SeverityLevel)> for SeverityScale {
    fn from_iter<T: IntoIterator<Item = (i64, SeverityLevel)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn parse_code_key(key: &str) -> Result<i64, ConfigError> {
    key.trim()
        .parse::<i64>()
        .map_err(|_| ConfigError::InvalidCode {
            key: key.to_string(),
        })
}

impl DatasetConfig {
    /// Directory holding the three raw files.
    #[must_use]
    pub fn raw_dir(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.raw_subdir)
    }

    /// Directory holding the cleaned table.
    #[must_use]
    pub fn cleaned_dir(&self) -> PathBuf {
        self.paths.data_dir.join(&self.paths.cleaned_subdir)
    }

    /// Full path of the persisted cleaned table.
    #[must_use]
    pub fn cleaned_file(&self) -> PathBuf {
        self.cleaned_dir().join(&self.paths.cleaned_file)
    }

    /// Raw field delimiter as a byte.
    #[must_use]
    pub fn delimiter(&self) -> u8 {
        // Checked to be ASCII in `parse_dataset_toml`.
        u8::try_from(self.raw_files.delimiter).unwrap_or(b';')
    }

    /// Returns a copy rooted at another data directory.
    #[must_use]
    pub fn with_data_dir(mut self, data_dir: impl AsRef<Path>) -> Self {
        self.paths.data_dir = data_dir.as_ref().to_path_buf();
        self
    }
}

/// Parses a [`DatasetConfig`] from a TOML string.
///
/// # Errors
///
/// Returns [`ConfigError`] if the TOML is malformed, a mapping key is not
/// an integer, a label is empty, or the delimiter is not ASCII.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetConfig, ConfigError> {
    let config: DatasetConfig = toml::de::from_str(toml_str)?;
    if !config.raw_files.delimiter.is_ascii() {
        return Err(ConfigError::Delimiter(config.raw_files.delimiter));
    }
    Ok(config)
}

static DEFAULT_CONFIG: LazyLock<DatasetConfig> = LazyLock::new(|| {
    let config = parse_dataset_toml(DEFAULT_DATASET_TOML)
        .unwrap_or_else(|e| panic!("Failed to parse baac_2022.toml: {e}"));
    match std::env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => {
            log::debug!("Using data directory {dir} from {DATA_DIR_ENV}");
            config.with_data_dir(dir)
        }
        _ => config,
    }
});

/// Returns the embedded dataset config, with the data directory taken from
/// [`DATA_DIR_ENV`] when set.
///
/// # Panics
///
/// Panics if the embedded TOML is malformed.
#[must_use]
pub fn default_config() -> &'static DatasetConfig {
    &DEFAULT_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_embedded_dataset() {
        let config = parse_dataset_toml(DEFAULT_DATASET_TOML).unwrap();
        assert_eq!(config.id, "baac_2022");
        assert_eq!(config.year, 2022);
        assert_eq!(config.delimiter(), b';');
        assert_eq!(config.raw_files.casualties, "usagers-2022.csv");
    }

    #[test]
    fn embedded_mappings_resolve_labels() {
        let config = parse_dataset_toml(DEFAULT_DATASET_TOML).unwrap();
        let mappings = &config.mappings;
        assert_eq!(mappings.agglomeration.label(Some(2)), "En agglomeration");
        assert_eq!(mappings.lighting.label(Some(5)), "Nuit avec eclairage public allume");
        assert_eq!(mappings.surface.label(Some(2)), "Mouillee");
        assert_eq!(mappings.surface.label(Some(-1)), NOT_SPECIFIED);
        assert_eq!(mappings.agglomeration.label(None), NOT_SPECIFIED);
    }

    #[test]
    fn severity_scale_ranks_fatal_highest() {
        let config = parse_dataset_toml(DEFAULT_DATASET_TOML).unwrap();
        let scale = &config.severity;
        assert!(scale.rank(Some(2)) > scale.rank(Some(3)));
        assert!(scale.rank(Some(3)) > scale.rank(Some(4)));
        assert!(scale.rank(Some(4)) > scale.rank(Some(1)));
        assert!(scale.rank(Some(1)) > scale.rank(Some(7)));
        assert_eq!(scale.rank(None), SeverityScale::UNRANKED);
        assert_eq!(scale.label(Some(2)), "Tue");
        assert_eq!(scale.label(Some(7)), UNKNOWN_SEVERITY);
        assert_eq!(
            scale.labels_by_rank(),
            vec!["Tue", "Blesse hospitalise", "Blesse leger", "Indemne"]
        );
    }

    #[test]
    fn rejects_non_integer_code() {
        let toml_str = DEFAULT_DATASET_TOML.replace("1 = \"Hors agglomeration\"", "x = \"Hors\"");
        let err = parse_dataset_toml(&toml_str).unwrap_err();
        assert!(err.to_string().contains("invalid category code"), "{err}");
    }

    #[test]
    fn rejects_empty_label() {
        let toml_str = DEFAULT_DATASET_TOML.replace("9 = \"Autre\"", "9 = \"  \"");
        assert!(parse_dataset_toml(&toml_str).is_err());
    }

    #[test]
    fn paths_resolve_under_data_dir() {
        let config = parse_dataset_toml(DEFAULT_DATASET_TOML)
            .unwrap()
            .with_data_dir("/tmp/road");
        assert_eq!(config.raw_dir(), PathBuf::from("/tmp/road/raw"));
        assert_eq!(
            config.cleaned_file(),
            PathBuf::from("/tmp/road/cleaned/accidents_2022_clean.csv")
        );
    }
}

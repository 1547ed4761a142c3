//! Persistent watermark state for CLI runs.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use directories::ProjectDirs;
use huangpu_types::Provider;
use thiserror::Error;

/// Errors that can occur during watermark-state operations.
#[derive(Error, Debug)]
pub enum StateError {
    /// Failed to determine the application data directory.
    #[error("Failed to determine application data directory")]
    NoDataDir,

    /// Failed to create a directory.
    #[error("Failed to create directory '{path}': {source}")]
    CreateDir {
        /// The path that could not be created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[error("Failed to write file '{path}': {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse JSON.
    #[error("Failed to parse watermark file '{path}': {source}")]
    ParseJson {
        /// The path that could not be parsed.
        path: PathBuf,
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// Failed to serialize JSON.
    #[error("Failed to serialize watermarks: {0}")]
    SerializeJson(#[from] serde_json::Error),
}

/// Result type for state operations.
pub type StateResult<T> = std::result::Result<T, StateError>;

/// Audit watermarks persisted as JSON files, one file per provider.
///
/// Files live under the application data directory (for example
/// `~/.local/share/huangpu/watermarks/eastmoney.json` on Linux) and map
/// symbol to last fully-checked date. This keeps incremental scans
/// incremental across CLI invocations without a database.
#[derive(Debug, Clone)]
pub struct WatermarkState {
    base_path: PathBuf,
    watermarks_path: PathBuf,
}

impl WatermarkState {
    /// Creates watermark state rooted at the given base path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn new(base_path: PathBuf) -> StateResult<Self> {
        let watermarks_path = base_path.join("watermarks");

        for path in [&base_path, &watermarks_path] {
            if !path.exists() {
                fs::create_dir_all(path).map_err(|e| StateError::CreateDir {
                    path: path.clone(),
                    source: e,
                })?;
            }
        }

        Ok(Self {
            base_path,
            watermarks_path,
        })
    }

    /// Returns the default path for huangpu state storage.
    ///
    /// Uses the `directories` crate to find the platform location, falling
    /// back to `~/.huangpu/` when it cannot be determined.
    #[must_use]
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("", "", "huangpu").map_or_else(dirs_fallback, |proj_dirs| {
            proj_dirs.data_dir().to_path_buf()
        })
    }

    /// Creates watermark state at the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the directories cannot be created.
    pub fn with_default_path() -> StateResult<Self> {
        Self::new(Self::default_path())
    }

    /// Returns the base path for state storage.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns the path to a provider's watermark file.
    #[must_use]
    pub fn provider_path(&self, provider: Provider) -> PathBuf {
        self.watermarks_path.join(format!("{provider}.json"))
    }

    /// Loads all watermarks for a provider.
    ///
    /// A missing file is an empty map, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(&self, provider: Provider) -> StateResult<HashMap<String, NaiveDate>> {
        let path = self.provider_path(provider);
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let contents = fs::read_to_string(&path).map_err(|e| StateError::ReadFile {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&contents).map_err(|e| StateError::ParseJson { path, source: e })
    }

    /// Saves all watermarks for a provider, replacing the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be serialized or written.
    pub fn save(
        &self,
        provider: Provider,
        watermarks: &HashMap<String, NaiveDate>,
    ) -> StateResult<()> {
        let path = self.provider_path(provider);
        let json = serde_json::to_string_pretty(watermarks)?;
        fs::write(&path, json).map_err(|e| StateError::WriteFile { path, source: e })
    }
}

/// Fallback state directory when the platform dirs cannot be determined.
fn dirs_fallback() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".huangpu")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty_map() {
        let temp_dir = TempDir::new().unwrap();
        let state = WatermarkState::new(temp_dir.path().to_path_buf()).unwrap();
        assert!(state.load(Provider::Eastmoney).unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let state = WatermarkState::new(temp_dir.path().to_path_buf()).unwrap();

        let mut marks = HashMap::new();
        marks.insert("600519".to_string(), d(2023, 6, 30));
        marks.insert("000001".to_string(), d(2023, 7, 3));
        state.save(Provider::Eastmoney, &marks).unwrap();

        let loaded = state.load(Provider::Eastmoney).unwrap();
        assert_eq!(loaded, marks);
    }

    #[test]
    fn test_providers_use_separate_files() {
        let temp_dir = TempDir::new().unwrap();
        let state = WatermarkState::new(temp_dir.path().to_path_buf()).unwrap();

        let mut marks = HashMap::new();
        marks.insert("600519".to_string(), d(2023, 6, 30));
        state.save(Provider::Eastmoney, &marks).unwrap();

        assert!(state.load(Provider::Baostock).unwrap().is_empty());
        assert_ne!(
            state.provider_path(Provider::Eastmoney),
            state.provider_path(Provider::Baostock)
        );
    }

    #[test]
    fn test_corrupt_file_is_a_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let state = WatermarkState::new(temp_dir.path().to_path_buf()).unwrap();
        fs::write(state.provider_path(Provider::Eastmoney), "not json").unwrap();

        let err = state.load(Provider::Eastmoney).unwrap_err();
        assert!(matches!(err, StateError::ParseJson { .. }));
    }
}

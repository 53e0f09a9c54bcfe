//! zipdb configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use zipdb_records::RecordSource;

use crate::error::CoreError;
use crate::Result;

pub const ENV_DATABASE: &str = "ZIPDB_DATABASE";
pub const ENV_SOURCE: &str = "ZIPDB_SOURCE";
pub const ENV_BASE_URL: &str = "ZIPDB_BASE_URL";

/// `source` value naming the sample dataset compiled into the binary.
pub const BUNDLED_SOURCE: &str = "bundled";

const BUNDLED_DATASET: &str = include_str!("../../../data/zipcodes.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Bulk record source: an http(s) URL, a file URL, a filesystem path
    /// or [`BUNDLED_SOURCE`]
    pub source: String,
    /// Base URL that a relative `source` is resolved against
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("zipdb.db"),
            source: BUNDLED_SOURCE.to_string(),
            base_url: None,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("zipdb"))
            .unwrap_or_else(|| PathBuf::from(".zipdb"))
    }

    /// Read a JSON config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Defaults overlaid with `ZIPDB_DATABASE`, `ZIPDB_SOURCE` and
    /// `ZIPDB_BASE_URL`.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(path) = value(ENV_DATABASE) {
            self.database_path = PathBuf::from(path);
        }
        if let Some(source) = value(ENV_SOURCE) {
            self.source = source;
        }
        if let Some(base_url) = value(ENV_BASE_URL) {
            self.base_url = Some(base_url);
        }
        self
    }

    pub fn record_source(&self) -> Result<RecordSource> {
        if self.source == BUNDLED_SOURCE {
            return Ok(RecordSource::Inline(serde_json::from_str(BUNDLED_DATASET)?));
        }

        let base = self
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(|e| CoreError::Config(format!("invalid base URL: {e}")))?;

        RecordSource::parse(&self.source, base.as_ref())
            .map_err(|e| CoreError::Config(e.to_string()))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}

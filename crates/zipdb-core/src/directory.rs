//! Postal-code directory
//!
//! The consumer-facing side of the record store: "City, ST" labels,
//! matching zip codes for a city, and a random pick for profile views.

use serde::Serialize;
use std::path::PathBuf;

use zipdb_records::{Record, RecordStore};

use crate::config::Config;
use crate::Result;

/// Label shown for a code that has no record.
pub const UNKNOWN_ZIP_CODE: &str = "Unknown zip code";

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryStats {
    pub records: usize,
    pub source: String,
    pub populated_at: Option<String>,
    pub database_path: PathBuf,
}

pub struct Directory {
    config: Config,
    store: RecordStore,
}

impl Directory {
    /// Open the configured database. The record source is not touched
    /// until [`Directory::initialize`] or the first lookup.
    pub async fn new(config: Config) -> Result<Self> {
        let source = config.record_source()?;
        let store = RecordStore::open(&config.database_path, source).await?;

        tracing::info!(
            database = %config.database_path.display(),
            source = %config.source,
            "Opened postal-code directory"
        );

        Ok(Self { config, store })
    }

    pub fn with_store(config: Config, store: RecordStore) -> Self {
        Self { config, store }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub async fn initialize(&self) -> Result<()> {
        self.store.ensure_initialized().await?;
        Ok(())
    }

    /// `"City, ST"` for a code, `None` if the code is unknown. The code
    /// is matched as given.
    pub async fn city_for(&self, code: &str) -> Result<Option<String>> {
        let record = self.store.lookup_by_code(code).await?;
        Ok(record.map(|r| r.location()))
    }

    /// Like [`Directory::city_for`], with unknown codes rendered as
    /// [`UNKNOWN_ZIP_CODE`].
    pub async fn city_label(&self, code: &str) -> Result<String> {
        Ok(self
            .city_for(code)
            .await?
            .unwrap_or_else(|| UNKNOWN_ZIP_CODE.to_string()))
    }

    /// Records whose city equals `city` exactly, surrounding whitespace
    /// and case included.
    pub async fn zipcodes_for(&self, city: &str) -> Result<Vec<Record>> {
        Ok(self.store.lookup_by_city(city).await?)
    }

    pub async fn all_records(&self) -> Result<Vec<Record>> {
        Ok(self.store.list_all().await?)
    }

    pub async fn record_count(&self) -> Result<usize> {
        Ok(self.store.count().await?)
    }

    /// A uniformly random record, `None` when the directory is empty.
    pub async fn random_record(&self) -> Result<Option<Record>> {
        let mut records = self.store.list_all().await?;
        if records.is_empty() {
            return Ok(None);
        }
        let index = fastrand::usize(..records.len());
        Ok(Some(records.swap_remove(index)))
    }

    pub async fn reload(&self) -> Result<usize> {
        let stored = self.store.reload().await?;
        tracing::info!(records = stored, "Reloaded postal-code directory");
        Ok(stored)
    }

    pub async fn stats(&self) -> Result<DirectoryStats> {
        Ok(DirectoryStats {
            records: self.store.count().await?,
            source: self.store.source().describe(),
            populated_at: self.store.populated_at().await?,
            database_path: self.config.database_path.clone(),
        })
    }
}

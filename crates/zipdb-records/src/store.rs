//! Asynchronous record store
//!
//! SQLite calls are blocking, so every operation hands a clone of the
//! `Database` handle to tokio's blocking pool and awaits the result.

use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;

use zipdb_storage::{write_setting, Database, StorageError};

use crate::error::{InitializationError, RecordError};
use crate::record::Record;
use crate::source::RecordSource;
use crate::Result;

const POPULATED_AT_KEY: &str = "zipcodes.populated_at";
const SOURCE_KEY: &str = "zipcodes.source";

/// Postal-code records with lookups by code and by city.
///
/// The store is populated once from its [`RecordSource`]; every query
/// waits for that population to finish before it reads.
#[derive(Clone)]
pub struct RecordStore {
    db: Database,
    source: Arc<RecordSource>,
    client: reqwest::Client,
    ready: Arc<OnceCell<()>>,
}

impl RecordStore {
    pub fn new(db: Database, source: RecordSource) -> Self {
        Self {
            db,
            source: Arc::new(source),
            client: reqwest::Client::new(),
            ready: Arc::new(OnceCell::new()),
        }
    }

    /// Open (creating if needed) the database file at `path`.
    pub async fn open(path: impl Into<PathBuf>, source: RecordSource) -> Result<Self> {
        let path = path.into();
        let db = tokio::task::spawn_blocking(move || Database::open(&path))
            .await?
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to open record database");
                RecordError::Connection(e)
            })?;

        Ok(Self::new(db, source))
    }

    pub fn open_in_memory(source: RecordSource) -> Result<Self> {
        let db = Database::open_in_memory().map_err(RecordError::Connection)?;
        Ok(Self::new(db, source))
    }

    /// Use a preconfigured HTTP client for [`RecordSource::Http`].
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn source(&self) -> &RecordSource {
        &self.source
    }

    /// Populate the store from its source unless that already happened.
    ///
    /// Idempotent. Concurrent callers share one attempt. A failed attempt
    /// commits nothing, and the next call starts over.
    pub async fn ensure_initialized(&self) -> Result<()> {
        self.ready
            .get_or_try_init(|| async move {
                if let Some(populated_at) = self.populated_at_unchecked().await? {
                    tracing::debug!(%populated_at, "Record store already populated");
                    return Ok(());
                }
                self.populate().await.map(|_| ())
            })
            .await?;
        Ok(())
    }

    /// Re-fetch the source and upsert every record, even if the store is
    /// already populated. Returns the number of stored records afterwards.
    pub async fn reload(&self) -> Result<usize> {
        let stored = self.populate().await?;
        // Already set, or another caller is initializing: either way the
        // data is committed.
        let _ = self.ready.set(());
        Ok(stored)
    }

    pub async fn lookup_by_code(&self, code: &str) -> Result<Option<Record>> {
        self.ensure_initialized().await?;

        let key = code.to_string();
        let record = self
            .query(move |db| {
                db.with_connection(|conn| {
                    Ok(conn
                        .query_row(
                            "SELECT code, city, region FROM zipcodes WHERE code = ?1",
                            [&key],
                            row_to_record,
                        )
                        .optional()?)
                })
            })
            .await?;

        tracing::debug!(code = %code, found = record.is_some(), "Looked up code");
        Ok(record)
    }

    /// All records whose city equals `city` exactly (case-sensitive).
    pub async fn lookup_by_city(&self, city: &str) -> Result<Vec<Record>> {
        self.ensure_initialized().await?;

        let value = city.to_string();
        let records = self
            .query(move |db| {
                db.with_connection(|conn| {
                    let mut stmt = conn.prepare(
                        "SELECT code, city, region FROM zipcodes WHERE city = ?1 ORDER BY code",
                    )?;
                    let records = stmt
                        .query_map([&value], row_to_record)?
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    Ok(records)
                })
            })
            .await?;

        tracing::debug!(city = %city, matches = records.len(), "Looked up city");
        Ok(records)
    }

    pub async fn list_all(&self) -> Result<Vec<Record>> {
        self.ensure_initialized().await?;

        self.query(|db| {
            db.with_connection(|conn| {
                let mut stmt =
                    conn.prepare("SELECT code, city, region FROM zipcodes ORDER BY code")?;
                let records = stmt
                    .query_map([], row_to_record)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(records)
            })
        })
        .await
    }

    pub async fn count(&self) -> Result<usize> {
        self.ensure_initialized().await?;
        self.query(count_records).await
    }

    /// When the current data set was committed, if it has been.
    pub async fn populated_at(&self) -> Result<Option<String>> {
        self.ensure_initialized().await?;
        self.populated_at_unchecked().await
    }

    async fn populated_at_unchecked(&self) -> Result<Option<String>> {
        self.query(|db| db.get_setting(POPULATED_AT_KEY)).await
    }

    async fn populate(&self) -> Result<usize> {
        let origin = self.source.describe();
        tracing::info!(source = %origin, "Loading records from bulk source");

        let records = self.source.fetch(&self.client).await.map_err(|e| {
            tracing::error!(source = %origin, error = %e, "Bulk fetch failed");
            InitializationError::Fetch(e)
        })?;
        let fetched = records.len();

        let db = self.db.clone();
        let marker = origin.clone();
        let stored = tokio::task::spawn_blocking(move || write_records(&db, &records, &marker))
            .await?
            .map_err(|e| {
                tracing::error!(source = %origin, error = %e, "Bulk write failed");
                InitializationError::Write(e)
            })?;

        tracing::info!(source = %origin, fetched, stored, "Record store populated");
        Ok(stored)
    }

    async fn query<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Database) -> zipdb_storage::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || f(&db))
            .await?
            .map_err(|e| {
                tracing::error!(error = %e, "Record query failed");
                RecordError::Query(e)
            })
    }
}

/// Upsert `records` and stamp the settings marker in one transaction.
fn write_records(
    db: &Database,
    records: &[Record],
    origin: &str,
) -> std::result::Result<usize, StorageError> {
    db.transaction(|conn| {
        {
            let mut stmt = conn.prepare_cached(
                "INSERT OR REPLACE INTO zipcodes (code, city, region) VALUES (?1, ?2, ?3)",
            )?;
            for record in records {
                stmt.execute(params![record.code, record.city, record.region])?;
            }
        }

        write_setting(conn, SOURCE_KEY, origin)?;
        write_setting(conn, POPULATED_AT_KEY, &Utc::now().to_rfc3339())?;

        let stored: i64 = conn.query_row("SELECT COUNT(*) FROM zipcodes", [], |row| row.get(0))?;
        Ok(stored as usize)
    })
}

fn count_records(db: &Database) -> zipdb_storage::Result<usize> {
    db.with_connection(|conn| {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM zipcodes", [], |row| row.get(0))?;
        Ok(count as usize)
    })
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        code: row.get(0)?,
        city: row.get(1)?,
        region: row.get(2)?,
    })
}

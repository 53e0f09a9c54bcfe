//! Record store error types

use std::path::PathBuf;

use thiserror::Error;
use zipdb_storage::StorageError;

/// Failure to obtain or decode the bulk source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid source location: {0}")]
    InvalidLocation(String),
}

#[derive(Error, Debug)]
pub enum InitializationError {
    #[error("bulk fetch failed: {0}")]
    Fetch(#[from] SourceError),

    #[error("bulk write failed: {0}")]
    Write(#[source] StorageError),
}

#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Connection error: {0}")]
    Connection(#[source] StorageError),

    #[error("Initialization error: {0}")]
    Initialization(#[from] InitializationError),

    #[error("Query error: {0}")]
    Query(#[source] StorageError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

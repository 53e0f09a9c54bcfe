//! CLI commands
//!
//! Each command returns a `CommandResult` envelope that the binary
//! prints as JSON.

pub mod lookup;
pub mod records;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CommandResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

impl<T> From<zipdb_core::Result<T>> for CommandResult<T> {
    fn from(result: zipdb_core::Result<T>) -> Self {
        match result {
            Ok(data) => CommandResult::ok(data),
            Err(e) => {
                tracing::error!(error = %e, "Command failed");
                CommandResult::err(e.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordInfo {
    pub code: String,
    pub city: String,
    pub region: String,
    pub display: String,
}

impl From<zipdb_core::Record> for RecordInfo {
    fn from(record: zipdb_core::Record) -> Self {
        let display = record.to_string();
        Self {
            code: record.code,
            city: record.city,
            region: record.region,
            display,
        }
    }
}

//! zipdb Storage Layer
//!
//! SQLite-backed persistence for the postal-code record table.
//! One connection per handle, schema created by versioned migrations,
//! bulk writes run inside a single transaction.

mod database;
mod error;
mod migrations;

pub use database::{read_setting, write_setting, Database};
pub use error::StorageError;
pub use migrations::SCHEMA_VERSION;

pub type Result<T> = std::result::Result<T, StorageError>;

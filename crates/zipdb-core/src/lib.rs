//! zipdb Core
//!
//! Configuration, logging bootstrap and the [`Directory`] facade that
//! front-ends use to answer postal-code questions.

mod config;
mod directory;
mod error;

pub use config::{Config, BUNDLED_SOURCE, ENV_BASE_URL, ENV_DATABASE, ENV_SOURCE};
pub use directory::{Directory, DirectoryStats, UNKNOWN_ZIP_CODE};
pub use error::CoreError;

// Re-export core components
pub use zipdb_records::{
    InitializationError, Record, RecordError, RecordSource, RecordStore, SourceError,
};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

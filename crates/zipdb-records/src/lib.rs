//! zipdb Record Store
//!
//! - One table of postal-code records keyed by code
//! - Non-unique secondary index on city name
//! - One-time bulk population from a JSON source
//! - Asynchronous lookups by code, by city, or everything

mod error;
mod record;
mod source;
mod store;

pub use error::{InitializationError, RecordError, SourceError};
pub use record::Record;
pub use source::RecordSource;
pub use store::RecordStore;

pub type Result<T> = std::result::Result<T, RecordError>;

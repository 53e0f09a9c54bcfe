//! Application state management
use std::sync::Arc;
use zipdb_core::{Config, Directory, Result};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    directory: Arc<Directory>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self> {
        let directory = Directory::new(config).await?;
        Ok(Self::from_directory(directory))
    }

    pub fn from_directory(directory: Directory) -> Self {
        Self {
            directory: Arc::new(directory),
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }
}

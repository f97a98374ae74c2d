use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::StorageGateway;
use crate::error::StorageError;
use crate::state::FlagState;

/// Reads a JSON flag snapshot from disk on every fetch.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StorageGateway for FileStorage {
    async fn fetch_latest(&self) -> Result<FlagState, StorageError> {
        let content = tokio::fs::read(&self.path).await?;
        FlagState::from_json(&content).map_err(|e| StorageError::Parse(e.to_string()))
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}

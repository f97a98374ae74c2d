use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::StorageGateway;
use crate::error::StorageError;
use crate::state::FlagState;

/// In-process flag storage. Flags are pushed with [`MemoryStorage::set_state`];
/// a failure can be injected to simulate an unreachable backend.
pub struct MemoryStorage {
    state: RwLock<Option<FlagState>>,
    failure: RwLock<Option<String>>,
    fetches: AtomicU64,
}

impl MemoryStorage {
    /// Storage with nothing stored yet. Fetches fail until a state is set.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
            failure: RwLock::new(None),
            fetches: AtomicU64::new(0),
        }
    }

    pub fn with_state(state: FlagState) -> Self {
        Self {
            state: RwLock::new(Some(state)),
            ..Self::new()
        }
    }

    pub async fn set_state(&self, state: FlagState) {
        *self.state.write().await = Some(state);
    }

    /// Make every fetch fail with `reason` until [`MemoryStorage::recover`] is called.
    pub async fn fail_with(&self, reason: &str) {
        *self.failure.write().await = Some(reason.to_string());
    }

    pub async fn recover(&self) {
        *self.failure.write().await = None;
    }

    /// Number of fetch attempts, successful or not.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageGateway for MemoryStorage {
    async fn fetch_latest(&self) -> Result<FlagState, StorageError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(reason) = self.failure.read().await.as_ref() {
            return Err(StorageError::Unavailable(reason.clone()));
        }

        self.state
            .read()
            .await
            .clone()
            .ok_or_else(|| StorageError::Unavailable("no flag state stored".into()))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

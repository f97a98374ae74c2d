pub mod file;
#[cfg(feature = "remote")]
pub mod http;
pub mod memory;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::state::FlagState;

pub use file::FileStorage;
#[cfg(feature = "remote")]
pub use http::HttpStorage;
pub use memory::MemoryStorage;

/// Source of flag snapshots. Every fetch is a full replace; there are no deltas.
///
/// Implementations own their timeout policy. Any error is treated as transient
/// by the refresh service.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Fetch the latest complete flag state.
    async fn fetch_latest(&self) -> Result<FlagState, StorageError>;

    /// Short description of where flags come from, used in log events.
    fn describe(&self) -> String;
}

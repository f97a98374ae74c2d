use std::sync::Arc;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::builder::RefreshServiceBuilder;
use crate::error::StorageError;
use crate::latest::{LatestFlagsResult, LatestFlagsSource};
use crate::options::RefreshOptions;
use crate::state::FlagState;
use crate::storage::StorageGateway;

/// One successful fetch. Replaced as a whole so readers never see the flags
/// of one fetch paired with the timestamp of another.
struct Snapshot {
    flags: Arc<FlagState>,
    fetched_at: Instant,
    refreshed_at: DateTime<Utc>,
    fingerprint: String,
}

/// Summary of a successful [`RefreshService::refresh_once`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub fingerprint: String,
    pub features: usize,
    pub flights: usize,
    /// False when the fetched flags are identical to the previous snapshot.
    pub changed: bool,
}

/// Owns the process's latest flag snapshot and keeps it fresh.
///
/// Reads go through [`LatestFlagsSource::latest_flags`] and never block: the
/// snapshot sits behind an atomically swapped pointer, and the only writer is
/// [`RefreshService::refresh_once`], which swaps in a complete new snapshot
/// after the fetch has finished.
pub struct RefreshService {
    gateway: Arc<dyn StorageGateway>,
    options: RefreshOptions,
    latest: ArcSwapOption<Snapshot>,
}

impl RefreshService {
    pub fn builder() -> RefreshServiceBuilder {
        RefreshServiceBuilder::new()
    }

    pub(crate) fn new(gateway: Arc<dyn StorageGateway>, options: RefreshOptions) -> Self {
        Self {
            gateway,
            options,
            latest: ArcSwapOption::empty(),
        }
    }

    pub fn options(&self) -> &RefreshOptions {
        &self.options
    }

    /// Wall-clock time of the last successful fetch.
    pub fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.latest.load_full().map(|s| s.refreshed_at)
    }

    /// Fetch once from storage and publish the result.
    ///
    /// On failure the previous snapshot stays in place and the error is logged;
    /// readers of [`LatestFlagsSource::latest_flags`] never see it.
    pub async fn refresh_once(&self) -> Result<RefreshOutcome, StorageError> {
        let flags = match self.gateway.fetch_latest().await {
            Ok(flags) => flags,
            Err(e) => {
                warn!(
                    source = %self.gateway.describe(),
                    error = %e,
                    "Failed to refresh feature flags, keeping previous snapshot"
                );
                return Err(e);
            }
        };

        let fingerprint = flags.fingerprint();
        let changed = self
            .latest
            .load_full()
            .map_or(true, |previous| previous.fingerprint != fingerprint);
        let outcome = RefreshOutcome {
            fingerprint: fingerprint.clone(),
            features: flags.features().len(),
            flights: flags.flights().len(),
            changed,
        };

        self.latest.store(Some(Arc::new(Snapshot {
            flags: Arc::new(flags),
            fetched_at: Instant::now(),
            refreshed_at: Utc::now(),
            fingerprint,
        })));

        info!(
            fingerprint = %outcome.fingerprint,
            features = outcome.features,
            flights = outcome.flights,
            changed = outcome.changed,
            "Refreshed feature flags"
        );
        Ok(outcome)
    }

    /// Refresh immediately, then every `refresh_interval` until `cancel` fires.
    ///
    /// A failed fetch doesn't change the schedule. Cancellation is only observed
    /// between fetches, so a fetch in flight always completes.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            source = %self.gateway.describe(),
            interval = ?self.options.refresh_interval,
            "Starting feature flag refresh loop"
        );

        loop {
            // Failures are logged by refresh_once.
            let _ = self.refresh_once().await;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.options.refresh_interval) => {}
            }
        }

        info!("Feature flag refresh loop stopped");
    }

    /// Run the refresh loop as a background task on the current runtime.
    pub fn spawn(self: Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(cancel).await })
    }
}

impl LatestFlagsSource for RefreshService {
    fn latest_flags(&self) -> LatestFlagsResult {
        let Some(snapshot) = self.latest.load_full() else {
            return LatestFlagsResult::Uninitialized;
        };

        match self.options.maximum_staleness {
            Some(maximum) if snapshot.fetched_at.elapsed() > maximum => {
                LatestFlagsResult::Stale(Arc::clone(&snapshot.flags))
            }
            _ => LatestFlagsResult::Ok(Arc::clone(&snapshot.flags)),
        }
    }
}

use std::fmt;
use std::sync::Arc;

use crate::state::FlagState;

/// Freshness of the flags returned by a [`LatestFlagsSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatestFlagsStatus {
    /// Flags have never been loaded.
    Uninitialized,
    /// Flags were loaded but are older than the staleness threshold and may be incorrect.
    Stale,
    /// Flags are ready for use.
    Ok,
}

impl fmt::Display for LatestFlagsStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LatestFlagsStatus::Uninitialized => write!(f, "Uninitialized"),
            LatestFlagsStatus::Stale => write!(f, "Stale"),
            LatestFlagsStatus::Ok => write!(f, "Ok"),
        }
    }
}

/// The latest known flags together with their freshness.
///
/// A stale snapshot is still handed out; callers decide whether to trust it.
#[derive(Debug, Clone)]
pub enum LatestFlagsResult {
    Uninitialized,
    Stale(Arc<FlagState>),
    Ok(Arc<FlagState>),
}

impl LatestFlagsResult {
    pub fn status(&self) -> LatestFlagsStatus {
        match self {
            LatestFlagsResult::Uninitialized => LatestFlagsStatus::Uninitialized,
            LatestFlagsResult::Stale(_) => LatestFlagsStatus::Stale,
            LatestFlagsResult::Ok(_) => LatestFlagsStatus::Ok,
        }
    }

    /// `None` only when uninitialized.
    pub fn flags(&self) -> Option<&Arc<FlagState>> {
        match self {
            LatestFlagsResult::Uninitialized => None,
            LatestFlagsResult::Stale(flags) | LatestFlagsResult::Ok(flags) => Some(flags),
        }
    }
}

/// Anything that can hand out the latest flags without blocking.
pub trait LatestFlagsSource: Send + Sync {
    fn latest_flags(&self) -> LatestFlagsResult;
}

/// A fixed result, handy for fixtures.
impl LatestFlagsSource for LatestFlagsResult {
    fn latest_flags(&self) -> LatestFlagsResult {
        self.clone()
    }
}

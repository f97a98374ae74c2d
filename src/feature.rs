use std::sync::Arc;

use tracing::warn;

use crate::latest::{LatestFlagsResult, LatestFlagsSource};
use crate::state::FeatureStatus;

/// Status of a feature as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureResult {
    /// The feature's latest status is unknown.
    Unknown,
    Disabled,
    Enabled,
}

/// Answers whether a global, non user-specific feature is enabled.
///
/// Neither method blocks or fails; the worst case is [`FeatureResult::Unknown`].
#[derive(Clone)]
pub struct FeatureFlagClient {
    flags: Arc<dyn LatestFlagsSource>,
}

impl FeatureFlagClient {
    pub fn new(flags: Arc<dyn LatestFlagsSource>) -> Self {
        Self { flags }
    }

    /// Returns `default` when the status is unknown.
    pub fn is_enabled(&self, feature: &str, default: bool) -> bool {
        match self.evaluate(feature) {
            FeatureResult::Enabled => true,
            FeatureResult::Disabled => false,
            FeatureResult::Unknown => default,
        }
    }

    pub fn evaluate(&self, feature: &str) -> FeatureResult {
        let latest = self.flags.latest_flags();
        let LatestFlagsResult::Ok(flags) = &latest else {
            warn!(
                feature,
                status = %latest.status(),
                "Couldn't determine status of feature as the latest flags aren't ok"
            );
            return FeatureResult::Unknown;
        };

        match flags.feature(feature) {
            Some(FeatureStatus::Enabled) => FeatureResult::Enabled,
            Some(FeatureStatus::Disabled) => FeatureResult::Disabled,
            Some(FeatureStatus::Unrecognized(status)) => {
                warn!(feature, status = %status, "Unknown feature status");
                FeatureResult::Unknown
            }
            None => {
                warn!(
                    feature,
                    "Couldn't determine status of feature as it isn't in the latest flags"
                );
                FeatureResult::Unknown
            }
        }
    }
}

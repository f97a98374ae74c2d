use std::time::Duration;

use serde::Deserialize;

use crate::error::FlagsError;

const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60;
const DEFAULT_MAXIMUM_STALENESS_SECS: u64 = 60 * 60;

/// How often flags are refreshed and when they are considered stale.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawRefreshOptions")]
pub struct RefreshOptions {
    /// Delay between the end of one refresh and the start of the next.
    pub refresh_interval: Duration,
    /// Flags older than this are reported as stale. `None` disables staleness.
    pub maximum_staleness: Option<Duration>,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(DEFAULT_REFRESH_INTERVAL_SECS),
            maximum_staleness: Some(Duration::from_secs(DEFAULT_MAXIMUM_STALENESS_SECS)),
        }
    }
}

impl RefreshOptions {
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    pub fn with_maximum_staleness(mut self, staleness: Duration) -> Self {
        self.maximum_staleness = Some(staleness);
        self
    }

    pub fn without_staleness(mut self) -> Self {
        self.maximum_staleness = None;
        self
    }

    pub fn validate(&self) -> Result<(), FlagsError> {
        if self.refresh_interval.is_zero() {
            return Err(FlagsError::InvalidOptions(
                "refresh interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Seconds-based form used in config files. A staleness of `0` disables it.
#[derive(Deserialize)]
struct RawRefreshOptions {
    #[serde(default = "default_refresh_interval_secs")]
    refresh_interval_secs: u64,
    #[serde(default = "default_maximum_staleness_secs")]
    maximum_staleness_secs: u64,
}

fn default_refresh_interval_secs() -> u64 {
    DEFAULT_REFRESH_INTERVAL_SECS
}

fn default_maximum_staleness_secs() -> u64 {
    DEFAULT_MAXIMUM_STALENESS_SECS
}

impl From<RawRefreshOptions> for RefreshOptions {
    fn from(raw: RawRefreshOptions) -> Self {
        Self {
            refresh_interval: Duration::from_secs(raw.refresh_interval_secs),
            maximum_staleness: match raw.maximum_staleness_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RefreshOptions::default();
        assert_eq!(options.refresh_interval, Duration::from_secs(60));
        assert_eq!(options.maximum_staleness, Some(Duration::from_secs(3600)));
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_zero_interval_is_invalid() {
        let options = RefreshOptions::default().with_refresh_interval(Duration::ZERO);
        assert!(matches!(
            options.validate(),
            Err(FlagsError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_deserialize_seconds() {
        let options: RefreshOptions =
            serde_json::from_str(r#"{"refresh_interval_secs": 5, "maximum_staleness_secs": 30}"#)
                .unwrap();
        assert_eq!(options.refresh_interval, Duration::from_secs(5));
        assert_eq!(options.maximum_staleness, Some(Duration::from_secs(30)));

        let options: RefreshOptions = serde_json::from_str(r#"{"maximum_staleness_secs": 0}"#).unwrap();
        assert_eq!(options.refresh_interval, Duration::from_secs(60));
        assert_eq!(options.maximum_staleness, None);

        let options: RefreshOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RefreshOptions::default());
    }
}

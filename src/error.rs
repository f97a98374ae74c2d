use thiserror::Error;

/// Errors raised while building or validating flag state and services.
///
/// These surface at construction time only. Evaluation never returns an error.
#[derive(Debug, Error)]
pub enum FlagsError {
    #[error("refresh service requires a storage gateway")]
    MissingGateway,

    #[error("invalid refresh options: {0}")]
    InvalidOptions(String),

    #[error("invalid flag state: {0}")]
    InvalidState(String),
}

/// A failed attempt to fetch the latest flag state. Always treated as transient.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read flag state: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse flag state: {0}")]
    Parse(String),

    #[cfg(feature = "remote")]
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage returned status {0}")]
    Status(u16),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

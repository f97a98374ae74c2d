use std::env;
use std::sync::Arc;
use std::time::Duration;

use flagstate_lib::storage::{FileStorage, HttpStorage, StorageGateway};
use flagstate_lib::RefreshOptions;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "flagstate.toml";
pub const DEFAULT_SNAPSHOT_FILE: &str = "flags.json";

/// Top-level flagstate.toml configuration
#[derive(Debug, Deserialize, Default)]
pub struct FlagstateConfig {
    #[serde(default)]
    pub refresh: RefreshOptions,
    #[serde(default)]
    pub source: SourceConfig,
}

/// Where snapshots are fetched from. `url` wins over `file` when both are set.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct SourceConfig {
    pub file: Option<String>,
    pub url: Option<String>,
    pub token: Option<String>,
}

impl FlagstateConfig {
    /// Load configuration from a TOML file, falling back to defaults if the file
    /// doesn't exist or cannot be parsed.
    pub fn load(path: &str) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!(path, error = %e, "Failed to parse config, using defaults");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(env::vars());
    }

    fn apply_overrides(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        for (key, val) in vars {
            match key.as_str() {
                // seconds
                "FLAGSTATE_REFRESH_INTERVAL" => match val.parse::<u64>() {
                    Ok(secs) => self.refresh.refresh_interval = Duration::from_secs(secs),
                    Err(_) => warn!(value = %val, "Ignoring invalid FLAGSTATE_REFRESH_INTERVAL"),
                },
                // seconds, 0 disables
                "FLAGSTATE_MAXIMUM_STALENESS" => match val.parse::<u64>() {
                    Ok(0) => self.refresh.maximum_staleness = None,
                    Ok(secs) => self.refresh.maximum_staleness = Some(Duration::from_secs(secs)),
                    Err(_) => warn!(value = %val, "Ignoring invalid FLAGSTATE_MAXIMUM_STALENESS"),
                },
                "FLAGSTATE_SOURCE_FILE" => self.source.file = Some(val),
                "FLAGSTATE_SOURCE_URL" => self.source.url = Some(val),
                "FLAGSTATE_TOKEN" => self.source.token = Some(val),
                _ => {}
            }
        }
    }

    /// Apply command line overrides, which take precedence over everything else.
    pub fn apply_cli_overrides(
        &mut self,
        file: Option<String>,
        url: Option<String>,
        token: Option<String>,
    ) {
        if let Some(file) = file {
            // An explicit file on the command line beats a configured URL.
            self.source.url = None;
            self.source.file = Some(file);
        }
        if url.is_some() {
            self.source.url = url;
        }
        if token.is_some() {
            self.source.token = token;
        }
    }

    /// Build the storage gateway described by `[source]`.
    pub fn gateway(&self) -> Result<Arc<dyn StorageGateway>, String> {
        if let Some(ref url) = self.source.url {
            let mut storage = HttpStorage::new(url).map_err(|e| e.to_string())?;
            if let Some(ref token) = self.source.token {
                storage = storage.token(token);
            }
            return Ok(Arc::new(storage));
        }

        let file = self
            .source
            .file
            .clone()
            .unwrap_or_else(|| DEFAULT_SNAPSHOT_FILE.to_string());
        Ok(Arc::new(FileStorage::new(file)))
    }
}

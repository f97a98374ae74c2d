use std::time::Duration;

use async_trait::async_trait;

use super::StorageGateway;
use crate::error::StorageError;
use crate::state::FlagState;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetches a JSON flag snapshot over HTTP(S).
pub struct HttpStorage {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl HttpStorage {
    pub fn new(url: &str) -> Result<Self, StorageError> {
        Self::with_timeout(url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(url: &str, timeout: Duration) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
            token: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every fetch.
    pub fn token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

#[async_trait]
impl StorageGateway for HttpStorage {
    async fn fetch_latest(&self) -> Result<FlagState, StorageError> {
        let mut request = self.client.get(&self.url);
        if let Some(ref t) = self.token {
            request = request.bearer_auth(t);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(StorageError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        FlagState::from_json(&body).map_err(|e| StorageError::Parse(e.to_string()))
    }

    fn describe(&self) -> String {
        format!("url {}", self.url)
    }
}

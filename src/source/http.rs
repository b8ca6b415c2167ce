//! HTTP reading client for polling the relay server.
//!
//! The async [`ReadingClient`] talks to the relay's `/api/latest` endpoint;
//! [`BlockingReadingClient`] wraps it with a current-thread runtime so the
//! synchronous monitor loop can call it directly.

use crate::source::types::{Reading, ReadingSource, SourceError};
use std::time::Duration;

/// Per-attempt request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);

/// Relay endpoint configuration.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL of the relay server, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
}

impl SourceConfig {
    /// Create a configuration for the given relay base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            timeout: REQUEST_TIMEOUT,
        }
    }

    /// Get the latest-reading endpoint URL.
    pub fn latest_url(&self) -> String {
        format!("{}/api/latest", self.base_url)
    }

    /// Get the health check endpoint URL.
    pub fn health_url(&self) -> String {
        format!("{}/health", self.base_url)
    }
}

/// Async client for fetching the latest reading from the relay.
pub struct ReadingClient {
    config: SourceConfig,
    client: reqwest::Client,
}

impl ReadingClient {
    /// Create a new reading client.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SourceError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Test connection to the relay.
    pub async fn test_connection(&self) -> Result<bool, SourceError> {
        let response = self
            .client
            .get(self.config.health_url())
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(response.status().is_success())
    }

    /// Fetch the most recent reading.
    pub async fn fetch_latest(&self) -> Result<Reading, SourceError> {
        let response = self
            .client
            .get(self.config.latest_url())
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
            });
        }

        response
            .json::<Reading>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }

    /// The configured relay base URL.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }
}

/// Blocking reading client for use in the synchronous monitor loop.
pub struct BlockingReadingClient {
    inner: ReadingClient,
    runtime: tokio::runtime::Runtime,
}

impl BlockingReadingClient {
    /// Create a new blocking reading client.
    pub fn new(config: SourceConfig) -> Result<Self, SourceError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SourceError::Config(format!("Failed to create runtime: {e}")))?;

        Ok(Self {
            inner: ReadingClient::new(config)?,
            runtime,
        })
    }

    /// Test connection to the relay.
    pub fn test_connection(&self) -> Result<bool, SourceError> {
        self.runtime.block_on(self.inner.test_connection())
    }

    /// The configured relay base URL.
    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }
}

impl ReadingSource for BlockingReadingClient {
    fn fetch(&mut self) -> Result<Reading, SourceError> {
        self.runtime.block_on(self.inner.fetch_latest())
    }
}

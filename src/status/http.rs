//! HTTP status provider backed by `reqwest`

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{StatusError, StatusProvider, StatusSnapshot};
use crate::config::StatusConfig;

/// Fetches a status-page components document over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpStatusProvider {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpStatusProvider {
    /// Provider for `endpoint` with a per-request timeout
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, StatusError> {
        let client = reqwest::Client::builder()
            .user_agent(format!("omegaterm/{}", crate::VERSION))
            .timeout(timeout)
            .build()
            .map_err(|e| StatusError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Provider from the `[status]` configuration section
    pub fn from_config(config: &StatusConfig) -> Result<Self, StatusError> {
        Self::new(config.endpoint.clone(), config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl StatusProvider for HttpStatusProvider {
    async fn fetch_status(&self) -> Result<StatusSnapshot, StatusError> {
        debug!("Fetching status from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| StatusError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StatusError::HttpStatus(status.as_u16()));
        }

        response.json::<StatusSnapshot>().await.map_err(|e| {
            if e.is_decode() {
                StatusError::Malformed(e.to_string())
            } else {
                StatusError::Transport(e.to_string())
            }
        })
    }
}

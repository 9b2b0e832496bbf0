//! Liveness ping to a healthchecks.io style endpoint
//!
//! The ping is best effort. It has its own short timeout and its failures
//! never affect the outcome of a poll.

use crate::config::HealthchecksConfig;
use crate::error::{PollerError, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Result of the liveness ping at the end of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LivenessOutcome {
    /// Endpoint acknowledged the ping
    Notified,
    /// Ping attempted and failed; the reason was logged
    Failed(String),
    /// No ping was attempted
    Skipped,
}

/// Sends the liveness ping
#[derive(Debug, Clone)]
pub struct HealthcheckPinger {
    client: Client,
    url: Url,
}

impl HealthcheckPinger {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| PollerError::transport(format!("Failed to build ping client: {e}")))?;

        Ok(Self { client, url })
    }

    pub fn from_config(config: &HealthchecksConfig) -> Result<Self> {
        Self::new(config.url.clone(), config.timeout)
    }

    /// Send one GET to the ping URL
    pub async fn ping(&self) -> Result<()> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| PollerError::transport(format!("Ping failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollerError::transport(format!("Ping rejected with HTTP {status}")));
        }

        debug!("Liveness ping acknowledged");
        Ok(())
    }
}

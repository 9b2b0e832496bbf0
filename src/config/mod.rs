//! Configuration management for the Honeywell poller
//!
//! The configuration file is the same JSON document the poller has always
//! read, with one section per external system:
//!
//! ```json
//! {
//!   "Honeywell": { "authorization": "Basic ...", "apikey": "..." },
//!   "Influx": { "url": "http://localhost:8086", "token": "...", "org": "home", "bucket": "hvac" },
//!   "Healthchecks": { "url": "https://hc-ping.com/<uuid>" }
//! }
//! ```

use crate::error::{PollerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Complete poller configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Vendor API configuration
    #[serde(rename = "Honeywell", alias = "honeywell")]
    pub honeywell: HoneywellConfig,

    /// Metrics sink configuration
    #[serde(rename = "Influx", alias = "influx")]
    pub influx: InfluxConfig,

    /// Liveness ping configuration; no ping is sent when absent
    #[serde(
        rename = "Healthchecks",
        alias = "healthchecks",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub healthchecks: Option<HealthchecksConfig>,
}

/// Honeywell cloud API configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct HoneywellConfig {
    /// Static client credential sent as the `Authorization` header of the
    /// token refresh (e.g. `Basic base64(client_id:client_secret)`)
    pub authorization: String,

    /// Consumer key appended as the `apikey` query parameter
    pub apikey: String,

    /// API base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout for vendor calls
    #[serde(default = "default_api_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

/// InfluxDB configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct InfluxConfig {
    /// InfluxDB URL (e.g., http://localhost:8086)
    pub url: String,
    /// API token for authentication
    pub token: String,
    /// Organization name
    pub org: String,
    /// Bucket receiving the thermostat records
    pub bucket: String,
    /// Measurement name of the written points
    #[serde(default = "default_measurement")]
    pub measurement: String,
}

/// Healthchecks.io style liveness endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthchecksConfig {
    /// Ping URL
    pub url: Url,

    /// Upper bound for the ping request
    #[serde(default = "default_ping_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

fn default_base_url() -> String {
    "https://api.honeywell.com".to_string()
}

fn default_api_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_ping_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_measurement() -> String {
    "hvac_status".to_string()
}

impl AppConfig {
    /// Load and validate the configuration file at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PollerError::config(format!(
                "Failed to read configuration file {}: {e}",
                path.display()
            ))
        })?;

        let config = Self::from_json(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate a configuration document
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| PollerError::config(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that cannot possibly complete a run
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("Honeywell.authorization", &self.honeywell.authorization),
            ("Honeywell.apikey", &self.honeywell.apikey),
            ("Influx.url", &self.influx.url),
            ("Influx.token", &self.influx.token),
            ("Influx.org", &self.influx.org),
            ("Influx.bucket", &self.influx.bucket),
            ("Influx.measurement", &self.influx.measurement),
        ];

        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(PollerError::config(format!("{name} must not be empty")));
            }
        }

        self.honeywell.api_base()?;

        if self.honeywell.timeout.is_zero() {
            return Err(PollerError::config("Honeywell.timeout must be greater than zero"));
        }

        Ok(())
    }
}

impl HoneywellConfig {
    /// Parsed API base URL
    pub fn api_base(&self) -> Result<Url> {
        Url::parse(&self.base_url).map_err(|e| {
            PollerError::config(format!("Invalid Honeywell.base_url {}: {e}", self.base_url))
        })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("honeywell", &self.honeywell)
            .field("influx", &self.influx)
            .field("healthchecks", &self.healthchecks)
            .finish()
    }
}

impl fmt::Debug for HoneywellConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HoneywellConfig")
            .field("authorization", &"<redacted>")
            .field("apikey", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl fmt::Debug for InfluxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfluxConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("org", &self.org)
            .field("bucket", &self.bucket)
            .field("measurement", &self.measurement)
            .finish()
    }
}

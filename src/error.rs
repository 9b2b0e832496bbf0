//! Error types for the Honeywell poller
//!
//! Every failure of a poll cycle is expressed as a [`PollerError`]. The run
//! is fail-fast: any error aborts the cycle and is mapped to a distinct
//! process exit code by [`PollerError::exit_code`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for poller operations
pub type Result<T> = std::result::Result<T, PollerError>;

/// Vendor API call that produced an [`PollerError::Api`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiStage {
    /// `GET /v2/locations`
    Locations,
    /// `GET /v2/devices/thermostats/{deviceID}`
    Device,
}

impl ApiStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiStage::Locations => "locations",
            ApiStage::Device => "device",
        }
    }
}

impl fmt::Display for ApiStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for a poll cycle
#[derive(Error, Debug)]
pub enum PollerError {
    /// No token file exists; a refresh token must be obtained out of band
    #[error("No token configured: {} does not exist", path.display())]
    NoTokenConfigured { path: PathBuf },

    /// The token file exists but does not hold a usable token pair
    #[error("Invalid token file {}: {reason}", path.display())]
    InvalidTokenFile { path: PathBuf, reason: String },

    /// The OAuth endpoint rejected the refresh or answered with garbage
    #[error("Token refresh rejected (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    /// Network-level failure talking to the vendor or liveness endpoint
    #[error("Transport error: {0}")]
    Transport(String),

    /// Metrics sink write failed
    #[error("Metrics sink error: {0}")]
    Sink(String),

    /// Unexpected status or response shape from a vendor API call
    #[error("API error at {stage} stage (HTTP {status}): {message}")]
    Api {
        stage: ApiStage,
        status: u16,
        message: String,
    },

    /// A required field was missing or had the wrong type
    #[error("Malformed payload: field `{field}` is missing or has the wrong type")]
    MalformedPayload { field: String },

    /// The refreshed token could not be written to the token store
    #[error("Failed to persist refreshed token: {0}")]
    Persistence(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing errors
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PollerError {
    /// Create a transport error
    pub fn transport<S: Into<String>>(msg: S) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a sink error
    pub fn sink<S: Into<String>>(msg: S) -> Self {
        Self::Sink(msg.into())
    }

    /// Create a persistence error
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create an authentication error
    pub fn authentication<S: Into<String>>(status: u16, msg: S) -> Self {
        Self::Authentication {
            status,
            message: msg.into(),
        }
    }

    /// Create an API error for the given stage
    pub fn api<S: Into<String>>(stage: ApiStage, status: u16, msg: S) -> Self {
        Self::Api {
            stage,
            status,
            message: msg.into(),
        }
    }

    /// Create a malformed payload error for a dotted field path
    pub fn malformed<S: Into<String>>(field: S) -> Self {
        Self::MalformedPayload {
            field: field.into(),
        }
    }

    /// Stable label used as the `category` field of structured log lines
    pub fn category(&self) -> &'static str {
        match self {
            PollerError::NoTokenConfigured { .. } => "no_token",
            PollerError::InvalidTokenFile { .. } => "token_file",
            PollerError::Authentication { .. } => "auth",
            PollerError::Transport(_) => "transport",
            PollerError::Sink(_) => "sink",
            PollerError::Api { .. } => "api",
            PollerError::MalformedPayload { .. } => "malformed_payload",
            PollerError::Persistence(_) => "persistence",
            PollerError::Config(_) => "config",
            PollerError::Io(_) => "io",
            PollerError::Json(_) => "json",
        }
    }

    /// Process exit code for this error. Never zero.
    pub fn exit_code(&self) -> u8 {
        match self {
            PollerError::Config(_) => 2,
            PollerError::NoTokenConfigured { .. } => 3,
            PollerError::Authentication { .. } => 4,
            PollerError::Transport(_) => 5,
            PollerError::Api { .. } => 6,
            PollerError::MalformedPayload { .. } => 7,
            PollerError::Sink(_) => 8,
            PollerError::Persistence(_) => 9,
            PollerError::Io(_) | PollerError::Json(_) => 10,
            PollerError::InvalidTokenFile { .. } => 11,
        }
    }

    /// Whether running again later may succeed without manual intervention.
    ///
    /// Informational only: nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            PollerError::Transport(_) | PollerError::Sink(_) => true,
            PollerError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Check if this error requires re-authorizing the client by hand
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            PollerError::NoTokenConfigured { .. }
                | PollerError::InvalidTokenFile { .. }
                | PollerError::Authentication { .. }
        )
    }
}

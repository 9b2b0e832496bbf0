//! Honeywell thermostat poller
//!
//! Polls a Honeywell (Resideo) thermostat through the vendor cloud API and
//! forwards its telemetry to InfluxDB. One invocation performs one poll
//! cycle; repetition is left to an external scheduler such as cron.
//!
//! # Poll cycle
//!
//! - Refresh the OAuth token pair and persist it before use
//! - Discover the location and thermostat, then fetch the thermostat status
//! - Map the status onto nine named measurements tagged with the device identity
//! - Write the measurements as a single batch
//! - Ping a liveness endpoint (best effort)

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod logging;
pub mod monitoring;
pub mod poller;
pub mod services;

// Re-export main types for convenience
pub use config::AppConfig;
pub use error::{ApiStage, PollerError, Result};
pub use poller::{Poller, RunReport, RunStage};

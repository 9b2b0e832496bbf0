//! Common test utilities

#![allow(dead_code)]

pub mod honeywell_mock;
pub mod test_fixtures;

pub use honeywell_mock::{mock_healthchecks, mock_influx_write, MockHoneywellServer};

use async_trait::async_trait;
use honeywell_poller::auth::{TokenPair, TokenStore};
use honeywell_poller::monitoring::{MetricsSink, RecordBatch};
use honeywell_poller::{PollerError, Result};
use std::sync::Mutex;

/// Metrics sink that records every batch it receives
#[derive(Default)]
pub struct RecordingSink {
    batches: Mutex<Vec<RecordBatch>>,
    fail_with: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink whose writes always fail
    pub fn failing(message: &str) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn batches(&self) -> Vec<RecordBatch> {
        self.batches.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl MetricsSink for RecordingSink {
    async fn write(&self, batch: &RecordBatch) -> Result<()> {
        self.batches.lock().unwrap().push(batch.clone());
        match &self.fail_with {
            Some(message) => Err(PollerError::sink(message.clone())),
            None => Ok(()),
        }
    }
}

/// Token store that loads a fixed pair and refuses every save
pub struct ReadOnlyTokenStore {
    pub token: TokenPair,
}

#[async_trait]
impl TokenStore for ReadOnlyTokenStore {
    async fn load(&self) -> Result<TokenPair> {
        Ok(self.token.clone())
    }

    async fn save(&self, _token: &TokenPair) -> Result<()> {
        Err(PollerError::persistence("read-only file system"))
    }
}

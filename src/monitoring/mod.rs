//! Publishing of thermostat records to the metrics store

pub mod influxdb;

pub use influxdb::InfluxSink;

use crate::error::{PollerError, Result};
use crate::services::{DeviceTags, Measurement};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Measurements of one poll, all sharing the same device tags and timestamp
#[derive(Debug, Clone, PartialEq)]
pub struct RecordBatch {
    tags: DeviceTags,
    measurements: Vec<Measurement>,
    timestamp: DateTime<Utc>,
}

impl RecordBatch {
    pub fn new(tags: DeviceTags, measurements: Vec<Measurement>, timestamp: DateTime<Utc>) -> Self {
        Self {
            tags,
            measurements,
            timestamp,
        }
    }

    /// Batch stamped with the current time
    pub fn now(tags: DeviceTags, measurements: Vec<Measurement>) -> Self {
        Self::new(tags, measurements, Utc::now())
    }

    pub fn tags(&self) -> &DeviceTags {
        &self.tags
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }
}

/// Destination of record batches
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Write the whole batch in a single call
    async fn write(&self, batch: &RecordBatch) -> Result<()>;
}

/// Write `batch` to `sink`, reporting any failure as [`PollerError::Sink`]
pub async fn publish(sink: &dyn MetricsSink, batch: &RecordBatch) -> Result<()> {
    for measurement in batch.measurements() {
        debug!(name = %measurement.name, value = %measurement.value, "measurement");
    }

    sink.write(batch).await.map_err(|e| match e {
        PollerError::Sink(_) => e,
        other => PollerError::sink(other.to_string()),
    })?;

    info!(
        device_id = %batch.tags().device_id,
        records = batch.len(),
        "Wrote thermostat records"
    );
    Ok(())
}

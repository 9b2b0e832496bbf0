//! InfluxDB sink for thermostat records
//!
//! Every measurement becomes its own point carrying the device tags and a
//! single field named after the measurement. The points of a batch share one
//! timestamp so they line up as a single snapshot in queries.

use crate::config::InfluxConfig;
use crate::error::{PollerError, Result};
use crate::monitoring::{MetricsSink, RecordBatch};
use crate::services::MeasurementValue;
use async_trait::async_trait;
use futures::stream;
use influxdb2::api::write::TimestampPrecision;
use influxdb2::models::DataPoint;
use influxdb2::Client;
use tracing::debug;

/// [`MetricsSink`] writing to an InfluxDB 2.x bucket
pub struct InfluxSink {
    client: Client,
    bucket: String,
    measurement: String,
}

impl InfluxSink {
    pub fn new(config: &InfluxConfig) -> Self {
        Self {
            client: Client::new(&config.url, &config.org, &config.token),
            bucket: config.bucket.clone(),
            measurement: config.measurement.clone(),
        }
    }

    /// Convert a batch into data points, one per measurement
    pub fn to_points(&self, batch: &RecordBatch) -> Result<Vec<DataPoint>> {
        let timestamp = batch.timestamp().timestamp_millis();

        batch
            .measurements()
            .iter()
            .map(|measurement| {
                let mut point = DataPoint::builder(&self.measurement);
                for (key, value) in batch.tags().pairs() {
                    point = point.tag(key, value);
                }

                let name = measurement.name.as_str();
                point = match &measurement.value {
                    MeasurementValue::Integer(v) => point.field(name, *v),
                    MeasurementValue::Number(v) => point.field(name, *v),
                    MeasurementValue::Text(v) => point.field(name, v.clone()),
                };

                point.timestamp(timestamp).build().map_err(|e| {
                    PollerError::sink(format!("Failed to build data point for {name}: {e}"))
                })
            })
            .collect()
    }
}

#[async_trait]
impl MetricsSink for InfluxSink {
    async fn write(&self, batch: &RecordBatch) -> Result<()> {
        let points = self.to_points(batch)?;

        debug!("Writing {} data points to InfluxDB", points.len());
        self.client
            .write_with_precision(
                &self.bucket,
                stream::iter(points),
                TimestampPrecision::Milliseconds,
            )
            .await
            .map_err(|e| PollerError::sink(format!("Failed to write to InfluxDB: {e}")))
    }
}

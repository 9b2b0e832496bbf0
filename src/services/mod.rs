//! Device discovery and telemetry mapping
//!
//! [`DeviceResolver`] turns an access token into the thermostat's current
//! status document, and [`measurements::extract`] maps that document onto the
//! fixed set of named measurements the poller publishes.

pub mod device_resolver;
pub mod measurements;

pub use device_resolver::{DeviceResolver, DeviceStatus};
pub use measurements::{
    extract, extract_tags, DeviceTags, Measurement, MeasurementName, MeasurementValue,
};

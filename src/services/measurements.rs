//! Mapping of a thermostat status document onto published measurements

use crate::error::{PollerError, Result};
use crate::services::DeviceStatus;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Identifier of a published measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementName {
    TemperatureIndoor,
    TemperatureOutdoor,
    HumidityOutdoor,
    ModeSet,
    SetpointHeat,
    SetpointCool,
    Mode,
    FanRequest,
    CirculationFanRequest,
}

impl MeasurementName {
    /// Field name written to the metrics sink
    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementName::TemperatureIndoor => "temperature_indoor",
            MeasurementName::TemperatureOutdoor => "temperature_outdoor",
            MeasurementName::HumidityOutdoor => "humidity_outdoor",
            MeasurementName::ModeSet => "mode_set",
            MeasurementName::SetpointHeat => "setpoint_heat",
            MeasurementName::SetpointCool => "setpoint_cool",
            MeasurementName::Mode => "mode",
            MeasurementName::FanRequest => "fan_request",
            MeasurementName::CirculationFanRequest => "circulation_fan_request",
        }
    }
}

impl fmt::Display for MeasurementName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a single measurement
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeasurementValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl fmt::Display for MeasurementValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeasurementValue::Integer(v) => write!(f, "{v}"),
            MeasurementValue::Number(v) => write!(f, "{v}"),
            MeasurementValue::Text(v) => f.write_str(v),
        }
    }
}

/// One named value extracted from the status document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub name: MeasurementName,
    pub value: MeasurementValue,
}

/// Identity of the thermostat, attached as tags to every record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceTags {
    #[serde(rename = "deviceId")]
    pub device_id: String,
    #[serde(rename = "deviceOsVersion")]
    pub device_os_version: String,
    #[serde(rename = "macID")]
    pub mac_id: String,
}

impl DeviceTags {
    /// Tag name/value pairs in write order
    pub fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("deviceId", self.device_id.as_str()),
            ("deviceOsVersion", self.device_os_version.as_str()),
            ("macID", self.mac_id.as_str()),
        ]
    }
}

#[derive(Debug, Clone, Copy)]
enum Coercion {
    /// Truncated towards zero
    Integer,
    Number,
    /// Strings verbatim, booleans as `true`/`false`
    Text,
}

const MEASUREMENTS: [(MeasurementName, &str, Coercion); 9] = [
    (MeasurementName::TemperatureIndoor, "indoorTemperature", Coercion::Integer),
    (MeasurementName::TemperatureOutdoor, "outdoorTemperature", Coercion::Integer),
    (MeasurementName::HumidityOutdoor, "displayedOutdoorHumidity", Coercion::Integer),
    (MeasurementName::ModeSet, "changeableValues.mode", Coercion::Text),
    (MeasurementName::SetpointHeat, "changeableValues.heatSetpoint", Coercion::Number),
    (MeasurementName::SetpointCool, "changeableValues.coolSetpoint", Coercion::Number),
    (MeasurementName::Mode, "operationStatus.mode", Coercion::Text),
    (MeasurementName::FanRequest, "operationStatus.fanRequest", Coercion::Text),
    (
        MeasurementName::CirculationFanRequest,
        "operationStatus.circulationFanRequest",
        Coercion::Text,
    ),
];

/// Map a status document onto the fixed measurement set.
///
/// Output order is stable. Any missing or mistyped source field fails the
/// whole extraction; nothing is defaulted.
pub fn extract(status: &DeviceStatus) -> Result<Vec<Measurement>> {
    MEASUREMENTS
        .iter()
        .map(|(name, path, coercion)| -> Result<Measurement> {
            let value = status
                .lookup(path)
                .and_then(|raw| coerce(raw, *coercion))
                .ok_or_else(|| PollerError::malformed(*path))?;
            Ok(Measurement { name: *name, value })
        })
        .collect()
}

/// Read the identity tags of the thermostat
pub fn extract_tags(status: &DeviceStatus) -> Result<DeviceTags> {
    Ok(DeviceTags {
        device_id: tag(status, "deviceID")?,
        device_os_version: tag(status, "deviceOsVersion")?,
        mac_id: tag(status, "macID")?,
    })
}

fn tag(status: &DeviceStatus, path: &str) -> Result<String> {
    match status.lookup(path) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(PollerError::malformed(path)),
    }
}

fn coerce(raw: &Value, coercion: Coercion) -> Option<MeasurementValue> {
    match coercion {
        Coercion::Integer => truncate(raw).map(MeasurementValue::Integer),
        Coercion::Number => raw
            .as_f64()
            .filter(|v| v.is_finite())
            .map(MeasurementValue::Number),
        Coercion::Text => match raw {
            Value::String(s) => Some(MeasurementValue::Text(s.clone())),
            Value::Bool(b) => Some(MeasurementValue::Text(b.to_string())),
            _ => None,
        },
    }
}

fn truncate(raw: &Value) -> Option<i64> {
    if let Some(v) = raw.as_i64() {
        return Some(v);
    }

    let v = raw.as_f64()?.trunc();
    // i64::MAX as f64 rounds up to 2^63, which no longer fits.
    if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 {
        Some(v as i64)
    } else {
        None
    }
}

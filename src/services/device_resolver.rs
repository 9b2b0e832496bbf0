//! Location and thermostat lookup
//!
//! Only the first device of the first location is ever used. Accounts with
//! several locations or thermostats are not disambiguated.

use crate::auth::TokenPair;
use crate::client::{endpoint, HttpResponse, HttpTransport};
use crate::error::{ApiStage, PollerError, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Status document of one thermostat, as returned by the vendor
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceStatus {
    payload: Value,
}

impl DeviceStatus {
    pub fn new(payload: Value) -> Self {
        Self { payload }
    }

    /// Look up a dotted path such as `changeableValues.mode`
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.payload, |value, key| value.get(key))
            .filter(|value| !value.is_null())
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

/// Vendor identifiers come back as numbers (locations) or strings (devices)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum Identifier {
    Number(i64),
    Text(String),
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Number(n) => write!(f, "{n}"),
            Identifier::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Location {
    #[serde(rename = "locationID")]
    location_id: Identifier,
    #[serde(default)]
    devices: Vec<DeviceRef>,
}

#[derive(Debug, Deserialize)]
struct DeviceRef {
    #[serde(rename = "deviceID")]
    device_id: Identifier,
}

/// Resolves the account's thermostat and fetches its status
pub struct DeviceResolver {
    transport: Arc<dyn HttpTransport>,
    base_url: Url,
    apikey: String,
}

impl DeviceResolver {
    pub fn new(transport: Arc<dyn HttpTransport>, base_url: Url, apikey: impl Into<String>) -> Self {
        Self {
            transport,
            base_url,
            apikey: apikey.into(),
        }
    }

    /// Discover the thermostat and return its full status.
    ///
    /// Either both calls succeed and a complete status is returned, or the
    /// failing stage is reported.
    pub async fn resolve(&self, token: &TokenPair) -> Result<DeviceStatus> {
        let bearer = token.bearer();
        let (location_id, device_id) = self.locate(&bearer).await?;
        self.fetch_status(&bearer, &location_id, &device_id).await
    }

    async fn locate(&self, bearer: &str) -> Result<(String, String)> {
        let mut url = endpoint(&self.base_url, &["v2", "locations"])?;
        url.query_pairs_mut().append_pair("apikey", &self.apikey);

        info!("Requesting location from api");
        let response = self.call(ApiStage::Locations, &url, bearer).await?;

        let locations: Vec<Location> = response.json().map_err(|e| {
            PollerError::api(
                ApiStage::Locations,
                response.status,
                format!("Unexpected locations payload: {e}"),
            )
        })?;

        let location = locations.into_iter().next().ok_or_else(|| {
            PollerError::api(ApiStage::Locations, response.status, "No locations on account")
        })?;

        let device = location.devices.into_iter().next().ok_or_else(|| {
            PollerError::api(
                ApiStage::Locations,
                response.status,
                format!("Location {} has no devices", location.location_id),
            )
        })?;

        debug!(
            location_id = %location.location_id,
            device_id = %device.device_id,
            "Resolved thermostat"
        );
        Ok((location.location_id.to_string(), device.device_id.to_string()))
    }

    async fn fetch_status(
        &self,
        bearer: &str,
        location_id: &str,
        device_id: &str,
    ) -> Result<DeviceStatus> {
        let mut url = endpoint(&self.base_url, &["v2", "devices", "thermostats", device_id])?;
        url.query_pairs_mut()
            .append_pair("apikey", &self.apikey)
            .append_pair("locationId", location_id);

        info!("Requesting Info about Device from api");
        let response = self.call(ApiStage::Device, &url, bearer).await?;

        let payload: Value = response.json().map_err(|e| {
            PollerError::api(
                ApiStage::Device,
                response.status,
                format!("Device status is not JSON: {e}"),
            )
        })?;

        if !payload.is_object() {
            return Err(PollerError::api(
                ApiStage::Device,
                response.status,
                "Device status is not a JSON object",
            ));
        }

        Ok(DeviceStatus::new(payload))
    }

    async fn call(&self, stage: ApiStage, url: &Url, bearer: &str) -> Result<HttpResponse> {
        let response = self
            .transport
            .get(url, &[("Authorization", bearer), ("Accept", "application/json")])
            .await?;

        if !response.is_success() {
            return Err(PollerError::api(stage, response.status, response.body_excerpt()));
        }

        Ok(response)
    }
}

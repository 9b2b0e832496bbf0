//! Test fixtures and helpers
//!
//! Vendor payloads, configuration documents and token files shared by the
//! integration tests.

use honeywell_poller::AppConfig;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CLIENT_AUTHORIZATION: &str = "Basic Y2xpZW50OnNlY3JldA==";
pub const API_KEY: &str = "consumer-key";
pub const LOCATION_ID: i64 = 123456;
pub const DEVICE_ID: &str = "LCC-00D02DB6B9A0";
pub const MAC_ID: &str = "00D02DB6B9A0";
pub const DEVICE_OS_VERSION: &str = "eco-1.2.3";

/// Token document as returned by the OAuth endpoint
pub fn token_document(refresh_token: &str) -> Value {
    json!({
        "access_token": format!("AT-{refresh_token}"),
        "refresh_token": refresh_token,
        "expires_in": "1799",
        "token_type": "Bearer",
        "refresh_token_expires_in": "7775999"
    })
}

/// One location holding one thermostat
pub fn locations_fixture() -> Value {
    json!([
        {
            "locationID": LOCATION_ID,
            "name": "Home",
            "devices": [
                {
                    "deviceID": DEVICE_ID,
                    "deviceClass": "Thermostat",
                    "userDefinedDeviceName": "Hallway"
                }
            ]
        }
    ])
}

/// Thermostat status with the values used throughout the tests
pub fn thermostat_fixture() -> Value {
    json!({
        "deviceID": DEVICE_ID,
        "deviceOsVersion": DEVICE_OS_VERSION,
        "macID": MAC_ID,
        "isAlive": true,
        "units": "Fahrenheit",
        "indoorTemperature": 70,
        "outdoorTemperature": 45,
        "displayedOutdoorHumidity": 30,
        "changeableValues": {
            "mode": "Heat",
            "heatSetpoint": 68,
            "coolSetpoint": 75
        },
        "operationStatus": {
            "mode": "Heat",
            "fanRequest": false,
            "circulationFanRequest": false
        }
    })
}

/// Configuration pointing every endpoint at local mock servers
pub fn test_config(api_uri: &str, influx_uri: &str, healthchecks_url: Option<&str>) -> AppConfig {
    let mut document = json!({
        "Honeywell": {
            "authorization": CLIENT_AUTHORIZATION,
            "apikey": API_KEY,
            "base_url": api_uri,
            "timeout": "5s"
        },
        "Influx": {
            "url": influx_uri,
            "token": "influx-token",
            "org": "home",
            "bucket": "hvac"
        }
    });

    if let Some(url) = healthchecks_url {
        document["Healthchecks"] = json!({ "url": url, "timeout": "2s" });
    }

    AppConfig::from_json(&document.to_string()).expect("test config must be valid")
}

/// Temporary directory with a token file holding `refresh_token`
pub fn token_dir(refresh_token: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("token.json");
    write_token(&path, refresh_token);
    (dir, path)
}

pub fn write_token(path: &Path, refresh_token: &str) {
    let content = serde_json::to_string_pretty(&token_document(refresh_token)).unwrap();
    std::fs::write(path, content).expect("write token file");
}

/// Refresh token currently stored in the token file
pub fn stored_refresh_token(path: &Path) -> String {
    let content = std::fs::read_to_string(path).expect("read token file");
    let document: Value = serde_json::from_str(&content).expect("token file is JSON");
    document["refresh_token"]
        .as_str()
        .expect("refresh_token is a string")
        .to_string()
}

//! WireMock-based Honeywell API mocking infrastructure
//!
//! Simulates the OAuth, locations and thermostat endpoints of the Honeywell
//! cloud API so poll cycles can run without a real account.

use serde_json::Value;
use wiremock::{
    matchers::{body_string, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use super::test_fixtures::{
    locations_fixture, thermostat_fixture, token_document, API_KEY, CLIENT_AUTHORIZATION,
    DEVICE_ID, LOCATION_ID,
};

/// Mock Honeywell cloud API
pub struct MockHoneywellServer {
    pub server: MockServer,
}

impl MockHoneywellServer {
    /// Start an empty mock server; mount endpoints per test
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Start a mock server answering a complete, healthy poll cycle
    pub async fn healthy(old_refresh: &str, new_refresh: &str) -> Self {
        let mock = Self::start().await;
        mock.mock_token_refresh(old_refresh, 200, token_document(new_refresh))
            .await;
        mock.mock_locations(&format!("AT-{new_refresh}"), 200, locations_fixture())
            .await;
        mock.mock_thermostat(&format!("AT-{new_refresh}"), 200, thermostat_fixture())
            .await;
        mock
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Mock the refresh-token grant for `refresh_token`
    pub async fn mock_token_refresh(&self, refresh_token: &str, status: u16, body: Value) {
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(header("Authorization", CLIENT_AUTHORIZATION))
            .and(header("Content-Type", "application/x-www-form-urlencoded"))
            .and(body_string(format!(
                "grant_type=refresh_token&refresh_token={refresh_token}"
            )))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Mock the locations listing for bearer `access_token`
    pub async fn mock_locations(&self, access_token: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path("/v2/locations"))
            .and(query_param("apikey", API_KEY))
            .and(header("Authorization", format!("Bearer {access_token}").as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock the thermostat status of the fixture device
    pub async fn mock_thermostat(&self, access_token: &str, status: u16, body: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/v2/devices/thermostats/{DEVICE_ID}")))
            .and(query_param("apikey", API_KEY))
            .and(query_param("locationId", LOCATION_ID.to_string()))
            .and(header("Authorization", format!("Bearer {access_token}").as_str()))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a raw, possibly non-JSON, thermostat response
    pub async fn mock_thermostat_raw(&self, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/v2/devices/thermostats/{DEVICE_ID}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Number of requests the server received on `request_path`
    pub async fn hits(&self, request_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == request_path)
            .count()
    }
}

/// Mock healthchecks endpoint expecting `times` pings
pub async fn mock_healthchecks(times: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ping/poller"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(times)
        .mount(&server)
        .await;
    server
}

/// Mock InfluxDB 2.x write endpoint expecting `times` batch writes
pub async fn mock_influx_write(times: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v2/write"))
        .and(query_param("bucket", "hvac"))
        .and(query_param("org", "home"))
        .respond_with(ResponseTemplate::new(204))
        .expect(times)
        .mount(&server)
        .await;
    server
}

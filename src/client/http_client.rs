//! reqwest-backed [`HttpTransport`]

use crate::client::{Header, HttpResponse, HttpTransport};
use crate::error::{PollerError, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, RequestBuilder};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP transport built on a shared [`reqwest::Client`]
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests are bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(format!("honeywell-poller/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PollerError::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn execute(
        &self,
        mut request: RequestBuilder,
        headers: &[Header<'_>],
    ) -> Result<HttpResponse> {
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| {
            // the URL carries the apikey query parameter
            let e = e.without_url();
            if e.is_timeout() {
                PollerError::transport(format!("Request timed out: {e}"))
            } else {
                PollerError::transport(format!("Request failed: {e}"))
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| PollerError::transport(format!("Failed to read response body: {e}")))?;

        debug!("HTTP {} ({} bytes)", status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url, headers: &[Header<'_>]) -> Result<HttpResponse> {
        debug!("GET {}{}", url.origin().ascii_serialization(), url.path());
        self.execute(self.client.get(url.clone()), headers).await
    }

    async fn post(&self, url: &Url, headers: &[Header<'_>], body: String) -> Result<HttpResponse> {
        debug!("POST {}{}", url.origin().ascii_serialization(), url.path());
        self.execute(self.client.post(url.clone()).body(body), headers)
            .await
    }
}

//! HTTP transport used to talk to the Honeywell cloud API
//!
//! The rest of the crate only sees the [`HttpTransport`] capability: a GET or
//! POST yields a status code and a body, or a transport error. Interpreting
//! the status is left to the caller.

pub mod http_client;

use crate::error::{PollerError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

pub use http_client::ReqwestTransport;

/// Request header as a name/value pair
pub type Header<'a> = (&'a str, &'a str);

/// Raw response of a vendor call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(PollerError::from)
    }

    /// Body shortened for error messages
    pub fn body_excerpt(&self) -> String {
        const MAX: usize = 200;
        match self.body.char_indices().nth(MAX) {
            Some((idx, _)) => format!("{}...", &self.body[..idx]),
            None => self.body.clone(),
        }
    }
}

/// Build `base` + path segments, percent-encoding each segment.
///
/// Any path already present on `base` is kept as a prefix.
pub fn endpoint(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| PollerError::config(format!("{base} cannot be used as an API base URL")))?
        .pop_if_empty()
        .extend(segments);
    url.set_query(None);
    Ok(url)
}

/// Capability for issuing HTTP requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Issue a GET request
    async fn get(&self, url: &Url, headers: &[Header<'_>]) -> Result<HttpResponse>;

    /// Issue a POST request with a pre-encoded body
    async fn post(&self, url: &Url, headers: &[Header<'_>], body: String) -> Result<HttpResponse>;
}

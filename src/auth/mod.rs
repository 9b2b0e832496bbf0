//! OAuth token lifecycle for the Honeywell API
//!
//! The vendor issues a short-lived access token together with a rotating
//! refresh token. Every run exchanges the persisted refresh token for a new
//! pair and writes that pair back to disk before anything else uses it, so
//! the token file always holds the most recently issued refresh token.

pub mod refresher;
pub mod token_store;

pub use refresher::TokenRefresher;
pub use token_store::{FileTokenStore, TokenStore};

use crate::error::{PollerError, Result};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Access/refresh token pair as issued by the OAuth endpoint.
///
/// The full vendor document is kept in `raw` and is what gets persisted, so
/// vendor-defined fields survive a load/save cycle untouched.
#[derive(Clone, PartialEq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    raw: Value,
}

impl TokenPair {
    /// Validate a vendor token document
    pub fn from_value(raw: Value) -> Result<Self> {
        let access_token = required_string(&raw, "access_token")?;
        let refresh_token = required_string(&raw, "refresh_token")?;
        let expires_in = lifetime(&raw)?;

        Ok(Self {
            access_token,
            refresh_token,
            expires_in,
            raw,
        })
    }

    /// Parse a token document from JSON text
    pub fn from_json(content: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(content)?)
    }

    /// The vendor document this pair was parsed from
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Pretty-printed document as written to the token file
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.raw)?)
    }

    /// Value of the `Authorization` header for API calls
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl Serialize for TokenPair {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl TryFrom<Value> for TokenPair {
    type Error = PollerError;

    fn try_from(raw: Value) -> Result<Self> {
        Self::from_value(raw)
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

fn required_string(raw: &Value, field: &str) -> Result<String> {
    match raw.get(field).and_then(Value::as_str) {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(PollerError::malformed(field)),
    }
}

// The vendor sends `expires_in` as a string ("1799"); accept plain integers too.
fn lifetime(raw: &Value) -> Result<i64> {
    let seconds = match raw.get("expires_in") {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    seconds.ok_or_else(|| PollerError::malformed("expires_in"))
}

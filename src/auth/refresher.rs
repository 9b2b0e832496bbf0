//! Refresh-token grant against the Honeywell OAuth endpoint

use crate::auth::{TokenPair, TokenStore};
use crate::client::{endpoint, HttpTransport};
use crate::error::{PollerError, Result};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::{form_urlencoded, Url};

/// Exchanges the stored refresh token for a fresh token pair
pub struct TokenRefresher {
    transport: Arc<dyn HttpTransport>,
    token_url: Url,
    authorization: String,
}

impl TokenRefresher {
    /// Create a refresher for the API at `base_url`.
    ///
    /// `authorization` is the static client credential, not a user token.
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        base_url: &Url,
        authorization: impl Into<String>,
    ) -> Result<Self> {
        Ok(Self {
            transport,
            token_url: endpoint(base_url, &["oauth2", "token"])?,
            authorization: authorization.into(),
        })
    }

    /// Load the stored pair and refresh it
    pub async fn refresh_stored(&self, store: &dyn TokenStore) -> Result<TokenPair> {
        let stored = store.load().await?;
        self.refresh(&stored, store).await
    }

    /// Exchange `stored` for a new pair and persist it.
    ///
    /// The returned pair is already on disk. A rejected refresh never touches
    /// the store; a failed save fails the refresh.
    pub async fn refresh(&self, stored: &TokenPair, store: &dyn TokenStore) -> Result<TokenPair> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("refresh_token", &stored.refresh_token)
            .finish();

        info!("Refreshing token...");
        let response = self
            .transport
            .post(
                &self.token_url,
                &[
                    ("Authorization", self.authorization.as_str()),
                    ("Content-Type", "application/x-www-form-urlencoded"),
                ],
                body,
            )
            .await?;

        if response.status != 200 {
            warn!(status = response.status, "Token refresh rejected, keeping stored token");
            return Err(PollerError::authentication(
                response.status,
                response.body_excerpt(),
            ));
        }

        let document: Value = response.json().map_err(|e| {
            PollerError::authentication(response.status, format!("Token response is not JSON: {e}"))
        })?;

        let refreshed = TokenPair::from_value(document).map_err(|e| match e {
            PollerError::MalformedPayload { field } => PollerError::authentication(
                response.status,
                format!("Token response lacks a valid `{field}`"),
            ),
            other => other,
        })?;

        store.save(&refreshed).await.map_err(|e| match e {
            PollerError::Persistence(_) => e,
            other => PollerError::persistence(other.to_string()),
        })?;

        debug!(expires_in = refreshed.expires_in, "Token refreshed and persisted");
        Ok(refreshed)
    }
}

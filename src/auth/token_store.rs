//! Durable storage of the token pair

use crate::auth::TokenPair;
use crate::error::{PollerError, Result};
use async_trait::async_trait;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Persistence for the current token pair
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the stored pair.
    ///
    /// Fails with [`PollerError::NoTokenConfigured`] when nothing was ever stored
    /// and with [`PollerError::InvalidTokenFile`] when the stored pair is unusable.
    async fn load(&self) -> Result<TokenPair>;

    /// Replace the stored pair. Failures are reported as [`PollerError::Persistence`].
    async fn save(&self, token: &TokenPair) -> Result<()>;
}

/// Token pair kept as a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<TokenPair> {
        debug!("Loading token from {}", self.path.display());

        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PollerError::NoTokenConfigured {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        TokenPair::from_json(&content).map_err(|e| PollerError::InvalidTokenFile {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    async fn save(&self, token: &TokenPair) -> Result<()> {
        let content = token
            .to_json_pretty()
            .map_err(|e| PollerError::persistence(format!("Failed to serialize token: {e}")))?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || safe_write_all(&path, content.as_bytes()))
            .await
            .map_err(|e| PollerError::persistence(format!("Token write task failed: {e}")))?
            .map_err(|e| {
                PollerError::persistence(format!(
                    "Failed to write {}: {e}",
                    self.path.display()
                ))
            })?;

        debug!("Token persisted to {}", self.path.display());
        Ok(())
    }
}

/// Atomically replace `path` with `buf`.
///
/// The contents go to a temporary file in the same directory, are synced to
/// disk and then renamed over the destination, so a crash leaves either the
/// old or the new file in place.
fn safe_write_all(path: &Path, buf: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp_file = NamedTempFile::new_in(dir)?;
    tmp_file.write_all(buf)?;
    tmp_file.flush()?;
    tmp_file.as_file().sync_all()?;

    tmp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn token(refresh: &str) -> TokenPair {
        TokenPair::from_value(json!({
            "access_token": format!("access-for-{refresh}"),
            "refresh_token": refresh,
            "expires_in": "1799",
            "token_type": "Bearer"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_file_is_no_token_configured() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));

        let err = store.load().await.unwrap_err();
        assert!(matches!(err, PollerError::NoTokenConfigured { .. }));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));

        store.save(&token("RT-1")).await.unwrap();
        store.save(&token("RT-2")).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, token("RT-2"));
    }

    #[tokio::test]
    async fn test_save_writes_pretty_vendor_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        let store = FileTokenStore::new(&path);

        store.save(&token("RT-1")).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\n  \"refresh_token\": \"RT-1\""));
        assert!(content.contains("\"token_type\": \"Bearer\""));
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("token.json"));

        store.save(&token("RT-1")).await.unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_is_persistence_error() {
        let dir = TempDir::new().unwrap();
        let store = FileTokenStore::new(dir.path().join("missing").join("token.json"));

        let err = store.save(&token("RT-1")).await.unwrap_err();
        assert!(matches!(err, PollerError::Persistence(_)));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_invalid_token_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FileTokenStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, PollerError::InvalidTokenFile { .. }));
    }

    #[tokio::test]
    async fn test_token_file_without_refresh_token_is_not_a_payload_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token.json");
        std::fs::write(
            &path,
            r#"{ "access_token": "AT-1", "expires_in": "1799" }"#,
        )
        .unwrap();

        let err = FileTokenStore::new(&path).load().await.unwrap_err();

        match &err {
            PollerError::InvalidTokenFile { path: reported, reason } => {
                assert_eq!(reported, &path);
                assert!(reason.contains("refresh_token"));
            }
            other => panic!("expected invalid token file, got {other:?}"),
        }
        assert_eq!(err.category(), "token_file");
        assert_eq!(err.exit_code(), 11);
    }
}

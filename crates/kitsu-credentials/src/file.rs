// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-backed credential store.
//!
//! The file is a flat TOML table with the two fixed storage keys. Writes go to
//! a uniquely named, owner-only sibling file that is renamed over the target,
//! so a crash mid-write never leaves a half-written token behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kitsu_core::{CredentialPair, CredentialStore, KitsuError};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;
use tracing::{debug, warn};

#[derive(Default, Serialize, Deserialize)]
struct TokenFile {
    #[serde(rename = "kitsu_access_token", skip_serializing_if = "Option::is_none")]
    access: Option<String>,
    #[serde(rename = "kitsu_refresh_token", skip_serializing_if = "Option::is_none")]
    refresh: Option<String>,
}

/// Credential store persisted to a single file.
pub struct FileCredentialStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for FileCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileCredentialStore")
            .field("path", &self.path)
            .finish()
    }
}

impl FileCredentialStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<TokenFile, KitsuError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(TokenFile::default()),
            Err(e) => return Err(storage(e)),
        };

        match toml::from_str(&content) {
            Ok(tokens) => Ok(tokens),
            Err(e) => {
                // An unreadable file is equivalent to being logged out.
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt credential file");
                Ok(TokenFile::default())
            }
        }
    }

    async fn write(&self, tokens: &TokenFile) -> Result<(), KitsuError> {
        let body = toml::to_string(tokens).map_err(storage)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_private(&path, body.as_bytes()))
            .await
            .map_err(|e| KitsuError::Internal(format!("credential write task failed: {e}")))??;
        debug!(path = %self.path.display(), "credentials written");
        Ok(())
    }
}

/// Writes `body` to a uniquely named owner-only file next to `path`, then
/// renames it over `path`. The tokens are never readable by other users.
fn write_private(path: &Path, body: &[u8]) -> Result<(), KitsuError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(storage)?;

    let mut tmp = NamedTempFile::new_in(parent).map_err(storage)?;
    tmp.write_all(body).map_err(storage)?;
    tmp.as_file().sync_all().map_err(storage)?;
    tmp.persist(path).map_err(|e| storage(e.error))?;
    Ok(())
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn access_token(&self) -> Result<Option<SecretString>, KitsuError> {
        Ok(self.read().await?.access.map(SecretString::from))
    }

    async fn refresh_token(&self) -> Result<Option<SecretString>, KitsuError> {
        Ok(self.read().await?.refresh.map(SecretString::from))
    }

    async fn store(&self, pair: CredentialPair) -> Result<(), KitsuError> {
        let _guard = self.write_lock.lock().await;
        let mut tokens = self.read().await?;
        tokens.access = Some(pair.access_token.expose_secret().to_owned());
        if let Some(refresh) = &pair.refresh_token {
            tokens.refresh = Some(refresh.expose_secret().to_owned());
        }
        self.write(&tokens).await
    }

    async fn clear(&self) -> Result<(), KitsuError> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!(path = %self.path.display(), "credentials cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage(e)),
        }
    }
}

fn storage(e: impl std::error::Error + Send + Sync + 'static) -> KitsuError {
    KitsuError::Storage {
        source: Box::new(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

    fn store_in(dir: &tempfile::TempDir) -> FileCredentialStore {
        FileCredentialStore::new(dir.path().join("nested").join("credentials.toml"))
    }

    #[tokio::test]
    async fn missing_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn pair_round_trips_under_fixed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .store(CredentialPair::new("access-1", Some("refresh-1".into())))
            .await
            .unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains(ACCESS_TOKEN_KEY));
        assert!(raw.contains(REFRESH_TOKEN_KEY));

        // A second handle on the same file sees the same tokens.
        let reopened = FileCredentialStore::new(store.path());
        let access = reopened.access_token().await.unwrap().unwrap();
        assert_eq!(access.expose_secret(), "access-1");
    }

    #[tokio::test]
    async fn refresh_token_survives_access_only_update() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .store(CredentialPair::new("access-1", Some("refresh-1".into())))
            .await
            .unwrap();
        store.store(CredentialPair::new("access-2", None)).await.unwrap();

        let refresh = store.refresh_token().await.unwrap().unwrap();
        assert_eq!(refresh.expose_secret(), "refresh-1");
        let access = store.access_token().await.unwrap().unwrap();
        assert_eq!(access.expose_secret(), "access-2");
    }

    #[tokio::test]
    async fn clear_removes_file_and_tolerates_repeat() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store
            .store(CredentialPair::new("access-1", Some("refresh-1".into())))
            .await
            .unwrap();
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");

        let writers: Vec<_> = (0..16)
            .map(|i| {
                let path = path.clone();
                tokio::spawn(async move {
                    // Separate handles stand in for separate processes.
                    FileCredentialStore::new(&path)
                        .store(CredentialPair::new(format!("access-{i}"), Some(format!("refresh-{i}"))))
                        .await
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let access = FileCredentialStore::new(&path).access_token().await.unwrap().unwrap();
        assert!(access.expose_secret().starts_with("access-"));

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("credentials.toml")]);
    }

    #[tokio::test]
    async fn corrupt_file_reads_as_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("credentials.toml");
        std::fs::write(&path, "this is = = not toml").unwrap();
        let store = FileCredentialStore::new(&path);
        assert!(store.access_token().await.unwrap().is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.store(CredentialPair::new("a", None)).await.unwrap();
        let mode = std::fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}

// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process credential store.

use async_trait::async_trait;
use kitsu_core::{CredentialPair, CredentialStore, KitsuError};
use secrecy::SecretString;
use tokio::sync::RwLock;

use crate::duplicate;

#[derive(Default)]
struct Slots {
    access: Option<SecretString>,
    refresh: Option<SecretString>,
}

/// Credential store that lives only as long as the process.
#[derive(Default)]
pub struct MemoryCredentialStore {
    slots: RwLock<Slots>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `pair`.
    pub fn with_pair(pair: CredentialPair) -> Self {
        Self {
            slots: RwLock::new(Slots {
                access: Some(pair.access_token),
                refresh: pair.refresh_token,
            }),
        }
    }
}

impl std::fmt::Debug for MemoryCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCredentialStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn access_token(&self) -> Result<Option<SecretString>, KitsuError> {
        Ok(self.slots.read().await.access.as_ref().map(duplicate))
    }

    async fn refresh_token(&self) -> Result<Option<SecretString>, KitsuError> {
        Ok(self.slots.read().await.refresh.as_ref().map(duplicate))
    }

    async fn store(&self, pair: CredentialPair) -> Result<(), KitsuError> {
        let mut slots = self.slots.write().await;
        slots.access = Some(pair.access_token);
        if let Some(refresh) = pair.refresh_token {
            slots.refresh = Some(refresh);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), KitsuError> {
        *self.slots.write().await = Slots::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    fn exposed(s: Option<SecretString>) -> Option<String> {
        s.map(|s| s.expose_secret().to_string())
    }

    #[tokio::test]
    async fn empty_store_has_no_tokens() {
        let store = MemoryCredentialStore::new();
        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn store_overwrites_previous_pair() {
        let store = MemoryCredentialStore::with_pair(CredentialPair::new("a1", Some("r1".into())));
        store
            .store(CredentialPair::new("a2", Some("r2".into())))
            .await
            .unwrap();
        assert_eq!(exposed(store.access_token().await.unwrap()).as_deref(), Some("a2"));
        assert_eq!(exposed(store.refresh_token().await.unwrap()).as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn missing_refresh_token_keeps_stored_one() {
        let store = MemoryCredentialStore::with_pair(CredentialPair::new("a1", Some("r1".into())));
        store.store(CredentialPair::new("a2", None)).await.unwrap();
        assert_eq!(exposed(store.refresh_token().await.unwrap()).as_deref(), Some("r1"));
    }

    #[tokio::test]
    async fn clear_is_idempotent() {
        let store = MemoryCredentialStore::with_pair(CredentialPair::new("a1", Some("r1".into())));
        store.clear().await.unwrap();
        store.clear().await.unwrap();
        assert!(store.access_token().await.unwrap().is_none());
        assert!(store.refresh_token().await.unwrap().is_none());
    }
}

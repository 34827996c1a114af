// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential stores for the access/refresh token pair.
//!
//! - [`MemoryCredentialStore`] keeps the pair for the lifetime of the process.
//! - [`FileCredentialStore`] persists it under two fixed keys, the way a
//!   browser client keeps them in local storage. No expiry metadata is kept;
//!   expiry is only ever signalled by the backend answering 401.

pub mod file;
pub mod memory;

use std::sync::Arc;

use kitsu_config::model::CredentialsConfig;
use kitsu_core::CredentialStore;
use secrecy::{ExposeSecret, SecretString};

pub use file::FileCredentialStore;
pub use memory::MemoryCredentialStore;

/// Storage key of the access token.
pub const ACCESS_TOKEN_KEY: &str = "kitsu_access_token";
/// Storage key of the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "kitsu_refresh_token";

/// Opens the file-backed store configured in `[credentials]`.
pub fn open_store(config: &CredentialsConfig) -> Arc<dyn CredentialStore> {
    Arc::new(FileCredentialStore::new(&config.path))
}

/// Copies a secret without exposing it anywhere but the new box.
pub(crate) fn duplicate(secret: &SecretString) -> SecretString {
    SecretString::from(secret.expose_secret().to_owned())
}

// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Credential storage trait for the access/refresh token pair.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::KitsuError;
use crate::types::CredentialPair;

/// Process-wide store for the current credential pair.
///
/// Callers re-read the store at point of use and never cache a token across
/// calls, so a renewal performed by one request is visible to the next.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the stored access token, if any.
    async fn access_token(&self) -> Result<Option<SecretString>, KitsuError>;

    /// Returns the stored refresh token, if any.
    async fn refresh_token(&self) -> Result<Option<SecretString>, KitsuError>;

    /// Persists a new pair. A pair without a refresh token keeps the stored one.
    async fn store(&self, pair: CredentialPair) -> Result<(), KitsuError>;

    /// Removes both tokens. Clearing an empty store is not an error.
    async fn clear(&self) -> Result<(), KitsuError>;
}

// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Kitsu client.

use thiserror::Error;

/// The primary error type used across the request pipeline, the telemetry
/// channel, and credential storage.
#[derive(Debug, Error)]
pub enum KitsuError {
    /// Configuration errors (invalid URL, bad header value, missing settings).
    #[error("configuration error: {0}")]
    Config(String),

    /// The request never produced a response (DNS, connect, timeout, TLS).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// Session renewal could not be performed.
    #[error("authentication error: {0}")]
    Auth(String),

    /// User input rejected before any network call.
    #[error("validation error: {0}")]
    Validation(String),

    /// A response body or telemetry frame could not be decoded.
    #[error("decode error: {message}")]
    Decode {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Credential persistence failed.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Live channel connection failure.
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl KitsuError {
    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            KitsuError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend rejected the credentials (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

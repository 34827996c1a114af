// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Kitsu client.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Kitsu configuration.
///
/// All sections are optional and default to a local development backend.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct KitsuConfig {
    /// Process-level settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// HTTP API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Live job telemetry settings.
    #[serde(default)]
    pub telemetry: TelemetryConfig,

    /// Credential persistence settings.
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// How concurrent 401 responses coordinate their renewal round-trips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenewalPolicy {
    /// Every failing request renews on its own.
    #[default]
    Independent,
    /// Renewals are serialized; requests that lost the race reuse the winner's token.
    SingleFlight,
}

/// HTTP API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL every API path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Coordination of concurrent session renewals.
    #[serde(default)]
    pub renewal_policy: RenewalPolicy,

    /// Location of the unauthenticated entry screen.
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            renewal_policy: RenewalPolicy::default(),
            login_path: default_login_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_login_path() -> String {
    "/login".to_string()
}

/// Live telemetry channel configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelemetryConfig {
    /// Realtime base URL; job streams live under `/dashboard/parsers/ws/jobs/{id}`.
    #[serde(default = "default_ws_base_url")]
    pub ws_base_url: String,

    /// Fixed delay before reconnecting after any disconnect.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            ws_base_url: default_ws_base_url(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

fn default_ws_base_url() -> String {
    "ws://localhost:8000/api/v1".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    3000
}

/// Credential persistence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsConfig {
    /// Path of the token file.
    #[serde(default = "default_credentials_path")]
    pub path: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            path: default_credentials_path(),
        }
    }
}

fn default_credentials_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("kitsu").join("credentials.toml"))
        .unwrap_or_else(|| std::path::PathBuf::from("./kitsu-credentials.toml"))
        .to_string_lossy()
        .to_string()
}

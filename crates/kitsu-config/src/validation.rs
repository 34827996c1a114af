// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use url::Url;

use crate::diagnostic::ConfigError;
use crate::model::KitsuConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &KitsuConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.client.log_level.as_str()) {
        errors.push(invalid(format!(
            "client.log_level `{}` must be one of {}",
            config.client.log_level,
            LOG_LEVELS.join(", ")
        )));
    }

    check_url(
        &mut errors,
        "api.base_url",
        &config.api.base_url,
        &["http", "https"],
    );
    check_url(
        &mut errors,
        "telemetry.ws_base_url",
        &config.telemetry.ws_base_url,
        &["ws", "wss"],
    );

    if config.api.timeout_secs == 0 {
        errors.push(invalid("api.timeout_secs must be greater than 0".to_string()));
    }

    if !config.api.login_path.starts_with('/') {
        errors.push(invalid(format!(
            "api.login_path `{}` must start with `/`",
            config.api.login_path
        )));
    }

    if config.telemetry.reconnect_delay_ms == 0 {
        errors.push(invalid(
            "telemetry.reconnect_delay_ms must be greater than 0".to_string(),
        ));
    }

    if config.credentials.path.trim().is_empty() {
        errors.push(invalid("credentials.path must not be empty".to_string()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ConfigError>, key: &str, value: &str, schemes: &[&str]) {
    let url = match Url::parse(value) {
        Ok(url) => url,
        Err(e) => {
            errors.push(invalid(format!("{key} `{value}` is not a valid URL: {e}")));
            return;
        }
    };
    if !schemes.contains(&url.scheme()) {
        errors.push(invalid(format!(
            "{key} `{value}` must use one of the schemes {}",
            schemes.join(", ")
        )));
        return;
    }
    if url.host_str().is_none_or(str::is_empty) {
        errors.push(invalid(format!("{key} `{value}` has no host")));
    }
    if url.fragment().is_some() {
        errors.push(invalid(format!("{key} `{value}` must not carry a fragment")));
    }
}

fn invalid(message: String) -> ConfigError {
    ConfigError::Validation { message }
}

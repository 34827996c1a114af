// SPDX-FileCopyrightText: 2026 Kitsu Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./kitsu.toml` > `~/.config/kitsu/kitsu.toml` > `/etc/kitsu/kitsu.toml`
//! with environment variable overrides via `KITSU_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::KitsuConfig;

const SYSTEM_CONFIG: &str = "/etc/kitsu/kitsu.toml";
const LOCAL_CONFIG: &str = "kitsu.toml";

/// Config files in merge order, lowest precedence first.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("kitsu").join("kitsu.toml"));
    }
    paths.push(PathBuf::from(LOCAL_CONFIG));
    paths
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/kitsu/kitsu.toml`
/// 3. `~/.config/kitsu/kitsu.toml`
/// 4. `./kitsu.toml`
/// 5. `KITSU_*` environment variables
pub fn load_config() -> Result<KitsuConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<KitsuConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KitsuConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<KitsuConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(KitsuConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    config_paths().into_iter().fold(
        Figment::new().merge(Serialized::defaults(KitsuConfig::default())),
        |figment, path| figment.merge(Toml::file(path)),
    )
    .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `KITSU_API_BASE_URL` must become `api.base_url`, not `api.base.url`.
fn env_provider() -> Env {
    Env::prefixed("KITSU_").map(|key| {
        let mapped = key
            .as_str()
            .replacen("client_", "client.", 1)
            .replacen("api_", "api.", 1)
            .replacen("telemetry_", "telemetry.", 1)
            .replacen("credentials_", "credentials.", 1);
        mapped.into()
    })
}

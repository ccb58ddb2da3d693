// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./tenpo.toml` > `~/.config/tenpo/tenpo.toml` > `/etc/tenpo/tenpo.toml`,
//! with environment variable overrides via the `TENPO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TenpoConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tenpo/tenpo.toml`
/// 3. `~/.config/tenpo/tenpo.toml`
/// 4. `./tenpo.toml`
/// 5. `TENPO_*` environment variables
pub fn load_config() -> Result<TenpoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only. No files, no environment.
pub fn load_config_from_str(toml_content: &str) -> Result<TenpoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TenpoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TenpoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TenpoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment without extracting it.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TenpoConfig::default()))
        .merge(Toml::file("/etc/tenpo/tenpo.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("tenpo/tenpo.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("tenpo.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `TENPO_QUOTA_DAILY_LIMIT`
/// must become `quota.daily_limit`, not `quota.daily.limit`.
fn env_provider() -> Env {
    Env::prefixed("TENPO_").map(|key| {
        let key_str = key.as_str();
        let mapped = ["app", "gateway", "gemini", "storage", "quota", "session"]
            .iter()
            .find_map(|section| {
                key_str
                    .strip_prefix(section)
                    .and_then(|rest| rest.strip_prefix('_'))
                    .map(|field| format!("{section}.{field}"))
            })
            .unwrap_or_else(|| key_str.to_string());
        mapped.into()
    })
}

// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Tenpo interior studio.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Tenpo configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TenpoConfig {
    #[serde(default)]
    pub app: AppConfig,

    /// HTTP gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Gemini image model settings.
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// SQLite profile store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Daily generation quota.
    #[serde(default)]
    pub quota: QuotaConfig,

    /// Conversation session lifecycle.
    #[serde(default)]
    pub session: SessionConfig,
}

/// Process identity and logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "tenpo".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on every `/v1` route. `None` rejects all requests.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Header carrying the user id asserted by the identity provider.
    #[serde(default = "default_user_header")]
    pub user_header: String,

    /// Upper bound on a `/v1` request body. Photos travel base64-encoded in JSON.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            user_header: default_user_header(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_user_header() -> String {
    "x-user-id".to_string()
}

// 20 MiB
fn default_max_body_bytes() -> usize {
    20 * 1024 * 1024
}

/// Gemini API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeminiConfig {
    /// API key. `None` falls back to `GEMINI_API_KEY`, then `GOOGLE_GEMINI_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Image-capable model every new conversation is bound to.
    #[serde(default = "default_model")]
    pub model: String,

    /// Retries on 429/500/503 before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Upper bound on a single generation call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: default_api_base(),
            model: default_model(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_max_retries() -> u32 {
    1
}

fn default_timeout_secs() -> u64 {
    120
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,

    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("tenpo").join("tenpo.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("tenpo.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Daily generation quota configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QuotaConfig {
    /// Image generations allowed per user per calendar day.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,

    /// Offset from UTC, in minutes, of the timezone whose midnight resets the quota.
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            daily_limit: default_daily_limit(),
            utc_offset_minutes: default_utc_offset_minutes(),
        }
    }
}

fn default_daily_limit() -> u32 {
    20
}

// JST
fn default_utc_offset_minutes() -> i32 {
    9 * 60
}

/// Conversation session lifecycle configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Sessions idle longer than this are evicted.
    #[serde(default = "default_idle_ttl_secs")]
    pub idle_ttl_secs: u64,

    /// Upper bound on live sessions; the least recently used is evicted beyond it.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_ttl_secs: default_idle_ttl_secs(),
            max_sessions: default_max_sessions(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

fn default_idle_ttl_secs() -> u64 {
    3600
}

fn default_max_sessions() -> usize {
    1024
}

fn default_sweep_interval_secs() -> u64 {
    60
}

// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::TenpoConfig;

/// Largest real-world UTC offset, in minutes (UTC+14).
const MAX_UTC_OFFSET_MINUTES: u32 = 14 * 60;

/// Smallest accepted request body limit. Anything lower cannot carry a photo.
const MIN_BODY_BYTES: usize = 64 * 1024;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &TenpoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.gateway.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("gateway.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.gateway.user_header.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gateway.user_header must not be empty".to_string(),
        });
    }

    if config.gateway.max_body_bytes < MIN_BODY_BYTES {
        errors.push(ConfigError::Validation {
            message: format!(
                "gateway.max_body_bytes must be at least {MIN_BODY_BYTES}, got {}",
                config.gateway.max_body_bytes
            ),
        });
    }

    if let Some(token) = &config.gateway.bearer_token
        && token.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "gateway.bearer_token must not be blank when set".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.gemini.model.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "gemini.model must not be empty".to_string(),
        });
    }

    if config.gemini.timeout_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "gemini.timeout_secs must be at least 1".to_string(),
        });
    }

    if config.quota.daily_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "quota.daily_limit must be at least 1".to_string(),
        });
    }

    if config.quota.utc_offset_minutes.unsigned_abs() > MAX_UTC_OFFSET_MINUTES {
        errors.push(ConfigError::Validation {
            message: format!(
                "quota.utc_offset_minutes must be within ±{MAX_UTC_OFFSET_MINUTES}, got {}",
                config.quota.utc_offset_minutes
            ),
        });
    }

    if config.session.idle_ttl_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "session.idle_ttl_secs must be at least 1".to_string(),
        });
    }

    if config.session.max_sessions == 0 {
        errors.push(ConfigError::Validation {
            message: "session.max_sessions must be at least 1".to_string(),
        });
    }

    if config.session.sweep_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "session.sweep_interval_secs must be at least 1".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

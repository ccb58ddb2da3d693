// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tenpo interior studio.

use thiserror::Error;

/// The primary error type used across adapter traits and core operations.
///
/// A quota rejection is deliberately absent here: running out of daily
/// generations is a routine outcome, modelled by the studio's outcome type.
#[derive(Debug, Error)]
pub enum TenpoError {
    /// Configuration errors (invalid TOML, missing credentials, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Generation provider errors (API failure, malformed response, safety block).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The session id was never issued, or has expired.
    #[error("invalid session: {session_id}")]
    InvalidSession { session_id: String },

    /// Quota could not be read. Callers must treat this as "not allowed".
    #[error("quota lookup failed for {user_id}: {message}")]
    QuotaLookup { user_id: String, message: String },

    /// Quota could not be recorded after a successful generation.
    #[error("quota write failed for {user_id}: {message}")]
    QuotaWrite { user_id: String, message: String },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TenpoError {
    /// Convenience constructor for provider errors without an underlying cause.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
            source: None,
        }
    }
}

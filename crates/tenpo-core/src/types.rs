// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the studio.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier for an interior-editing conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of the signed-in user, supplied by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
    Gateway,
}

// --- Multimodal parts ---

/// Base64-encoded image bytes with their mime type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Renders the image as `data:{mime};base64,{data}`.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// One element of a multimodal message, sent or received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPart {
    Text(String),
    InlineImage(InlineImage),
}

/// One alternative returned by the generation provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Candidate {
    pub parts: Vec<ContentPart>,
    pub finish_reason: Option<String>,
}

/// Provider response: zero or more candidates, each with zero or more parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderResponse {
    pub candidates: Vec<Candidate>,
}

/// Normalized outcome of one generation: at most one text and one image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Data URI of the generated image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

// --- Quota ---

/// Stored quota counters for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuotaRow {
    pub daily_generation_count: u32,
    /// Day key (`YYYY-MM-DD`) in the quota timezone, `None` before the first generation.
    pub last_generation_date: Option<String>,
}

/// Answer to "may this user generate right now".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuotaStatus {
    pub allowed: bool,
    pub remaining: u32,
    pub limit: u32,
    pub reset_at: DateTime<FixedOffset>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_base64_data_uri() {
        let image = InlineImage::new("image/png", "iVBORw0KGgo=");
        assert_eq!(image.to_data_uri(), "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn generation_result_omits_absent_fields() {
        let json = serde_json::to_value(GenerationResult::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));

        let json = serde_json::to_value(GenerationResult {
            text: Some("ok".into()),
            image: None,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"text": "ok"}));
    }

    #[test]
    fn ids_display_their_inner_value() {
        assert_eq!(SessionId("s-1".into()).to_string(), "s-1");
        assert_eq!(UserId("u-1".into()).to_string(), "u-1");
    }
}

// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the Gemini `generateContent` REST endpoint.

use serde::{Deserialize, Serialize};
use tenpo_core::{Candidate, ContentPart, InlineImage, ProviderResponse};

/// Request body for `models/{model}:generateContent`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<String>,
}

impl GenerationConfig {
    /// Ask for both a text and an image reply.
    pub fn text_and_image() -> Self {
        Self {
            response_modalities: vec!["TEXT".into(), "IMAGE".into()],
        }
    }
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    pub fn user(parts: Vec<Part>) -> Self {
        Self {
            role: Some("user".into()),
            parts,
        }
    }
}

/// A content part. Exactly one payload field is expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, alias = "inline_data", skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
    /// Set on reasoning summaries, which are never surfaced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    #[serde(alias = "mime_type")]
    pub mime_type: String,
    pub data: String,
}

impl From<&ContentPart> for Part {
    fn from(part: &ContentPart) -> Self {
        match part {
            ContentPart::Text(text) => Part {
                text: Some(text.clone()),
                ..Default::default()
            },
            ContentPart::InlineImage(image) => Part {
                inline_data: Some(Blob {
                    mime_type: image.mime_type.clone(),
                    data: image.data.clone(),
                }),
                ..Default::default()
            },
        }
    }
}

impl Part {
    /// Converts a reply part, dropping thoughts and payload-less parts.
    pub fn to_content_part(&self) -> Option<ContentPart> {
        if self.thought == Some(true) {
            return None;
        }
        if let Some(blob) = &self.inline_data
            && !blob.data.is_empty()
        {
            return Some(ContentPart::InlineImage(InlineImage::new(
                blob.mime_type.clone(),
                blob.data.clone(),
            )));
        }
        self.text.clone().map(ContentPart::Text)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<ApiCandidate>,
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCandidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default)]
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Converts into the provider-neutral response shape.
    pub fn to_provider_response(&self) -> ProviderResponse {
        let candidates = self
            .candidates
            .iter()
            .map(|c| Candidate {
                parts: c
                    .content
                    .iter()
                    .flat_map(|content| content.parts.iter())
                    .filter_map(Part::to_content_part)
                    .collect(),
                finish_reason: c.finish_reason.clone(),
            })
            .collect();
        ProviderResponse { candidates }
    }

    /// The model turn to append to conversation history, if any.
    pub fn model_turn(&self) -> Option<Content> {
        let content = self.candidates.first()?.content.as_ref()?;
        Some(Content {
            role: Some("model".into()),
            parts: content.parts.clone(),
        })
    }
}

/// Error body returned by the Google API.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub code: Option<u16>,
    pub message: String,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_serializes_camel_case() {
        let request = GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::from(&ContentPart::Text("hi".into())),
                Part::from(&ContentPart::InlineImage(InlineImage::new("image/png", "AAA"))),
            ])],
            generation_config: GenerationConfig::text_and_image(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "hi"},
                        {"inlineData": {"mimeType": "image/png", "data": "AAA"}}
                    ]
                }],
                "generationConfig": {"responseModalities": ["TEXT", "IMAGE"]}
            })
        );
    }

    #[test]
    fn response_accepts_snake_case_inline_data() {
        let body = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"text": "done"},
                    {"inline_data": {"mime_type": "image/jpeg", "data": "QUJD"}}
                ]},
                "finishReason": "STOP"
            }]
        });
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        let converted = response.to_provider_response();
        assert_eq!(
            converted.candidates[0].parts,
            vec![
                ContentPart::Text("done".into()),
                ContentPart::InlineImage(InlineImage::new("image/jpeg", "QUJD")),
            ]
        );
        assert_eq!(converted.candidates[0].finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn thoughts_and_empty_parts_are_dropped() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "thinking...", "thought": true},
                    {},
                    {"inlineData": {"mimeType": "image/png", "data": ""}},
                    {"text": "visible"}
                ]}
            }]
        });
        let response: GenerateContentResponse = serde_json::from_value(body).unwrap();
        assert_eq!(
            response.to_provider_response().candidates[0].parts,
            vec![ContentPart::Text("visible".into())]
        );
    }

    #[test]
    fn empty_body_has_no_candidates_and_no_model_turn() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.to_provider_response().candidates.is_empty());
        assert!(response.model_turn().is_none());
    }
}

// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folds a provider response into a [`GenerationResult`].

use tenpo_core::{ContentPart, GenerationResult, ProviderResponse};

/// Normalized response plus whether it carried an image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Normalized {
    pub result: GenerationResult,
    /// True when an inline image part was kept; gates the quota increment.
    pub has_generated_image: bool,
}

/// Scans the first candidate's parts in order.
///
/// The last non-empty text part wins, as does the last image part with a
/// mime type and payload. Later candidates are ignored.
pub fn normalize(response: &ProviderResponse) -> Normalized {
    let Some(candidate) = response.candidates.first() else {
        return Normalized::default();
    };

    candidate
        .parts
        .iter()
        .fold(Normalized::default(), |mut acc, part| {
            match part {
                ContentPart::Text(text) if !text.is_empty() => {
                    acc.result.text = Some(text.clone());
                }
                ContentPart::InlineImage(image)
                    if !image.mime_type.is_empty() && !image.data.is_empty() =>
                {
                    acc.result.image = Some(image.to_data_uri());
                    acc.has_generated_image = true;
                }
                _ => {}
            }
            acc
        })
}

#[cfg(test)]
mod tests {
    use tenpo_core::{Candidate, InlineImage};

    use super::*;

    fn response(parts: Vec<ContentPart>) -> ProviderResponse {
        ProviderResponse {
            candidates: vec![Candidate {
                parts,
                finish_reason: Some("STOP".into()),
            }],
        }
    }

    fn image(data: &str) -> ContentPart {
        ContentPart::InlineImage(InlineImage::new("image/png", data))
    }

    #[test]
    fn last_text_part_wins() {
        let normalized = normalize(&response(vec![
            ContentPart::Text("A".into()),
            image("AAAA"),
            ContentPart::Text("B".into()),
        ]));
        assert_eq!(normalized.result.text.as_deref(), Some("B"));
        assert_eq!(
            normalized.result.image.as_deref(),
            Some("data:image/png;base64,AAAA")
        );
        assert!(normalized.has_generated_image);
    }

    #[test]
    fn last_image_part_wins() {
        let normalized = normalize(&response(vec![image("FIRST"), image("SECOND")]));
        assert_eq!(
            normalized.result.image.as_deref(),
            Some("data:image/png;base64,SECOND")
        );
    }

    #[test]
    fn text_only_response_has_no_image() {
        let normalized = normalize(&response(vec![ContentPart::Text("only".into())]));
        assert!(!normalized.has_generated_image);
        assert!(normalized.result.image.is_none());
    }

    #[test]
    fn empty_response_is_a_valid_empty_result() {
        assert_eq!(normalize(&ProviderResponse::default()), Normalized::default());
        assert_eq!(normalize(&response(vec![])), Normalized::default());
    }

    #[test]
    fn empty_text_and_payloadless_images_are_skipped() {
        let normalized = normalize(&response(vec![
            ContentPart::Text("kept".into()),
            ContentPart::Text(String::new()),
            ContentPart::InlineImage(InlineImage::new("image/png", "")),
        ]));
        assert_eq!(normalized.result.text.as_deref(), Some("kept"));
        assert!(!normalized.has_generated_image);
    }

    #[test]
    fn only_the_first_candidate_is_read() {
        let mut resp = response(vec![ContentPart::Text("first".into())]);
        resp.candidates.push(Candidate {
            parts: vec![image("IGNORED")],
            finish_reason: None,
        });
        let normalized = normalize(&resp);
        assert_eq!(normalized.result.text.as_deref(), Some("first"));
        assert!(!normalized.has_generated_image);
    }
}

// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation provider for deterministic testing.
//!
//! `MockProvider` implements `GenerationProvider` with pre-configured
//! responses shared by every conversation it opens, and counts every send
//! so tests can assert that no provider call was made.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tenpo_core::{
    AdapterType, Candidate, ContentPart, Conversation, GenerationProvider, HealthStatus,
    InlineImage, PluginAdapter, ProviderResponse, TenpoError,
};

/// Response with a single text part.
pub fn text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        candidates: vec![Candidate {
            parts: vec![ContentPart::Text(text.to_string())],
            finish_reason: Some("STOP".to_string()),
        }],
    }
}

/// Response with an optional text part followed by one PNG image.
pub fn image_response(text: Option<&str>, data: &str) -> ProviderResponse {
    let mut parts = Vec::new();
    if let Some(text) = text {
        parts.push(ContentPart::Text(text.to_string()));
    }
    parts.push(ContentPart::InlineImage(InlineImage::new("image/png", data)));
    ProviderResponse {
        candidates: vec![Candidate {
            parts,
            finish_reason: Some("STOP".to_string()),
        }],
    }
}

#[derive(Default)]
struct Shared {
    responses: Mutex<VecDeque<Result<ProviderResponse, String>>>,
    sent: Mutex<Vec<Vec<ContentPart>>>,
    calls: AtomicUsize,
    conversations: AtomicUsize,
    unavailable: AtomicBool,
    delay: std::sync::Mutex<Option<Duration>>,
}

/// A mock generation provider that returns queued responses.
///
/// Responses are popped from a FIFO queue. When the queue is empty, a
/// default "mock response" text is returned.
#[derive(Clone, Default)]
pub struct MockProvider {
    shared: Arc<Shared>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: Vec<ProviderResponse>) -> Self {
        Self {
            shared: Arc::new(Shared {
                responses: Mutex::new(responses.into_iter().map(Ok).collect()),
                ..Shared::default()
            }),
        }
    }

    pub async fn push_response(&self, response: ProviderResponse) {
        self.shared.responses.lock().await.push_back(Ok(response));
    }

    /// Queue a provider failure with `message`.
    pub async fn push_error(&self, message: &str) {
        self.shared
            .responses
            .lock()
            .await
            .push_back(Err(message.to_string()));
    }

    /// Make every send sleep for `delay` first.
    pub fn set_delay(&self, delay: Duration) {
        *self.shared.delay.lock().unwrap_or_else(|e| e.into_inner()) = Some(delay);
    }

    /// Make `create_conversation` fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.shared.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `send` calls across all conversations.
    pub fn call_count(&self) -> usize {
        self.shared.calls.load(Ordering::SeqCst)
    }

    pub fn conversation_count(&self) -> usize {
        self.shared.conversations.load(Ordering::SeqCst)
    }

    /// Parts of every send, in call order.
    pub async fn sent_parts(&self) -> Vec<Vec<ContentPart>> {
        self.shared.sent.lock().await.clone()
    }
}

struct MockConversation {
    model: String,
    shared: Arc<Shared>,
}

#[async_trait]
impl Conversation for MockConversation {
    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, parts: Vec<ContentPart>) -> Result<ProviderResponse, TenpoError> {
        self.shared.calls.fetch_add(1, Ordering::SeqCst);
        self.shared.sent.lock().await.push(parts);

        let delay = *self.shared.delay.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.shared.responses.lock().await.pop_front();
        match next {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(TenpoError::provider(message)),
            None => Ok(text_response("mock response")),
        }
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, TenpoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TenpoError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationProvider for MockProvider {
    async fn create_conversation(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn Conversation>, TenpoError> {
        if self.shared.unavailable.load(Ordering::SeqCst) {
            return Err(TenpoError::provider("mock provider unavailable"));
        }
        self.shared.conversations.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockConversation {
            model: model_id.to_string(),
            shared: Arc::clone(&self.shared),
        }))
    }
}

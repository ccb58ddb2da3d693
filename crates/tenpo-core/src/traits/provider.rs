// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation provider traits for multimodal image-editing models.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TenpoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ContentPart, ProviderResponse};

/// A stateful multimodal conversation held by the provider.
///
/// Every successful [`send`](Conversation::send) appends the user turn and
/// the model reply to the conversation history.
#[async_trait]
pub trait Conversation: Send + Sync {
    /// Model identifier this conversation is bound to.
    fn model(&self) -> &str;

    /// Sends one user turn and returns the provider's reply.
    async fn send(&self, parts: Vec<ContentPart>) -> Result<ProviderResponse, TenpoError>;
}

/// Adapter that opens conversations with a generation model.
#[async_trait]
pub trait GenerationProvider: PluginAdapter {
    /// Opens a new, empty conversation bound to `model_id`.
    async fn create_conversation(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn Conversation>, TenpoError>;
}

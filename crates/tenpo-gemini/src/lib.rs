// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google Gemini image-model provider for the Tenpo interior studio.
//!
//! Implements [`GenerationProvider`] over the `generateContent` REST API.
//! Each [`GeminiChat`] keeps its own turn history client-side and replays it
//! on every call, which is how the API models a multi-turn conversation.

pub mod client;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tenpo_config::TenpoConfig;
use tenpo_core::{
    AdapterType, ContentPart, Conversation, GenerationProvider, HealthStatus, PluginAdapter,
    ProviderResponse, TenpoError,
};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::client::GeminiClient;
use crate::types::{Content, GenerateContentRequest, GenerationConfig, Part};

/// Environment variables consulted, in order, when no key is configured.
const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_GEMINI_API_KEY"];

/// Gemini provider implementing [`GenerationProvider`].
///
/// API key resolution order: config, `GEMINI_API_KEY`, `GOOGLE_GEMINI_API_KEY`, error.
pub struct GeminiProvider {
    client: Arc<GeminiClient>,
}

impl GeminiProvider {
    /// Creates a provider from the `[gemini]` configuration section.
    ///
    /// A missing API key is a configuration error, raised here at startup.
    pub fn new(config: &TenpoConfig) -> Result<Self, TenpoError> {
        let api_key = resolve_api_key(&config.gemini.api_key, |name| std::env::var(name).ok())?;
        let client = GeminiClient::new(
            &api_key,
            &config.gemini.api_base,
            config.gemini.max_retries,
            Duration::from_secs(config.gemini.timeout_secs),
        )?;

        info!(
            model = %config.gemini.model,
            api_base = %config.gemini.api_base,
            "Gemini provider initialized"
        );

        Ok(Self {
            client: Arc::new(client),
        })
    }
}

#[async_trait]
impl PluginAdapter for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, TenpoError> {
        // Probing the API would spend image quota on the provider side.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TenpoError> {
        debug!("Gemini provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl GenerationProvider for GeminiProvider {
    async fn create_conversation(
        &self,
        model_id: &str,
    ) -> Result<Arc<dyn Conversation>, TenpoError> {
        if model_id.trim().is_empty() {
            return Err(TenpoError::Config("model id must not be empty".into()));
        }
        Ok(Arc::new(GeminiChat::new(self.client.clone(), model_id)))
    }
}

/// One multi-turn conversation with a Gemini model.
pub struct GeminiChat {
    client: Arc<GeminiClient>,
    model: String,
    history: Mutex<Vec<Content>>,
}

impl GeminiChat {
    pub fn new(client: Arc<GeminiClient>, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Number of turns (user and model) recorded so far.
    pub async fn turns(&self) -> usize {
        self.history.lock().await.len()
    }
}

#[async_trait]
impl Conversation for GeminiChat {
    fn model(&self) -> &str {
        &self.model
    }

    /// The history lock is held for the whole call, so concurrent sends on
    /// one chat run one after another and history never interleaves.
    async fn send(&self, parts: Vec<ContentPart>) -> Result<ProviderResponse, TenpoError> {
        let mut history = self.history.lock().await;

        let user_turn = Content::user(parts.iter().map(Part::from).collect());
        let mut contents = history.clone();
        contents.push(user_turn.clone());

        let request = GenerateContentRequest {
            contents,
            generation_config: GenerationConfig::text_and_image(),
        };
        let response = self.client.generate_content(&self.model, &request).await?;

        if response.candidates.is_empty()
            && let Some(reason) = response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.as_deref())
        {
            warn!(model = %self.model, reason, "prompt blocked by provider");
            return Err(TenpoError::provider(format!("prompt blocked: {reason}")));
        }

        history.push(user_turn);
        if let Some(model_turn) = response.model_turn() {
            history.push(model_turn);
        }
        debug!(model = %self.model, turns = history.len(), "conversation advanced");

        Ok(response.to_provider_response())
    }
}

fn resolve_api_key(
    config_key: &Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String, TenpoError> {
    if let Some(key) = config_key
        && !key.trim().is_empty()
    {
        return Ok(key.clone());
    }

    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| env(name))
        .find(|value| !value.trim().is_empty())
        .ok_or_else(|| {
            TenpoError::Config(
                "Gemini API key not found. Set gemini.api_key in config or GEMINI_API_KEY / GOOGLE_GEMINI_API_KEY environment variable.".into(),
            )
        })
}

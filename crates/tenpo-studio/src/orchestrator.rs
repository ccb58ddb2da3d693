// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation orchestrator.
//!
//! One call runs strictly in order: quota check, session resolve, send
//! under the session lock, normalize, conditional increment, quota
//! re-check. Every failure is folded into a [`GenerationOutcome`]; nothing
//! escapes the boundary as an error.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tenpo_core::{ContentPart, InlineImage, QuotaStatus, SessionId, TenpoError, UserId};
use tenpo_quota::QuotaLedger;
use tracing::{debug, error, info, warn};

use crate::catalog;
use crate::composer::{self, ChatInstruction, DesignPreferences};
use crate::normalizer::normalize;
use crate::outcome::{FailureKind, GenerationOutcome};
use crate::registry::ConversationRegistry;

/// Phases of a single generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    QuotaChecking,
    /// Quota exhausted; no provider call is made.
    Rejected,
    Sending,
    Parsing,
    CountUpdating,
    Done,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::QuotaChecking => write!(f, "quota_checking"),
            Phase::Rejected => write!(f, "rejected"),
            Phase::Sending => write!(f, "sending"),
            Phase::Parsing => write!(f, "parsing"),
            Phase::CountUpdating => write!(f, "count_updating"),
            Phase::Done => write!(f, "done"),
        }
    }
}

struct CallState<'a> {
    session_id: &'a SessionId,
    phase: Phase,
}

impl<'a> CallState<'a> {
    fn new(session_id: &'a SessionId) -> Self {
        Self {
            session_id,
            phase: Phase::Idle,
        }
    }

    fn advance(&mut self, next: Phase) {
        debug!(session_id = %self.session_id, from = %self.phase, to = %next, "generation phase");
        self.phase = next;
    }
}

/// A chat turn: the base instruction, selected rule ids, attached images.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub instruction: ChatInstruction,
    #[serde(default)]
    pub rule_ids: Vec<String>,
    #[serde(default)]
    pub images: Vec<InlineImage>,
}

/// Central coordinator between the ledger, the registry, and the provider.
pub struct Orchestrator {
    registry: Arc<ConversationRegistry>,
    ledger: QuotaLedger,
    timeout: Duration,
}

impl Orchestrator {
    pub fn new(registry: Arc<ConversationRegistry>, ledger: QuotaLedger, timeout: Duration) -> Self {
        Self {
            registry,
            ledger,
            timeout,
        }
    }

    pub fn registry(&self) -> &Arc<ConversationRegistry> {
        &self.registry
    }

    pub fn ledger(&self) -> &QuotaLedger {
        &self.ledger
    }

    pub async fn create_session(&self, user_id: &UserId) -> Result<SessionId, TenpoError> {
        self.registry.create_session(user_id).await
    }

    pub async fn quota_info(&self, user_id: &UserId) -> Result<QuotaStatus, TenpoError> {
        self.ledger.check_quota(user_id).await
    }

    /// First design pass: style prompt plus the uploaded base photo.
    pub async fn generate_design(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        selections: &[String],
        preferences: &DesignPreferences,
        base_image: InlineImage,
    ) -> GenerationOutcome {
        let prompt = composer::compose_style_prompt(selections, preferences);
        self.generate(user_id, session_id, prompt, vec![base_image])
            .await
    }

    /// Sends `prompt` and `images` verbatim as one user turn.
    pub async fn generate_image(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        prompt: &str,
        images: Vec<InlineImage>,
    ) -> GenerationOutcome {
        self.generate(user_id, session_id, prompt.to_string(), images)
            .await
    }

    /// Composes a chat turn server-side, then generates.
    ///
    /// Any unknown rule id rejects the request before the quota is touched.
    pub async fn chat(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        request: ChatRequest,
    ) -> GenerationOutcome {
        let rules = match catalog::resolve(&request.rule_ids) {
            Ok(rules) => rules,
            Err(unknown) => {
                warn!(session_id = %session_id, rule_id = %unknown, "unknown rule id in chat request");
                return GenerationOutcome::Failed {
                    kind: FailureKind::InvalidRequest,
                    message: format!("不明な規定項目です: {unknown}"),
                };
            }
        };
        let prompt =
            composer::compose_chat_message(&request.instruction, &rules, !request.images.is_empty());
        self.generate(user_id, session_id, prompt, request.images)
            .await
    }

    async fn generate(
        &self,
        user_id: &UserId,
        session_id: &SessionId,
        prompt: String,
        images: Vec<InlineImage>,
    ) -> GenerationOutcome {
        let mut call = CallState::new(session_id);

        if prompt.is_empty() && images.is_empty() {
            debug!(session_id = %session_id, "empty generation request");
            return GenerationOutcome::failed(FailureKind::InvalidRequest);
        }

        call.advance(Phase::QuotaChecking);
        let status = match self.ledger.check_quota(user_id).await {
            Ok(status) => status,
            Err(e) => return GenerationOutcome::from(&e),
        };
        if !status.allowed {
            call.advance(Phase::Rejected);
            return GenerationOutcome::QuotaExceeded {
                reset_at: status.reset_at,
            };
        }

        call.advance(Phase::Sending);
        let session = match self.registry.resolve(user_id, session_id) {
            Ok(session) => session,
            Err(e) => {
                info!(session_id = %session_id, user_id = %user_id, "generation on invalid session");
                return GenerationOutcome::from(&e);
            }
        };

        let mut parts = Vec::with_capacity(images.len() + 1);
        if !prompt.is_empty() {
            parts.push(ContentPart::Text(prompt));
        }
        parts.extend(images.into_iter().map(ContentPart::InlineImage));
        let part_count = parts.len();

        let response = {
            let _guard = session.lock().await;
            match tokio::time::timeout(self.timeout, session.conversation().send(parts)).await {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!(session_id = %session_id, error = %e, "generation provider call failed");
                    return GenerationOutcome::from(&e);
                }
                Err(_) => {
                    warn!(
                        session_id = %session_id,
                        timeout_secs = self.timeout.as_secs(),
                        "generation provider call timed out"
                    );
                    return GenerationOutcome::from(&TenpoError::Timeout {
                        duration: self.timeout,
                    });
                }
            }
        };
        debug!(session_id = %session_id, parts = part_count, candidates = response.candidates.len(), "provider replied");

        call.advance(Phase::Parsing);
        let normalized = normalize(&response);

        if normalized.has_generated_image {
            call.advance(Phase::CountUpdating);
            if let Err(e) = self.ledger.increment_generation(user_id).await {
                error!(
                    user_id = %user_id,
                    session_id = %session_id,
                    error = %e,
                    "generation produced but quota increment failed"
                );
            }
        }

        let remaining = match self.ledger.check_quota(user_id).await {
            Ok(status) => Some(status.remaining),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "post-generation quota re-check failed");
                None
            }
        };

        call.advance(Phase::Done);
        GenerationOutcome::Completed {
            data: normalized.result,
            remaining,
        }
    }
}

// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation registry.
//!
//! Maps opaque session ids to provider conversation handles. Entries are
//! bound to the user who created them, expire after an idle TTL, and the
//! map is capped at `max_sessions` with least-recently-used eviction.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tenpo_config::model::SessionConfig;
use tenpo_core::{Conversation, GenerationProvider, SessionId, TenpoError, UserId};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

struct SessionEntry {
    owner: UserId,
    conversation: Arc<dyn Conversation>,
    send_lock: Arc<Mutex<()>>,
    created_at: DateTime<Utc>,
    last_access: Instant,
}

/// A resolved session, detached from the map.
#[derive(Clone)]
pub struct SessionHandle {
    pub id: SessionId,
    pub created_at: DateTime<Utc>,
    conversation: Arc<dyn Conversation>,
    send_lock: Arc<Mutex<()>>,
}

impl SessionHandle {
    pub fn conversation(&self) -> &Arc<dyn Conversation> {
        &self.conversation
    }

    /// Serializes sends on this session. Hold the guard across the provider call.
    pub async fn lock(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.send_lock).lock_owned().await
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.id)
            .field("model", &self.conversation.model())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Process-wide session store, injected into the orchestrator.
pub struct ConversationRegistry {
    provider: Arc<dyn GenerationProvider>,
    model: String,
    sessions: DashMap<SessionId, SessionEntry>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl ConversationRegistry {
    pub fn new(
        provider: Arc<dyn GenerationProvider>,
        model: impl Into<String>,
        config: &SessionConfig,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            sessions: DashMap::new(),
            idle_ttl: Duration::from_secs(config.idle_ttl_secs),
            max_sessions: config.max_sessions.max(1),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Opens a provider conversation and registers it under a fresh id.
    ///
    /// Provider failures propagate unchanged.
    pub async fn create_session(&self, owner: &UserId) -> Result<SessionId, TenpoError> {
        let conversation = self.provider.create_conversation(&self.model).await?;

        if self.sessions.len() >= self.max_sessions {
            self.sweep_expired();
        }
        while self.sessions.len() >= self.max_sessions {
            if !self.evict_least_recent() {
                break;
            }
        }

        let id = SessionId(uuid::Uuid::new_v4().to_string());
        self.sessions.insert(
            id.clone(),
            SessionEntry {
                owner: owner.clone(),
                conversation,
                send_lock: Arc::new(Mutex::new(())),
                created_at: Utc::now(),
                last_access: Instant::now(),
            },
        );
        info!(session_id = %id, user_id = %owner, model = %self.model, "session created");
        Ok(id)
    }

    /// Looks up a session for `owner` and refreshes its access time.
    ///
    /// Unknown, idle-expired, and foreign sessions are all
    /// [`TenpoError::InvalidSession`].
    pub fn resolve(&self, owner: &UserId, id: &SessionId) -> Result<SessionHandle, TenpoError> {
        let invalid = || TenpoError::InvalidSession {
            session_id: id.0.clone(),
        };

        {
            let Some(mut entry) = self.sessions.get_mut(id) else {
                debug!(session_id = %id, "session not found");
                return Err(invalid());
            };
            if entry.owner != *owner {
                warn!(session_id = %id, user_id = %owner, "session belongs to another user");
                return Err(invalid());
            }
            if entry.last_access.elapsed() <= self.idle_ttl {
                entry.last_access = Instant::now();
                return Ok(SessionHandle {
                    id: id.clone(),
                    created_at: entry.created_at,
                    conversation: Arc::clone(&entry.conversation),
                    send_lock: Arc::clone(&entry.send_lock),
                });
            }
        }

        let ttl = self.idle_ttl;
        self.sessions
            .remove_if(id, |_, entry| entry.last_access.elapsed() > ttl);
        debug!(session_id = %id, "session expired on access");
        Err(invalid())
    }

    /// Removes a session owned by `owner`. Returns whether one was removed.
    pub fn end_session(&self, owner: &UserId, id: &SessionId) -> bool {
        let removed = self
            .sessions
            .remove_if(id, |_, entry| entry.owner == *owner)
            .is_some();
        if removed {
            info!(session_id = %id, "session ended");
        }
        removed
    }

    /// Drops every session idle longer than the TTL. Returns how many went.
    pub fn sweep_expired(&self) -> usize {
        let before = self.sessions.len();
        let ttl = self.idle_ttl;
        self.sessions
            .retain(|_, entry| entry.last_access.elapsed() <= ttl);
        let swept = before.saturating_sub(self.sessions.len());
        if swept > 0 {
            info!(swept, remaining = self.sessions.len(), "expired sessions swept");
        }
        swept
    }

    fn evict_least_recent(&self) -> bool {
        let oldest = self
            .sessions
            .iter()
            .min_by_key(|entry| entry.value().last_access)
            .map(|entry| entry.key().clone());

        match oldest {
            Some(id) => {
                self.sessions.remove(&id);
                info!(session_id = %id, "session evicted at capacity");
                true
            }
            None => false,
        }
    }

    /// Runs [`sweep_expired`](Self::sweep_expired) every `interval` until cancelled.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.sweep_expired();
                    }
                    _ = cancel.cancelled() => {
                        debug!("session sweeper shutting down");
                        break;
                    }
                }
            }
        })
    }
}

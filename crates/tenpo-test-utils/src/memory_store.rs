// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory quota store.
//!
//! The increment runs under one mutex, so it has the same no-lost-update
//! behavior as the SQLite conditional update.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tenpo_core::{AdapterType, HealthStatus, PluginAdapter, QuotaRow, QuotaStore, TenpoError, UserId};

/// Which store operation should fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StoreFailure {
    #[default]
    None,
    Reads,
    Writes,
}

/// A `HashMap`-backed [`QuotaStore`].
#[derive(Debug, Default)]
pub struct MemoryQuotaStore {
    rows: Mutex<HashMap<UserId, QuotaRow>>,
    failure: Mutex<StoreFailure>,
    increments: AtomicUsize,
}

impl MemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with `users` registered at count zero.
    pub fn with_users<'a>(users: impl IntoIterator<Item = &'a str>) -> Self {
        let store = Self::new();
        for user in users {
            store.put(user, QuotaRow::default());
        }
        store
    }

    /// Overwrites the row for `user`.
    pub fn put(&self, user: &str, row: QuotaRow) {
        self.rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(UserId(user.to_string()), row);
    }

    pub fn row(&self, user: &str) -> Option<QuotaRow> {
        self.rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&UserId(user.to_string()))
            .cloned()
    }

    pub fn fail(&self, failure: StoreFailure) {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner()) = failure;
    }

    /// Number of successful `atomic_increment` calls.
    pub fn increment_calls(&self) -> usize {
        self.increments.load(Ordering::SeqCst)
    }

    fn failure(&self) -> StoreFailure {
        *self.failure.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl PluginAdapter for MemoryQuotaStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TenpoError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TenpoError> {
        Ok(())
    }
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn read_quota_row(&self, user_id: &UserId) -> Result<Option<QuotaRow>, TenpoError> {
        if self.failure() == StoreFailure::Reads {
            return Err(TenpoError::Storage {
                source: "memory store unreachable".into(),
            });
        }
        Ok(self
            .rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(user_id)
            .cloned())
    }

    async fn atomic_increment(&self, user_id: &UserId, today: &str) -> Result<QuotaRow, TenpoError> {
        if self.failure() == StoreFailure::Writes {
            return Err(TenpoError::Storage {
                source: "memory store read-only".into(),
            });
        }
        let mut rows = self.rows.lock().unwrap_or_else(|e| e.into_inner());
        let row = rows.get_mut(user_id).ok_or_else(|| TenpoError::QuotaWrite {
            user_id: user_id.0.clone(),
            message: "no profile row".into(),
        })?;
        if row.last_generation_date.as_deref() == Some(today) {
            row.daily_generation_count += 1;
        } else {
            row.daily_generation_count = 1;
            row.last_generation_date = Some(today.to_string());
        }
        self.increments.fetch_add(1, Ordering::SeqCst);
        Ok(row.clone())
    }

    async fn register_user(&self, user_id: &UserId) -> Result<(), TenpoError> {
        self.rows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(user_id.clone())
            .or_default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn increment_resets_on_a_new_day() {
        let store = MemoryQuotaStore::new();
        store.put(
            "u",
            QuotaRow {
                daily_generation_count: 20,
                last_generation_date: Some("2026-10-17".into()),
            },
        );
        let row = store
            .atomic_increment(&UserId("u".into()), "2026-10-18")
            .await
            .unwrap();
        assert_eq!(row.daily_generation_count, 1);
        assert_eq!(row.last_generation_date.as_deref(), Some("2026-10-18"));
    }

    #[tokio::test]
    async fn failures_are_injectable() {
        let store = MemoryQuotaStore::with_users(["u"]);
        store.fail(StoreFailure::Reads);
        assert!(store.read_quota_row(&UserId("u".into())).await.is_err());
        store.fail(StoreFailure::Writes);
        assert!(store.read_quota_row(&UserId("u".into())).await.is_ok());
        assert!(
            store
                .atomic_increment(&UserId("u".into()), "2026-10-18")
                .await
                .is_err()
        );
        assert_eq!(store.increment_calls(), 0);
    }

    #[tokio::test]
    async fn register_is_idempotent() {
        let store = MemoryQuotaStore::new();
        let user = UserId("new".into());
        store.register_user(&user).await.unwrap();
        store.atomic_increment(&user, "2026-10-18").await.unwrap();
        store.register_user(&user).await.unwrap();
        assert_eq!(store.row("new").unwrap().daily_generation_count, 1);
    }
}

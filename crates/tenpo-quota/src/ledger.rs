// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quota ledger: the fail-closed check and the recorded increment.

use std::sync::Arc;

use tenpo_core::{QuotaRow, QuotaStatus, QuotaStore, TenpoError, UserId};
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::policy::QuotaPolicy;

/// Per-user daily generation ledger over a [`QuotaStore`].
#[derive(Clone)]
pub struct QuotaLedger {
    store: Arc<dyn QuotaStore>,
    policy: QuotaPolicy,
    clock: Arc<dyn Clock>,
}

impl QuotaLedger {
    pub fn new(store: Arc<dyn QuotaStore>, policy: QuotaPolicy) -> Self {
        Self::with_clock(store, policy, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: Arc<dyn QuotaStore>,
        policy: QuotaPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }

    /// Report whether `user_id` may generate now.
    ///
    /// A stored row from an earlier day counts as zero without being
    /// rewritten. A missing row or an unreachable store is a
    /// [`TenpoError::QuotaLookup`]; callers must not treat it as allowed.
    pub async fn check_quota(&self, user_id: &UserId) -> Result<QuotaStatus, TenpoError> {
        let now = self.clock.now();
        let today = self.policy.day_key(now);

        let row = match self.store.read_quota_row(user_id).await {
            Ok(Some(row)) => row,
            Ok(None) => {
                warn!(user_id = %user_id, "quota lookup found no profile row");
                return Err(TenpoError::QuotaLookup {
                    user_id: user_id.0.clone(),
                    message: "no profile row".into(),
                });
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "quota lookup failed");
                return Err(TenpoError::QuotaLookup {
                    user_id: user_id.0.clone(),
                    message: e.to_string(),
                });
            }
        };

        let used = self.policy.effective_count(&row, &today);
        let remaining = self.policy.remaining(used);
        let status = QuotaStatus {
            allowed: remaining > 0,
            remaining,
            limit: self.policy.daily_limit,
            reset_at: self.policy.next_reset(now),
        };

        if !status.allowed {
            info!(user_id = %user_id, limit = status.limit, "daily generation quota exhausted");
        } else if u64::from(used) * 5 >= u64::from(self.policy.daily_limit) * 4 {
            warn!(
                user_id = %user_id,
                used,
                limit = status.limit,
                "approaching daily generation quota (80%+)"
            );
        }
        debug!(user_id = %user_id, day = %today, used, remaining, "quota checked");

        Ok(status)
    }

    /// Record one generation for `user_id` on the current quota day.
    ///
    /// Failures surface as [`TenpoError::QuotaWrite`].
    pub async fn increment_generation(&self, user_id: &UserId) -> Result<QuotaRow, TenpoError> {
        let today = self.policy.day_key(self.clock.now());
        let row = self
            .store
            .atomic_increment(user_id, &today)
            .await
            .map_err(|e| match e {
                TenpoError::QuotaWrite { .. } => e,
                other => TenpoError::QuotaWrite {
                    user_id: user_id.0.clone(),
                    message: other.to_string(),
                },
            })?;

        info!(
            user_id = %user_id,
            day = %today,
            count = row.daily_generation_count,
            limit = self.policy.daily_limit,
            "generation recorded"
        );
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};
    use tenpo_core::{AdapterType, HealthStatus, PluginAdapter};

    use super::*;

    #[derive(Default)]
    struct MapStore {
        rows: Mutex<HashMap<String, QuotaRow>>,
        broken: bool,
    }

    #[async_trait]
    impl PluginAdapter for MapStore {
        fn name(&self) -> &str {
            "map"
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
    impl QuotaStore for MapStore {
        async fn read_quota_row(&self, user_id: &UserId) -> Result<Option<QuotaRow>, TenpoError> {
            if self.broken {
                return Err(TenpoError::Storage {
                    source: "connection refused".into(),
                });
            }
            Ok(self.rows.lock().unwrap().get(&user_id.0).cloned())
        }

        async fn atomic_increment(
            &self,
            user_id: &UserId,
            today: &str,
        ) -> Result<QuotaRow, TenpoError> {
            if self.broken {
                return Err(TenpoError::Storage {
                    source: "disk full".into(),
                });
            }
            let mut rows = self.rows.lock().unwrap();
            let row = rows.get_mut(&user_id.0).ok_or_else(|| TenpoError::QuotaWrite {
                user_id: user_id.0.clone(),
                message: "no profile row".into(),
            })?;
            if row.last_generation_date.as_deref() == Some(today) {
                row.daily_generation_count += 1;
            } else {
                row.daily_generation_count = 1;
                row.last_generation_date = Some(today.to_string());
            }
            Ok(row.clone())
        }

        async fn register_user(&self, user_id: &UserId) -> Result<(), TenpoError> {
            self.rows
                .lock()
                .unwrap()
                .entry(user_id.0.clone())
                .or_default();
            Ok(())
        }
    }

    struct At(DateTime<Utc>);

    impl Clock for At {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn ledger_at(store: Arc<MapStore>, now: DateTime<Utc>) -> QuotaLedger {
        QuotaLedger::with_clock(
            store,
            QuotaPolicy::new(20, FixedOffset::east_opt(9 * 3600).unwrap()),
            Arc::new(At(now)),
        )
    }

    fn user() -> UserId {
        UserId("u1".into())
    }

    #[tokio::test]
    async fn fresh_profile_has_full_quota() {
        let store = Arc::new(MapStore::default());
        store.register_user(&user()).await.unwrap();
        let ledger = ledger_at(store, Utc.with_ymd_and_hms(2026, 3, 1, 3, 0, 0).unwrap());

        let status = ledger.check_quota(&user()).await.unwrap();
        assert!(status.allowed);
        assert_eq!(status.remaining, 20);
        assert_eq!(status.reset_at.to_rfc3339(), "2026-03-02T00:00:00+09:00");
    }

    #[tokio::test]
    async fn check_is_idempotent() {
        let store = Arc::new(MapStore::default());
        store.register_user(&user()).await.unwrap();
        let ledger = ledger_at(store, Utc.with_ymd_and_hms(2026, 3, 1, 3, 0, 0).unwrap());
        ledger.increment_generation(&user()).await.unwrap();

        let first = ledger.check_quota(&user()).await.unwrap();
        let second = ledger.check_quota(&user()).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.remaining, 19);
    }

    #[tokio::test]
    async fn yesterdays_full_count_is_ignored_today() {
        let store = Arc::new(MapStore::default());
        store.rows.lock().unwrap().insert(
            "u1".into(),
            QuotaRow {
                daily_generation_count: 20,
                last_generation_date: Some("2026-02-28".into()),
            },
        );
        let ledger = ledger_at(store.clone(), Utc.with_ymd_and_hms(2026, 3, 1, 3, 0, 0).unwrap());

        let status = ledger.check_quota(&user()).await.unwrap();
        assert!(status.allowed);
        assert_eq!(status.remaining, 20);
        // The check never rewrites the row.
        assert_eq!(
            store.rows.lock().unwrap()["u1"].daily_generation_count,
            20
        );
    }

    #[tokio::test]
    async fn exhausted_quota_is_not_allowed() {
        let store = Arc::new(MapStore::default());
        store.rows.lock().unwrap().insert(
            "u1".into(),
            QuotaRow {
                daily_generation_count: 20,
                last_generation_date: Some("2026-03-01".into()),
            },
        );
        let ledger = ledger_at(store, Utc.with_ymd_and_hms(2026, 3, 1, 3, 0, 0).unwrap());

        let status = ledger.check_quota(&user()).await.unwrap();
        assert!(!status.allowed);
        assert_eq!(status.remaining, 0);
    }

    #[tokio::test]
    async fn missing_row_fails_closed() {
        let ledger = ledger_at(
            Arc::new(MapStore::default()),
            Utc.with_ymd_and_hms(2026, 3, 1, 3, 0, 0).unwrap(),
        );
        assert!(matches!(
            ledger.check_quota(&user()).await,
            Err(TenpoError::QuotaLookup { .. })
        ));
    }

    #[tokio::test]
    async fn store_failure_fails_closed() {
        let store = Arc::new(MapStore {
            broken: true,
            ..Default::default()
        });
        let ledger = ledger_at(store, Utc.with_ymd_and_hms(2026, 3, 1, 3, 0, 0).unwrap());
        assert!(matches!(
            ledger.check_quota(&user()).await,
            Err(TenpoError::QuotaLookup { .. })
        ));
        assert!(matches!(
            ledger.increment_generation(&user()).await,
            Err(TenpoError::QuotaWrite { .. })
        ));
    }

    #[tokio::test]
    async fn increment_uses_the_jst_day_key() {
        let store = Arc::new(MapStore::default());
        store.register_user(&user()).await.unwrap();
        // 16:00 UTC on 1 March is already 2 March in JST.
        let ledger = ledger_at(store, Utc.with_ymd_and_hms(2026, 3, 1, 16, 0, 0).unwrap());

        let row = ledger.increment_generation(&user()).await.unwrap();
        assert_eq!(row.last_generation_date.as_deref(), Some("2026-03-02"));
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn warns_when_usage_crosses_eighty_percent() {
        let store = Arc::new(MapStore::default());
        store.rows.lock().unwrap().insert(
            "u1".into(),
            QuotaRow {
                daily_generation_count: 16,
                last_generation_date: Some("2026-03-01".into()),
            },
        );
        let ledger = ledger_at(store, Utc.with_ymd_and_hms(2026, 3, 1, 3, 0, 0).unwrap());
        ledger.check_quota(&user()).await.unwrap();
        assert!(logs_contain("approaching daily generation quota"));
    }
}

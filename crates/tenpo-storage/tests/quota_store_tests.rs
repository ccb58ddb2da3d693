// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrency tests for the SQLite quota store.

use std::sync::Arc;

use tenpo_config::model::StorageConfig;
use tenpo_core::{QuotaStore, UserId};
use tenpo_storage::SqliteQuotaStore;

async fn store_in(dir: &tempfile::TempDir) -> Arc<SqliteQuotaStore> {
    let path = dir.path().join("race.db");
    let store = SqliteQuotaStore::new(StorageConfig {
        database_path: path.to_str().unwrap().to_string(),
        wal_mode: true,
    });
    store.initialize().await.unwrap();
    Arc::new(store)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn two_concurrent_increments_count_twice() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir).await;
    let user = UserId("racer".into());
    store.register_user(&user).await.unwrap();

    let a = {
        let (store, user) = (store.clone(), user.clone());
        tokio::spawn(async move { store.atomic_increment(&user, "2026-03-01").await })
    };
    let b = {
        let (store, user) = (store.clone(), user.clone());
        tokio::spawn(async move { store.atomic_increment(&user, "2026-03-01").await })
    };
    a.await.unwrap().unwrap();
    b.await.unwrap().unwrap();

    let row = store.read_quota_row(&user).await.unwrap().unwrap();
    assert_eq!(row.daily_generation_count, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn many_concurrent_increments_lose_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir).await;
    let user = UserId("burst".into());
    store.register_user(&user).await.unwrap();

    let handles: Vec<_> = (0..25)
        .map(|_| {
            let (store, user) = (store.clone(), user.clone());
            tokio::spawn(async move { store.atomic_increment(&user, "2026-03-01").await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let row = store.read_quota_row(&user).await.unwrap().unwrap();
    assert_eq!(row.daily_generation_count, 25);
    assert_eq!(row.last_generation_date.as_deref(), Some("2026-03-01"));
}

#[tokio::test]
async fn stale_day_is_reset_by_the_next_increment_only() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir).await;
    let user = UserId("sleepy".into());
    store.register_user(&user).await.unwrap();

    for _ in 0..3 {
        store.atomic_increment(&user, "2026-03-01").await.unwrap();
    }
    // Reading never rewrites the stale row.
    let row = store.read_quota_row(&user).await.unwrap().unwrap();
    assert_eq!(row.daily_generation_count, 3);

    let row = store.atomic_increment(&user, "2026-03-02").await.unwrap();
    assert_eq!(row.daily_generation_count, 1);
}

// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator commands: profile provisioning and quota inspection.

use std::sync::Arc;

use tenpo_config::TenpoConfig;
use tenpo_core::{QuotaStatus, QuotaStore, TenpoError, UserId};
use tenpo_quota::{QuotaLedger, QuotaPolicy};
use tenpo_storage::SqliteQuotaStore;
use tenpo_storage::queries::profiles;

async fn open_store(config: &TenpoConfig) -> Result<Arc<SqliteQuotaStore>, TenpoError> {
    let store = SqliteQuotaStore::new(config.storage.clone());
    store.initialize().await?;
    Ok(Arc::new(store))
}

/// `tenpo profile add <user>`: creates the profile row a new user needs.
pub async fn run_profile_add(config: &TenpoConfig, user: &str) -> Result<(), TenpoError> {
    let store = open_store(config).await?;
    store.register_user(&UserId(user.to_string())).await?;
    println!("profile ready: {user}");
    Ok(())
}

/// `tenpo quota <user> [--reset]`: prints today's quota, optionally clearing it first.
pub async fn run_quota(config: &TenpoConfig, user: &str, reset: bool) -> Result<QuotaStatus, TenpoError> {
    let store = open_store(config).await?;

    if reset {
        let db = store.database()?;
        if !profiles::set_generation_count(db, user, 0, None).await? {
            return Err(TenpoError::QuotaLookup {
                user_id: user.to_string(),
                message: "no profile row".into(),
            });
        }
        tracing::info!(user_id = %user, "quota reset by operator");
    }

    let ledger = QuotaLedger::new(store, QuotaPolicy::from_config(&config.quota)?);
    let status = ledger.check_quota(&UserId(user.to_string())).await?;
    println!(
        "{user}: {remaining}/{limit} remaining, resets at {reset_at}",
        remaining = status.remaining,
        limit = status.limit,
        reset_at = status.reset_at.to_rfc3339(),
    );
    Ok(status)
}

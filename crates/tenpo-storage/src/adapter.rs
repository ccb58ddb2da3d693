// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the QuotaStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use tenpo_config::model::StorageConfig;
use tenpo_core::{
    AdapterType, HealthStatus, PluginAdapter, QuotaRow, QuotaStore, TenpoError, UserId,
};

use crate::database::{Database, map_tr_err};
use crate::queries;

/// SQLite-backed quota store.
///
/// The database is opened lazily by [`SqliteQuotaStore::initialize`].
pub struct SqliteQuotaStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteQuotaStore {
    /// Create a store for the configured path. Nothing is opened yet.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Wrap an already-open database.
    pub fn from_database(config: StorageConfig, db: Database) -> Self {
        Self {
            config,
            db: OnceCell::new_with(Some(db)),
        }
    }

    /// Open the database and run migrations.
    pub async fn initialize(&self) -> Result<(), TenpoError> {
        let db = Database::open_with_journal(&self.config.database_path, self.config.wal_mode)
            .await?;
        self.db.set(db).map_err(|_| TenpoError::Storage {
            source: "quota store already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite quota store initialized");
        Ok(())
    }

    /// Returns the underlying Database, or an error if not initialized.
    pub fn database(&self) -> Result<&Database, TenpoError> {
        self.db.get().ok_or_else(|| TenpoError::Storage {
            source: "quota store not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteQuotaStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TenpoError> {
        let Ok(db) = self.database() else {
            return Ok(HealthStatus::Unhealthy("not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TenpoError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl QuotaStore for SqliteQuotaStore {
    async fn read_quota_row(&self, user_id: &UserId) -> Result<Option<QuotaRow>, TenpoError> {
        let profile = queries::profiles::get_profile(self.database()?, &user_id.0).await?;
        Ok(profile.as_ref().map(QuotaRow::from))
    }

    async fn atomic_increment(
        &self,
        user_id: &UserId,
        today: &str,
    ) -> Result<QuotaRow, TenpoError> {
        let db = self.database().map_err(|e| TenpoError::QuotaWrite {
            user_id: user_id.0.clone(),
            message: e.to_string(),
        })?;
        match queries::profiles::increment_generation(db, &user_id.0, today).await {
            Ok(Some(row)) => Ok(row),
            Ok(None) => Err(TenpoError::QuotaWrite {
                user_id: user_id.0.clone(),
                message: "no profile row".into(),
            }),
            Err(e) => Err(TenpoError::QuotaWrite {
                user_id: user_id.0.clone(),
                message: e.to_string(),
            }),
        }
    }

    async fn register_user(&self, user_id: &UserId) -> Result<(), TenpoError> {
        let created = queries::profiles::register_profile(self.database()?, &user_id.0).await?;
        if created {
            debug!(user_id = %user_id, "profile created");
        }
        Ok(())
    }
}

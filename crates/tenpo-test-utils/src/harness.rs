// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end orchestration tests.
//!
//! `TestHarness` assembles a complete studio stack: mock provider, a quota
//! store (in-memory, or a temp SQLite database), a manual clock, the
//! conversation registry, and the orchestrator.

use std::sync::Arc;
use std::time::Duration;

use tenpo_config::model::{SessionConfig, StorageConfig};
use tenpo_core::{ProviderResponse, QuotaRow, QuotaStore, SessionId, TenpoError, UserId};
use tenpo_quota::{QuotaLedger, QuotaPolicy};
use tenpo_storage::SqliteQuotaStore;
use tenpo_studio::{ConversationRegistry, Orchestrator};

use crate::clock::ManualClock;
use crate::memory_store::MemoryQuotaStore;
use crate::mock_provider::MockProvider;

/// User registered by default in every harness.
pub const TEST_USER: &str = "test-user";

/// Model id the harness registry binds conversations to.
pub const TEST_MODEL: &str = "gemini-test-image";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    responses: Vec<ProviderResponse>,
    daily_limit: u32,
    utc_offset_minutes: i32,
    timeout: Duration,
    session: SessionConfig,
    sqlite: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            daily_limit: 20,
            utc_offset_minutes: 9 * 60,
            timeout: Duration::from_secs(30),
            session: SessionConfig::default(),
            sqlite: false,
        }
    }

    /// Set mock provider responses.
    pub fn with_mock_responses(mut self, responses: Vec<ProviderResponse>) -> Self {
        self.responses = responses;
        self
    }

    pub fn with_daily_limit(mut self, limit: u32) -> Self {
        self.daily_limit = limit;
        self
    }

    /// Bound on each provider call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_session_config(mut self, session: SessionConfig) -> Self {
        self.session = session;
        self
    }

    /// Back the ledger with a temp SQLite database instead of memory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Build the harness. The clock starts at 2026-10-18 12:00 JST.
    pub async fn build(self) -> Result<TestHarness, TenpoError> {
        let clock = Arc::new(ManualClock::at_utc(2026, 10, 18, 3, 0));
        let provider = MockProvider::with_responses(self.responses);

        let (store, memory, temp_dir) = if self.sqlite {
            let temp_dir =
                tempfile::TempDir::new().map_err(|e| TenpoError::Storage { source: e.into() })?;
            let db_path = temp_dir.path().join("test.db");
            let store = SqliteQuotaStore::new(StorageConfig {
                database_path: db_path.to_string_lossy().to_string(),
                wal_mode: true,
            });
            store.initialize().await?;
            (Arc::new(store) as Arc<dyn QuotaStore>, None, Some(temp_dir))
        } else {
            let memory = Arc::new(MemoryQuotaStore::new());
            (memory.clone() as Arc<dyn QuotaStore>, Some(memory), None)
        };
        store.register_user(&UserId(TEST_USER.to_string())).await?;

        let offset = chrono::FixedOffset::east_opt(self.utc_offset_minutes * 60)
            .ok_or_else(|| TenpoError::Config("invalid utc offset".into()))?;
        let ledger = QuotaLedger::with_clock(
            Arc::clone(&store),
            QuotaPolicy::new(self.daily_limit, offset),
            clock.clone(),
        );
        let registry = Arc::new(ConversationRegistry::new(
            Arc::new(provider.clone()),
            TEST_MODEL,
            &self.session,
        ));
        let orchestrator = Arc::new(Orchestrator::new(Arc::clone(&registry), ledger, self.timeout));

        Ok(TestHarness {
            provider,
            store,
            memory,
            clock,
            registry,
            orchestrator,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters.
pub struct TestHarness {
    /// The mock generation provider.
    pub provider: MockProvider,
    /// The quota store behind the ledger.
    pub store: Arc<dyn QuotaStore>,
    /// Set when the harness runs on the in-memory store.
    pub memory: Option<Arc<MemoryQuotaStore>>,
    pub clock: Arc<ManualClock>,
    pub registry: Arc<ConversationRegistry>,
    pub orchestrator: Arc<Orchestrator>,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn user(&self) -> UserId {
        UserId(TEST_USER.to_string())
    }

    /// Open a session for the default user.
    pub async fn session(&self) -> Result<SessionId, TenpoError> {
        self.orchestrator.create_session(&self.user()).await
    }

    /// Current stored row for the default user.
    pub async fn quota_row(&self) -> Result<QuotaRow, TenpoError> {
        self.store
            .read_quota_row(&self.user())
            .await?
            .ok_or_else(|| TenpoError::Internal("test user has no profile row".into()))
    }

    /// Overwrite the default user's counters. In-memory store only.
    pub fn set_quota_row(&self, row: QuotaRow) -> Result<(), TenpoError> {
        let memory = self
            .memory
            .as_ref()
            .ok_or_else(|| TenpoError::Internal("set_quota_row needs the memory store".into()))?;
        memory.put(TEST_USER, row);
        Ok(())
    }
}

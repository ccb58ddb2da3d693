// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tenpo serve` command implementation.
//!
//! Wires storage, the quota ledger, the Gemini provider, the conversation
//! registry, and the orchestrator behind the HTTP gateway, then serves
//! until SIGINT/SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use tenpo_config::TenpoConfig;
use tenpo_core::{GenerationProvider, HealthStatus, PluginAdapter, TenpoError};
use tenpo_gateway::Gateway;
use tenpo_gemini::GeminiProvider;
use tenpo_quota::{QuotaLedger, QuotaPolicy};
use tenpo_storage::SqliteQuotaStore;
use tenpo_studio::{ConversationRegistry, Orchestrator};
use tracing::{error, info, warn};

use crate::shutdown;

/// Runs the `tenpo serve` command.
pub async fn run_serve(config: TenpoConfig) -> Result<(), TenpoError> {
    info!(name = %config.app.name, "starting tenpo serve");

    // A missing API key stops startup here, never per request.
    let gemini = Arc::new(GeminiProvider::new(&config)?);
    let provider: Arc<dyn GenerationProvider> = gemini.clone();

    let store = Arc::new(SqliteQuotaStore::new(config.storage.clone()));
    store.initialize().await?;
    info!(path = %config.storage.database_path, "quota store ready");

    let policy = QuotaPolicy::from_config(&config.quota)?;
    let ledger = QuotaLedger::new(store.clone(), policy);

    let registry = Arc::new(ConversationRegistry::new(
        provider,
        config.gemini.model.clone(),
        &config.session,
    ));
    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&registry),
        ledger,
        Duration::from_secs(config.gemini.timeout_secs),
    ));

    let cancel = shutdown::install_signal_handler();
    let sweeper = Arc::clone(&registry).spawn_sweeper(
        Duration::from_secs(config.session.sweep_interval_secs),
        cancel.clone(),
    );

    let gateway = Gateway::new(&config.gateway, orchestrator);
    let adapters: [&dyn PluginAdapter; 3] = [store.as_ref(), gemini.as_ref(), &gateway];
    report_health(&adapters).await;
    log_heap_usage();

    let served = gateway.run(cancel.clone()).await;
    cancel.cancel();

    if let Err(e) = sweeper.await {
        warn!(error = %e, "session sweeper task ended abnormally");
    }
    if let Err(e) = store.shutdown().await {
        error!(error = %e, "quota store shutdown failed");
    }
    info!("tenpo stopped");
    served
}

async fn report_health(adapters: &[&dyn PluginAdapter]) {
    for adapter in adapters {
        match adapter.health_check().await {
            Ok(HealthStatus::Healthy) => {
                info!(adapter = adapter.name(), kind = %adapter.adapter_type(), "adapter healthy");
            }
            Ok(HealthStatus::Degraded(reason)) => {
                warn!(adapter = adapter.name(), reason = %reason, "adapter degraded");
            }
            Ok(HealthStatus::Unhealthy(reason)) => {
                error!(adapter = adapter.name(), reason = %reason, "adapter unhealthy");
            }
            Err(e) => {
                error!(adapter = adapter.name(), error = %e, "adapter health check failed");
            }
        }
    }
}

#[cfg(not(target_env = "msvc"))]
fn log_heap_usage() {
    if tikv_jemalloc_ctl::epoch::advance().is_err() {
        return;
    }
    if let Ok(allocated) = tikv_jemalloc_ctl::stats::allocated::read() {
        info!(allocated_kb = allocated / 1024, "startup heap usage");
    }
}

#[cfg(target_env = "msvc")]
fn log_heap_usage() {}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` overrides the configured level when set.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tenpo={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

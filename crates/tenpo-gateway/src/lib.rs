// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for the Tenpo interior studio.
//!
//! [`Gateway`] owns the server lifecycle; [`build_router`] is exposed
//! separately so tests can drive the routes without binding a socket.

pub mod auth;
pub mod handlers;
pub mod server;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tenpo_config::model::GatewayConfig;
use tenpo_core::{AdapterType, HealthStatus, PluginAdapter, TenpoError};
use tenpo_studio::Orchestrator;
use tokio_util::sync::CancellationToken;

pub use auth::AuthConfig;
pub use server::{GatewayState, ServerConfig, build_router, start_server};

/// The HTTP surface as a pluggable adapter.
pub struct Gateway {
    config: ServerConfig,
    state: GatewayState,
}

impl Gateway {
    pub fn new(config: &GatewayConfig, orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            config: ServerConfig {
                host: config.host.clone(),
                port: config.port,
            },
            state: GatewayState {
                orchestrator,
                auth: AuthConfig {
                    bearer_token: config.bearer_token.clone(),
                    user_header: config.user_header.clone(),
                },
                started: Instant::now(),
                max_body_bytes: config.max_body_bytes,
            },
        }
    }

    pub fn state(&self) -> &GatewayState {
        &self.state
    }

    /// Binds and serves until `cancel` fires.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), TenpoError> {
        if self.state.auth.bearer_token.is_none() {
            tracing::warn!("gateway.bearer_token is not set -- every /v1 request will be rejected");
        }
        start_server(&self.config, self.state.clone(), cancel).await
    }
}

#[async_trait]
impl PluginAdapter for Gateway {
    fn name(&self) -> &str {
        "http-gateway"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, TenpoError> {
        if self.state.auth.bearer_token.is_none() {
            return Ok(HealthStatus::Degraded("no bearer token configured".into()));
        }
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TenpoError> {
        Ok(())
    }
}

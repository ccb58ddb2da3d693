// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
};
use tenpo_core::TenpoError;
use tenpo_studio::Orchestrator;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<Orchestrator>,
    /// Authentication configuration.
    pub auth: AuthConfig,
    /// Process start time for uptime calculation.
    pub started: Instant,
    /// Body limit for `/v1` routes, replacing axum's 2 MB default.
    pub max_body_bytes: usize,
}

/// Gateway server configuration (mirrors `GatewayConfig` from tenpo-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Builds the full router.
///
/// - GET /health (public)
/// - POST /v1/sessions, DELETE /v1/sessions/{id}
/// - GET /v1/quota
/// - POST /v1/designs, POST /v1/generations, POST /v1/chat
/// - GET /v1/rules
pub fn build_router(state: GatewayState) -> Router {
    let auth_state = state.auth.clone();
    let body_limit = state.max_body_bytes;

    // Unauthenticated public routes (health for systemd and load balancers).
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    // Routes requiring authentication.
    let api_routes = Router::new()
        .route("/v1/sessions", post(handlers::post_sessions))
        .route("/v1/sessions/{id}", delete(handlers::delete_session))
        .route("/v1/quota", get(handlers::get_quota))
        .route("/v1/designs", post(handlers::post_designs))
        .route("/v1/generations", post(handlers::post_generations))
        .route("/v1/chat", post(handlers::post_chat))
        .route("/v1/rules", get(handlers::get_rules))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            auth_middleware,
        ))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves the gateway until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), TenpoError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TenpoError::Config(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| TenpoError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("Gateway server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_debug() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8787,
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("127.0.0.1"));
        assert!(debug.contains("8787"));
    }
}

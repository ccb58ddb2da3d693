// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the studio REST API.
//!
//! Every `/v1` response body is an [`Envelope`]; the status code follows
//! the outcome.

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tenpo_core::{GenerationResult, InlineImage, QuotaStatus, SessionId, TenpoError, UserId};
use tenpo_studio::{
    ChatInstruction, ChatRequest, DesignPreferences, Envelope, FailureKind, GenerationOutcome,
    catalog,
};

use crate::server::GatewayState;

/// Request body for POST /v1/designs.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignRequest {
    pub session_id: SessionId,
    #[serde(default)]
    pub selections: Vec<String>,
    #[serde(default)]
    pub preferences: DesignPreferences,
    pub base_image: InlineImage,
}

/// Request body for POST /v1/generations.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub session_id: SessionId,
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub images: Vec<InlineImage>,
}

/// Request body for POST /v1/chat.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatBody {
    pub session_id: SessionId,
    pub instruction: ChatInstruction,
    #[serde(default)]
    pub rule_ids: Vec<String>,
    #[serde(default)]
    pub images: Vec<InlineImage>,
}

/// Data of a POST /v1/sessions response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionCreated {
    pub session_id: SessionId,
}

/// Data of a GET /v1/quota response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaInfo {
    pub remaining: u32,
    pub allowed: bool,
    pub limit: u32,
    pub reset_at: DateTime<FixedOffset>,
}

impl From<QuotaStatus> for QuotaInfo {
    fn from(status: QuotaStatus) -> Self {
        Self {
            remaining: status.remaining,
            allowed: status.allowed,
            limit: status.limit,
            reset_at: status.reset_at,
        }
    }
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub sessions: usize,
}

/// HTTP status for a failure kind.
pub fn failure_status(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::InvalidRequest => StatusCode::BAD_REQUEST,
        FailureKind::InvalidSession => StatusCode::NOT_FOUND,
        FailureKind::QuotaLookup => StatusCode::SERVICE_UNAVAILABLE,
        FailureKind::Provider => StatusCode::BAD_GATEWAY,
        FailureKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        FailureKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// HTTP status for a generation outcome.
pub fn outcome_status(outcome: &GenerationOutcome) -> StatusCode {
    match outcome {
        GenerationOutcome::Completed { .. } => StatusCode::OK,
        GenerationOutcome::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
        GenerationOutcome::Failed { kind, .. } => failure_status(*kind),
    }
}

fn outcome_response(outcome: GenerationOutcome) -> Response {
    let status = outcome_status(&outcome);
    let envelope: Envelope<GenerationResult> = outcome.into();
    (status, Json(envelope)).into_response()
}

fn error_response(err: &TenpoError) -> Response {
    let kind = FailureKind::from(err);
    (
        failure_status(kind),
        Json(Envelope::<()>::failure(kind, kind.user_message())),
    )
        .into_response()
}

/// Shown when a body exceeds `gateway.max_body_bytes`.
const BODY_TOO_LARGE_MESSAGE: &str =
    "画像のサイズが大きすぎます。小さい画像でもう一度お試しください";

/// Maps a body rejection onto the envelope. The raw axum text is only logged.
fn rejection_response(rejection: JsonRejection) -> Response {
    let (status, message) = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        (StatusCode::PAYLOAD_TOO_LARGE, BODY_TOO_LARGE_MESSAGE)
    } else {
        (
            StatusCode::BAD_REQUEST,
            FailureKind::InvalidRequest.user_message(),
        )
    };
    tracing::debug!(status = %status, error = %rejection.body_text(), "request body rejected");
    (
        status,
        Json(Envelope::<()>::failure(FailureKind::InvalidRequest, message)),
    )
        .into_response()
}

/// GET /health
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.started.elapsed().as_secs(),
        sessions: state.orchestrator.registry().len(),
    })
}

/// POST /v1/sessions
pub async fn post_sessions(
    State(state): State<GatewayState>,
    Extension(user): Extension<UserId>,
) -> Response {
    match state.orchestrator.create_session(&user).await {
        Ok(session_id) => Json(Envelope::ok(SessionCreated { session_id })).into_response(),
        Err(e) => {
            tracing::warn!(user_id = %user, error = %e, "session creation failed");
            error_response(&e)
        }
    }
}

/// DELETE /v1/sessions/{id}
pub async fn delete_session(
    State(state): State<GatewayState>,
    Extension(user): Extension<UserId>,
    Path(id): Path<String>,
) -> Response {
    let session_id = SessionId(id);
    if state.orchestrator.registry().end_session(&user, &session_id) {
        Json(Envelope::ok(SessionCreated { session_id })).into_response()
    } else {
        error_response(&TenpoError::InvalidSession {
            session_id: session_id.0,
        })
    }
}

/// GET /v1/quota
pub async fn get_quota(
    State(state): State<GatewayState>,
    Extension(user): Extension<UserId>,
) -> Response {
    match state.orchestrator.quota_info(&user).await {
        Ok(status) => {
            let remaining = status.remaining;
            Json(Envelope::ok(QuotaInfo::from(status)).with_remaining(Some(remaining)))
                .into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// POST /v1/designs
pub async fn post_designs(
    State(state): State<GatewayState>,
    Extension(user): Extension<UserId>,
    payload: Result<Json<DesignRequest>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    let outcome = state
        .orchestrator
        .generate_design(
            &user,
            &body.session_id,
            &body.selections,
            &body.preferences,
            body.base_image,
        )
        .await;
    outcome_response(outcome)
}

/// POST /v1/generations
pub async fn post_generations(
    State(state): State<GatewayState>,
    Extension(user): Extension<UserId>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    let outcome = state
        .orchestrator
        .generate_image(&user, &body.session_id, &body.prompt, body.images)
        .await;
    outcome_response(outcome)
}

/// POST /v1/chat
pub async fn post_chat(
    State(state): State<GatewayState>,
    Extension(user): Extension<UserId>,
    payload: Result<Json<ChatBody>, JsonRejection>,
) -> Response {
    let body = match payload {
        Ok(Json(body)) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    let request = ChatRequest {
        instruction: body.instruction,
        rule_ids: body.rule_ids,
        images: body.images,
    };
    let outcome = state
        .orchestrator
        .chat(&user, &body.session_id, request)
        .await;
    outcome_response(outcome)
}

/// GET /v1/rules
pub async fn get_rules() -> Json<Envelope<Vec<catalog::Chapter>>> {
    Json(Envelope::ok(catalog::chapters()))
}

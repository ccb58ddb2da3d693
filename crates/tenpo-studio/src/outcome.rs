// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Caller-visible outcomes and the uniform JSON envelope.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tenpo_core::{GenerationResult, TenpoError};

/// Category of a failed operation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// Nothing to send, or an unknown rule id.
    InvalidRequest,
    InvalidSession,
    QuotaLookup,
    Provider,
    Timeout,
    Internal,
}

impl FailureKind {
    /// Message shown to the end user. Details stay in the logs.
    pub fn user_message(self) -> &'static str {
        match self {
            FailureKind::InvalidRequest => "プロンプトまたは画像を追加してください",
            FailureKind::InvalidSession => {
                "チャットセッションが見つかりません。もう一度最初からやり直してください"
            }
            FailureKind::QuotaLookup => {
                "利用状況を確認できませんでした。しばらくしてから再度お試しください"
            }
            FailureKind::Provider => "画像の生成に失敗しました。もう一度お試しください",
            FailureKind::Timeout => {
                "画像の生成に時間がかかりすぎました。もう一度お試しください"
            }
            FailureKind::Internal => "エラーが発生しました。もう一度お試しください",
        }
    }
}

impl From<&TenpoError> for FailureKind {
    fn from(err: &TenpoError) -> Self {
        match err {
            TenpoError::InvalidSession { .. } => FailureKind::InvalidSession,
            TenpoError::QuotaLookup { .. } => FailureKind::QuotaLookup,
            TenpoError::Provider { .. } => FailureKind::Provider,
            TenpoError::Timeout { .. } => FailureKind::Timeout,
            TenpoError::Config(_)
            | TenpoError::Storage { .. }
            | TenpoError::QuotaWrite { .. }
            | TenpoError::Internal(_) => FailureKind::Internal,
        }
    }
}

/// Result of one generation call. Exactly one of three shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Completed {
        data: GenerationResult,
        /// Post-call remaining count; `None` when the re-check failed.
        remaining: Option<u32>,
    },
    QuotaExceeded {
        reset_at: DateTime<FixedOffset>,
    },
    Failed {
        kind: FailureKind,
        message: String,
    },
}

impl GenerationOutcome {
    /// Failure carrying the generic message for `kind`.
    pub fn failed(kind: FailureKind) -> Self {
        GenerationOutcome::Failed {
            kind,
            message: kind.user_message().to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationOutcome::Completed { .. })
    }

    pub fn into_envelope(self) -> Envelope<GenerationResult> {
        self.into()
    }
}

impl From<&TenpoError> for GenerationOutcome {
    fn from(err: &TenpoError) -> Self {
        GenerationOutcome::failed(FailureKind::from(err))
    }
}

/// Uniform `{success, data|error, remaining?, quotaExceeded?}` response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quota_exceeded: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<FixedOffset>>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            error_kind: None,
            remaining: None,
            quota_exceeded: None,
            reset_at: None,
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            error_kind: Some(kind),
            remaining: None,
            quota_exceeded: None,
            reset_at: None,
        }
    }

    pub fn quota_exceeded(reset_at: DateTime<FixedOffset>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some("本日の生成回数の上限に達しました".to_string()),
            error_kind: None,
            remaining: Some(0),
            quota_exceeded: Some(true),
            reset_at: Some(reset_at),
        }
    }

    pub fn with_remaining(mut self, remaining: Option<u32>) -> Self {
        self.remaining = remaining;
        self
    }
}

impl From<GenerationOutcome> for Envelope<GenerationResult> {
    fn from(outcome: GenerationOutcome) -> Self {
        match outcome {
            GenerationOutcome::Completed { data, remaining } => {
                Envelope::ok(data).with_remaining(remaining)
            }
            GenerationOutcome::QuotaExceeded { reset_at } => Envelope::quota_exceeded(reset_at),
            GenerationOutcome::Failed { kind, message } => Envelope::failure(kind, message),
        }
    }
}

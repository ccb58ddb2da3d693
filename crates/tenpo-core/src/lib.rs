// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tenpo interior studio.
//!
//! This crate provides the trait definitions, error types, and common types
//! shared by the storage, provider, studio, and gateway crates. Every
//! external collaborator (quota store, generation provider) is reached
//! through a trait defined here so the orchestration layer can be tested
//! against fakes.

pub mod error;
pub mod traits;
pub mod types;

pub use error::TenpoError;
pub use types::{
    AdapterType, Candidate, ContentPart, GenerationResult, HealthStatus, InlineImage,
    ProviderResponse, QuotaRow, QuotaStatus, SessionId, UserId,
};

pub use traits::{Conversation, GenerationProvider, PluginAdapter, QuotaStore};

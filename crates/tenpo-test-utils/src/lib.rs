// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tenpo integration tests.
//!
//! Provides mock adapters and a test harness for fast, deterministic,
//! CI-runnable tests without the Gemini API.
//!
//! # Components
//!
//! - [`MockProvider`] - Generation provider with queued responses and a call counter
//! - [`MemoryQuotaStore`] - In-memory quota store with injectable failures
//! - [`ManualClock`] - Settable clock for crossing quota day boundaries
//! - [`TestHarness`] - Orchestrator wired to the mocks

pub mod clock;
pub mod harness;
pub mod memory_store;
pub mod mock_provider;

pub use clock::ManualClock;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use memory_store::{MemoryQuotaStore, StoreFailure};
pub use mock_provider::{MockProvider, image_response, text_response};

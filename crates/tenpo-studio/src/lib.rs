// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversational interior editing for the Tenpo studio.
//!
//! [`Orchestrator`] gates every generation on the daily quota, sends the
//! composed prompt into a session's conversation, and folds the reply into
//! a [`GenerationOutcome`].

pub mod catalog;
pub mod composer;
pub mod normalizer;
pub mod orchestrator;
pub mod outcome;
pub mod registry;

pub use catalog::{Chapter, RuleItem};
pub use composer::{ChatInstruction, DesignPreferences, EditMode, Slider};
pub use normalizer::{Normalized, normalize};
pub use orchestrator::{ChatRequest, Orchestrator, Phase};
pub use outcome::{Envelope, FailureKind, GenerationOutcome};
pub use registry::{ConversationRegistry, SessionHandle};

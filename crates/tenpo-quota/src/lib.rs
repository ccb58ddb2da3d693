// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily generation quota for the Tenpo interior studio.
//!
//! The quota day is a calendar day in a fixed UTC offset (JST by default).
//! [`QuotaLedger`] answers "may this user generate now" and records
//! generations through the atomic increment of a [`QuotaStore`].
//!
//! [`QuotaStore`]: tenpo_core::QuotaStore

pub mod clock;
pub mod ledger;
pub mod policy;

pub use clock::{Clock, SystemClock};
pub use ledger::QuotaLedger;
pub use policy::QuotaPolicy;

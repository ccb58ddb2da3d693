// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Quota persistence trait.

use async_trait::async_trait;

use crate::error::TenpoError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{QuotaRow, UserId};

/// Backing store for per-user daily generation counters.
#[async_trait]
pub trait QuotaStore: PluginAdapter {
    /// Reads the stored counters. `Ok(None)` means the user has no profile row.
    async fn read_quota_row(&self, user_id: &UserId) -> Result<Option<QuotaRow>, TenpoError>;

    /// Records one generation on day `today`.
    ///
    /// Implementations must reset the counter when the stored day differs
    /// from `today` and increment in a single atomic step, so concurrent
    /// calls for the same user never lose an update.
    async fn atomic_increment(&self, user_id: &UserId, today: &str)
    -> Result<QuotaRow, TenpoError>;

    /// Creates the profile row for a newly signed-up user. Idempotent.
    async fn register_user(&self, user_id: &UserId) -> Result<(), TenpoError>;
}

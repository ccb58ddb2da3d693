// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types persisted in SQLite.

use tenpo_core::QuotaRow;

/// A user profile row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub user_id: String,
    pub daily_generation_count: u32,
    /// Day key of the last counted generation, in the quota timezone.
    pub last_generation_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Profile> for QuotaRow {
    fn from(profile: &Profile) -> Self {
        QuotaRow {
            daily_generation_count: profile.daily_generation_count,
            last_generation_date: profile.last_generation_date.clone(),
        }
    }
}

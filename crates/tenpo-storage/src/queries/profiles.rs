// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile rows and their daily generation counters.

use rusqlite::{OptionalExtension, params};
use tenpo_core::{QuotaRow, TenpoError};

use crate::database::{Database, map_tr_err};
use crate::models::Profile;

const NOW: &str = "strftime('%Y-%m-%dT%H:%M:%fZ', 'now')";

/// Insert a profile row for `user_id`. Returns `false` if it already existed.
pub async fn register_profile(db: &Database, user_id: &str) -> Result<bool, TenpoError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT INTO profiles (user_id) VALUES (?1) ON CONFLICT(user_id) DO NOTHING",
                params![user_id],
            )?;
            Ok(inserted == 1)
        })
        .await
        .map_err(map_tr_err)
}

/// Get a profile by user id.
pub async fn get_profile(db: &Database, user_id: &str) -> Result<Option<Profile>, TenpoError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT user_id, daily_generation_count, last_generation_date, created_at, updated_at
                 FROM profiles WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok(Profile {
                        user_id: row.get(0)?,
                        daily_generation_count: row.get(1)?,
                        last_generation_date: row.get(2)?,
                        created_at: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Count one generation for `user_id` on day `today`.
///
/// The day comparison, reset and increment happen inside one UPDATE, so
/// concurrent callers are serialized by SQLite and never lose an update.
/// Returns `None` when the user has no profile row.
pub async fn increment_generation(
    db: &Database,
    user_id: &str,
    today: &str,
) -> Result<Option<QuotaRow>, TenpoError> {
    let user_id = user_id.to_string();
    let today = today.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!(
                    "UPDATE profiles
                     SET daily_generation_count = CASE
                             WHEN last_generation_date = ?2 THEN daily_generation_count + 1
                             ELSE 1
                         END,
                         last_generation_date = ?2,
                         updated_at = {NOW}
                     WHERE user_id = ?1
                     RETURNING daily_generation_count, last_generation_date"
                ),
                params![user_id, today],
                |row| {
                    Ok(QuotaRow {
                        daily_generation_count: row.get(0)?,
                        last_generation_date: row.get(1)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite the counters directly. Used by the CLI for support corrections.
pub async fn set_generation_count(
    db: &Database,
    user_id: &str,
    count: u32,
    date: Option<&str>,
) -> Result<bool, TenpoError> {
    let user_id = user_id.to_string();
    let date = date.map(str::to_string);
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                &format!(
                    "UPDATE profiles
                     SET daily_generation_count = ?2, last_generation_date = ?3, updated_at = {NOW}
                     WHERE user_id = ?1"
                ),
                params![user_id, count, date],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(map_tr_err)
}

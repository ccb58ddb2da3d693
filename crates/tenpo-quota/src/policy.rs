// SPDX-FileCopyrightText: 2026 Tenpo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Daily limit and quota-day arithmetic.

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, Utc};
use tenpo_config::model::QuotaConfig;
use tenpo_core::{QuotaRow, TenpoError};

/// Daily limit plus the timezone whose midnight starts a new quota day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub daily_limit: u32,
    pub offset: FixedOffset,
}

impl QuotaPolicy {
    pub fn new(daily_limit: u32, offset: FixedOffset) -> Self {
        Self {
            daily_limit,
            offset,
        }
    }

    /// Build the policy from the `[quota]` section.
    pub fn from_config(config: &QuotaConfig) -> Result<Self, TenpoError> {
        let offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            TenpoError::Config(format!(
                "quota.utc_offset_minutes {} is out of range",
                config.utc_offset_minutes
            ))
        })?;
        Ok(Self::new(config.daily_limit, offset))
    }

    /// Quota day key (`YYYY-MM-DD`) for `now` in the policy timezone.
    pub fn day_key(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.offset)
            .format("%Y-%m-%d")
            .to_string()
    }

    /// The next local midnight strictly after `now`.
    pub fn next_reset(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        let local_midnight = now
            .with_timezone(&self.offset)
            .date_naive()
            .and_time(NaiveTime::MIN)
            + TimeDelta::days(1);
        let utc = local_midnight - TimeDelta::seconds(i64::from(self.offset.local_minus_utc()));
        utc.and_utc().with_timezone(&self.offset)
    }

    /// Count that applies today: a row stamped with another day counts as zero.
    pub fn effective_count(&self, row: &QuotaRow, today: &str) -> u32 {
        match row.last_generation_date.as_deref() {
            Some(day) if day == today => row.daily_generation_count,
            _ => 0,
        }
    }

    pub fn remaining(&self, effective_count: u32) -> u32 {
        self.daily_limit.saturating_sub(effective_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn jst() -> QuotaPolicy {
        QuotaPolicy::new(20, FixedOffset::east_opt(9 * 3600).unwrap())
    }

    #[test]
    fn day_key_uses_the_policy_offset() {
        // 15:30 UTC is 00:30 the next day in JST.
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 15, 30, 0).unwrap();
        assert_eq!(jst().day_key(now), "2026-03-02");

        let utc_policy = QuotaPolicy::new(20, FixedOffset::east_opt(0).unwrap());
        assert_eq!(utc_policy.day_key(now), "2026-03-01");
    }

    #[test]
    fn next_reset_is_the_following_local_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(); // 19:00 JST
        let reset = jst().next_reset(now);
        assert_eq!(reset.to_rfc3339(), "2026-03-02T00:00:00+09:00");
        assert_eq!(
            reset.with_timezone(&Utc),
            Utc.with_ymd_and_hms(2026, 3, 1, 15, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_reset_at_exact_midnight_is_a_full_day_away() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 15, 0, 0).unwrap(); // 00:00 JST
        let reset = jst().next_reset(now);
        assert_eq!(reset.to_rfc3339(), "2026-03-03T00:00:00+09:00");
    }

    #[test]
    fn stale_rows_count_as_zero() {
        let row = QuotaRow {
            daily_generation_count: 20,
            last_generation_date: Some("2026-03-01".into()),
        };
        assert_eq!(jst().effective_count(&row, "2026-03-02"), 0);
        assert_eq!(jst().effective_count(&row, "2026-03-01"), 20);
        assert_eq!(jst().effective_count(&QuotaRow::default(), "2026-03-01"), 0);
    }

    #[test]
    fn remaining_never_goes_negative() {
        assert_eq!(jst().remaining(25), 0);
        assert_eq!(jst().remaining(5), 15);
    }

    #[test]
    fn from_config_reads_limit_and_offset() {
        let policy = QuotaPolicy::from_config(&QuotaConfig {
            daily_limit: 3,
            utc_offset_minutes: -300,
        })
        .unwrap();
        assert_eq!(policy.daily_limit, 3);
        assert_eq!(policy.offset.local_minus_utc(), -5 * 3600);
    }
}

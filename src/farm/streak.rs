//! Streak back-dating claims.
//!
//! The remote system grants streak credit for a session whose reported
//! window falls inside the unclaimed streak day, so this variant runs a
//! plain practice session with a window computed from the account's streak
//! metadata instead of "now".

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::account::AccountSnapshot;
use crate::client::DuolingoClient;
use crate::error::Result;
use crate::farm::{AttemptReport, ClaimableReward, RewardFamily};
use crate::payload::{SessionConfig, SessionWindow};
use crate::token::Identity;

const SECONDS_PER_DAY: i64 = 86_400;

/// Length the back-dated session claims to have lasted.
const SESSION_SECONDS: i64 = 60;

/// Compute the reported window for a streak-backdating session.
///
/// Priority: a known streak start date wins (the day before it); otherwise
/// a positive streak count reaches back that many days from now; otherwise
/// yesterday. The end always trails the start by sixty seconds.
pub fn streak_window(now: i64, streak_start: Option<i64>, streak_count: i64) -> SessionWindow {
    let start = match streak_start {
        Some(date) => date - SECONDS_PER_DAY,
        None if streak_count > 0 => now - streak_count * SECONDS_PER_DAY,
        None => now - SECONDS_PER_DAY,
    };
    SessionWindow {
        start,
        end: start + SESSION_SECONDS,
    }
}

/// Parse a streak start date into unix seconds at UTC midnight.
///
/// The API reports plain `YYYY-MM-DD` dates; full RFC 3339 timestamps are
/// accepted as a fallback.
fn parse_streak_date(raw: &str) -> Option<i64> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp());
    }
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.timestamp())
}

/// Back-dates one plain practice session into the unclaimed streak day.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreakReward;

#[async_trait]
impl ClaimableReward for StreakReward {
    fn family(&self) -> RewardFamily {
        RewardFamily::Streak
    }

    async fn attempt(
        &self,
        client: &DuolingoClient,
        token: &str,
        _identity: &Identity,
        snapshot: &AccountSnapshot,
    ) -> Result<AttemptReport> {
        let now = chrono::Utc::now().timestamp();
        let streak_start = snapshot.streak_start_date().and_then(parse_streak_date);
        let window = streak_window(now, streak_start, snapshot.streak.unwrap_or(0));
        tracing::debug!(start = window.start, end = window.end, "backdating session");

        client
            .run_session(token, snapshot, &SessionConfig::backdated(window))
            .await?;
        Ok(AttemptReport::new("Streak session backdated successfully"))
    }
}

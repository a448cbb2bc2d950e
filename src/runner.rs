//! Continuous claim runner with cooperative cancellation.
//!
//! Repeats one claim attempt until a round limit is reached or the
//! cancellation token fires. Cancellation is advisory and observed only at
//! iteration boundaries — an in-flight attempt always runs to completion
//! and its outcome is recorded before the run stops. Live statistics are
//! pushed through a watch channel on every iteration and discarded with the
//! run; nothing is persisted.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::farm::{AttemptReport, ClaimableReward, Farmer, RewardFamily};

/// Observable gems granted by one successful gem claim.
const GEMS_PER_CLAIM: u64 = 30;

/// Fixed pause between iterations, to avoid a tight hot loop.
const DEFAULT_PAUSE: Duration = Duration::from_millis(100);

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    /// Stop was requested while an attempt was in flight; the run winds
    /// down after recording that attempt's outcome.
    StoppingRequested,
    Stopped,
}

/// How many rounds a run is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundLimit {
    Unlimited,
    Limited(u32),
}

/// Point-in-time view of a run's statistics.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSnapshot {
    pub state: RunState,
    pub success_count: u64,
    pub failed_count: u64,
    pub gem_rounds: u64,
    pub session_rounds: u64,
    pub story_rounds: u64,
    pub streak_rounds: u64,
    /// Sum of the XP the remote reported across successful rounds.
    pub total_xp: u64,
    /// Estimated gems collected (fixed amount per gem round).
    pub estimated_gems: u64,
    pub elapsed_secs: f64,
    /// Successful rounds per minute over the run so far.
    pub rate_per_minute: f64,
    /// Message of the most recent failed attempt, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Mutable counters owned by one run, created at start and dropped at end.
struct StatsTracker {
    started: Instant,
    family: RewardFamily,
    success_count: u64,
    failed_count: u64,
    family_rounds: u64,
    total_xp: u64,
    last_error: Option<String>,
}

impl StatsTracker {
    fn start(family: RewardFamily) -> Self {
        Self {
            started: Instant::now(),
            family,
            success_count: 0,
            failed_count: 0,
            family_rounds: 0,
            total_xp: 0,
            last_error: None,
        }
    }

    fn record_success(&mut self, report: &AttemptReport) {
        self.success_count += 1;
        self.family_rounds += 1;
        self.total_xp += report.xp_gained.unwrap_or(0);
    }

    /// Failures only move the global counter, never a family round.
    fn record_failure(&mut self, message: String) {
        self.failed_count += 1;
        self.last_error = Some(message);
    }

    fn snapshot(&self, state: RunState) -> RunSnapshot {
        let elapsed_secs = self.started.elapsed().as_secs_f64();
        let rate_per_minute = if elapsed_secs > 0.0 {
            self.success_count as f64 / elapsed_secs * 60.0
        } else {
            0.0
        };
        let rounds = |family| {
            if self.family == family {
                self.family_rounds
            } else {
                0
            }
        };
        RunSnapshot {
            state,
            success_count: self.success_count,
            failed_count: self.failed_count,
            gem_rounds: rounds(RewardFamily::Gem),
            session_rounds: rounds(RewardFamily::SessionXp),
            story_rounds: rounds(RewardFamily::StoryXp),
            streak_rounds: rounds(RewardFamily::Streak),
            total_xp: self.total_xp,
            estimated_gems: rounds(RewardFamily::Gem) * GEMS_PER_CLAIM,
            elapsed_secs,
            rate_per_minute,
            last_error: self.last_error.clone(),
        }
    }
}

/// Repeats claim attempts under a cooperative stop signal.
#[derive(Debug, Clone)]
pub struct ContinuousRunner {
    pause: Duration,
}

impl Default for ContinuousRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ContinuousRunner {
    pub fn new() -> Self {
        Self {
            pause: DEFAULT_PAUSE,
        }
    }

    /// Override the inter-iteration pause. Must stay non-zero.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Run `attempt` repeatedly until the limit is reached or stop is
    /// requested, publishing a [`RunSnapshot`] after every iteration.
    ///
    /// The attempt future is never raced against the token: a stop request
    /// that arrives mid-attempt takes effect only after that attempt's
    /// outcome is recorded.
    pub async fn run<F, Fut>(
        &self,
        family: RewardFamily,
        attempt: F,
        limit: RoundLimit,
        cancel: CancellationToken,
        updates: &watch::Sender<RunSnapshot>,
    ) -> RunSnapshot
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<AttemptReport>>,
    {
        let mut stats = StatsTracker::start(family);
        let mut rounds: u32 = 0;
        tracing::info!(family = family.as_str(), "run started");

        loop {
            if cancel.is_cancelled() {
                break;
            }

            match attempt().await {
                Ok(report) => stats.record_success(&report),
                Err(err) => {
                    tracing::warn!(family = family.as_str(), error = %err, "attempt failed");
                    stats.record_failure(err.to_string());
                }
            }
            rounds += 1;

            let state = if cancel.is_cancelled() {
                RunState::StoppingRequested
            } else {
                RunState::Running
            };
            let _ = updates.send(stats.snapshot(state));

            if let RoundLimit::Limited(n) = limit
                && rounds >= n
            {
                break;
            }

            // Iteration boundary: the pause is the only place the stop
            // signal can cut a wait short.
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(self.pause) => {}
            }
        }

        let last = stats.snapshot(RunState::Stopped);
        let _ = updates.send(last.clone());
        tracing::info!(
            family = family.as_str(),
            ok = last.success_count,
            failed = last.failed_count,
            "run stopped"
        );
        last
    }

    /// Convenience wiring: repeatedly claim `reward` through `farmer`.
    pub async fn run_reward(
        &self,
        farmer: &Farmer,
        reward: &dyn ClaimableReward,
        token: &str,
        limit: RoundLimit,
        cancel: CancellationToken,
        updates: &watch::Sender<RunSnapshot>,
    ) -> RunSnapshot {
        self.run(
            reward.family(),
            || farmer.claim(reward, token),
            limit,
            cancel,
            updates,
        )
        .await
    }
}

//! Reward claim orchestration.
//!
//! Each reward family implements [`ClaimableReward`]: given a validated
//! identity and a fresh account snapshot, shape and issue the remote calls
//! for one claim. The [`Farmer`] is the single front door — it validates the
//! token, derives the identity, fetches the snapshot and delegates to the
//! family. Nothing in here retries; bounded and unbounded repetition live in
//! [`crate::batch`] and [`crate::runner`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::account::AccountSnapshot;
use crate::batch::{BatchReport, DEFAULT_STAGGER, run_batch};
use crate::client::DuolingoClient;
use crate::error::Result;
use crate::token::{self, Identity};

mod gem;
mod session;
mod story;
mod streak;

pub use gem::GemReward;
pub use session::SessionReward;
pub use story::StoryReward;
pub use streak::{StreakReward, streak_window};

/// The claimable reward categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardFamily {
    Gem,
    SessionXp,
    StoryXp,
    Streak,
}

impl RewardFamily {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gem => "gem",
            Self::SessionXp => "session_xp",
            Self::StoryXp => "story_xp",
            Self::Streak => "streak",
        }
    }
}

/// Normalized outcome of one successful claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptReport {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp_gained: Option<u64>,
}

impl AttemptReport {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            xp_gained: None,
        }
    }

    pub fn with_xp(mut self, xp: u64) -> Self {
        self.xp_gained = Some(xp);
        self
    }
}

/// One reward family's claim capability.
///
/// Implementations own their configuration resolution and request shaping;
/// they receive the snapshot read-only and must not retry internally.
#[async_trait]
pub trait ClaimableReward: Send + Sync {
    /// The family this reward belongs to, for statistics bucketing.
    fn family(&self) -> RewardFamily;

    /// Issue the remote calls for one claim.
    async fn attempt(
        &self,
        client: &DuolingoClient,
        token: &str,
        identity: &Identity,
        snapshot: &AccountSnapshot,
    ) -> Result<AttemptReport>;
}

/// Single-attempt orchestrator.
///
/// Validate token → derive identity → fetch snapshot → delegate to the
/// reward family. Every failure propagates immediately; the caller decides
/// whether to aggregate it.
#[derive(Debug, Clone, Default)]
pub struct Farmer {
    client: DuolingoClient,
}

impl Farmer {
    pub fn new(client: DuolingoClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &DuolingoClient {
        &self.client
    }

    /// Validate the token and fetch the account snapshot for its subject.
    pub async fn fetch_account(&self, token: &str) -> Result<(Identity, AccountSnapshot)> {
        token::validate(token)?;
        let identity = token::decode(token)?;
        let snapshot = self.client.get_user(identity.sub, token).await?;
        Ok((identity, snapshot))
    }

    /// Run one claim attempt for the given reward.
    pub async fn claim(
        &self,
        reward: &dyn ClaimableReward,
        token: &str,
    ) -> Result<AttemptReport> {
        let (identity, snapshot) = self.fetch_account(token).await?;
        tracing::info!(
            family = reward.family().as_str(),
            user_id = identity.sub,
            "claim attempt"
        );
        reward.attempt(&self.client, token, &identity, &snapshot).await
    }

    /// Claim the fixed gem reward once.
    pub async fn farm_gem(&self, token: &str) -> Result<AttemptReport> {
        self.claim(&GemReward, token).await
    }

    /// Run one configured practice session for the given XP tier.
    pub async fn farm_session(&self, token: &str, magnitude: u32) -> Result<AttemptReport> {
        self.claim(&SessionReward::new(magnitude)?, token).await
    }

    /// Complete the fixed story for the given XP tier.
    pub async fn farm_story(&self, token: &str, magnitude: u32) -> Result<AttemptReport> {
        self.claim(&StoryReward::new(magnitude)?, token).await
    }

    /// Back-date one session into the unclaimed streak day.
    pub async fn farm_streak(&self, token: &str) -> Result<AttemptReport> {
        self.claim(&StreakReward, token).await
    }
}

/// An abstract reward request as the controller layer hands it over.
///
/// `times` outside `[1, 10]` is rejected by caller-side validation before it
/// gets here; this layer treats any `times > 1` as a batch.
#[derive(Debug, Clone, Deserialize)]
pub struct FarmRequest {
    pub token: String,
    pub family: RewardFamily,
    #[serde(default)]
    pub magnitude: Option<u32>,
    #[serde(default)]
    pub times: Option<u32>,
}

/// Either a raw single-attempt report or an aggregate batch report.
///
/// A single attempt's failure surfaces as the raw error; batch failures are
/// folded into the report instead.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum FarmOutcome {
    Single(AttemptReport),
    Batch(BatchReport),
}

fn build_reward(family: RewardFamily, magnitude: Option<u32>) -> Result<Box<dyn ClaimableReward>> {
    match family {
        RewardFamily::Gem => Ok(Box::new(GemReward)),
        RewardFamily::Streak => Ok(Box::new(StreakReward)),
        RewardFamily::SessionXp => {
            let magnitude = magnitude.unwrap_or(0);
            Ok(Box::new(SessionReward::new(magnitude)?))
        }
        RewardFamily::StoryXp => {
            let magnitude = magnitude.unwrap_or(0);
            Ok(Box::new(StoryReward::new(magnitude)?))
        }
    }
}

/// Dispatch a reward request to a single attempt or a staggered batch.
///
/// `times` of `None` or `1` behaves exactly like calling the single-attempt
/// path directly: no aggregate wrapper, raw error on failure.
pub async fn farm(farmer: &Farmer, request: &FarmRequest) -> Result<FarmOutcome> {
    let reward = build_reward(request.family, request.magnitude)?;
    match request.times {
        None | Some(0 | 1) => {
            let report = farmer.claim(reward.as_ref(), &request.token).await?;
            Ok(FarmOutcome::Single(report))
        }
        Some(times) => {
            let report = run_batch(
                |_| farmer.claim(reward.as_ref(), &request.token),
                times as usize,
                DEFAULT_STAGGER,
            )
            .await;
            Ok(FarmOutcome::Batch(report))
        }
    }
}

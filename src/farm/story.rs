//! Story completion claims.

use async_trait::async_trait;
use serde_json::Value;

use crate::account::AccountSnapshot;
use crate::client::DuolingoClient;
use crate::error::{FarmError, Result};
use crate::farm::session::join_magnitudes;
use crate::farm::{AttemptReport, ClaimableReward, RewardFamily};
use crate::payload::{STORY_MAGNITUDES, story_config};
use crate::token::Identity;

/// Completes the fixed story with a bonus-XP delta for a fixed XP tier.
#[derive(Debug, Clone, Copy)]
pub struct StoryReward {
    magnitude: u32,
}

impl StoryReward {
    /// Create a story reward for one of the known XP tiers.
    ///
    /// Unknown magnitudes fail here, before any network call is made.
    pub fn new(magnitude: u32) -> Result<Self> {
        if !STORY_MAGNITUDES.contains(&magnitude) {
            return Err(FarmError::InvalidMagnitude {
                magnitude,
                valid: join_magnitudes(&STORY_MAGNITUDES),
            });
        }
        Ok(Self { magnitude })
    }

    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }
}

#[async_trait]
impl ClaimableReward for StoryReward {
    fn family(&self) -> RewardFamily {
        RewardFamily::StoryXp
    }

    async fn attempt(
        &self,
        client: &DuolingoClient,
        token: &str,
        _identity: &Identity,
        snapshot: &AccountSnapshot,
    ) -> Result<AttemptReport> {
        let delta = story_config(self.magnitude).ok_or_else(|| FarmError::InvalidMagnitude {
            magnitude: self.magnitude,
            valid: join_magnitudes(&STORY_MAGNITUDES),
        })?;

        let result = client.complete_story(token, snapshot, &delta).await?;
        let xp = xp_from_story(&result);
        Ok(AttemptReport::new(format!(
            "Story completed successfully. XP gained: {xp}"
        ))
        .with_xp(xp))
    }
}

/// Stories report XP under `awardedXp` first; `xpGain` is the legacy key.
fn xp_from_story(result: &Value) -> u64 {
    result["awardedXp"]
        .as_u64()
        .or_else(|| result["xpGain"].as_u64())
        .unwrap_or(0)
}

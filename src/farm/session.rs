//! Configured practice session claims.

use async_trait::async_trait;
use serde_json::Value;

use crate::account::{AccountSnapshot, find_skill_id};
use crate::client::DuolingoClient;
use crate::error::{FarmError, Result};
use crate::farm::{AttemptReport, ClaimableReward, RewardFamily};
use crate::payload::{SESSION_MAGNITUDES, session_config};
use crate::token::Identity;

/// The unit-test tier needs a concrete skill to test against.
const UNIT_TEST_MAGNITUDE: u32 = 110;

/// Runs one practice session shaped for a fixed XP tier.
#[derive(Debug, Clone, Copy)]
pub struct SessionReward {
    magnitude: u32,
}

impl SessionReward {
    /// Create a session reward for one of the known XP tiers.
    ///
    /// Unknown magnitudes fail here, before any network call is made.
    pub fn new(magnitude: u32) -> Result<Self> {
        if !SESSION_MAGNITUDES.contains(&magnitude) {
            return Err(FarmError::InvalidMagnitude {
                magnitude,
                valid: join_magnitudes(&SESSION_MAGNITUDES),
            });
        }
        Ok(Self { magnitude })
    }

    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }
}

#[async_trait]
impl ClaimableReward for SessionReward {
    fn family(&self) -> RewardFamily {
        RewardFamily::SessionXp
    }

    async fn attempt(
        &self,
        client: &DuolingoClient,
        token: &str,
        _identity: &Identity,
        snapshot: &AccountSnapshot,
    ) -> Result<AttemptReport> {
        let skill_id = if self.magnitude == UNIT_TEST_MAGNITUDE {
            let id = find_skill_id(snapshot.current_course.as_ref())
                .ok_or(FarmError::SkillNotFound)?;
            Some(id.to_owned())
        } else {
            None
        };

        let config = session_config(self.magnitude, skill_id.as_deref()).ok_or_else(|| {
            FarmError::InvalidMagnitude {
                magnitude: self.magnitude,
                valid: join_magnitudes(&SESSION_MAGNITUDES),
            }
        })?;

        let result = client.run_session(token, snapshot, &config).await?;
        let xp = xp_from_session(&result);
        Ok(AttemptReport::new(format!(
            "Session completed successfully. XP gained: {xp}"
        ))
        .with_xp(xp))
    }
}

/// Sessions report XP under `xpGain`, older responses under `awardedXp`.
fn xp_from_session(result: &Value) -> u64 {
    result["xpGain"]
        .as_u64()
        .or_else(|| result["awardedXp"].as_u64())
        .unwrap_or(0)
}

pub(crate) fn join_magnitudes(magnitudes: &[u32]) -> String {
    magnitudes
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

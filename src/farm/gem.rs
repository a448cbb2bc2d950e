//! Fixed-identity gem reward.

use async_trait::async_trait;

use crate::account::AccountSnapshot;
use crate::client::DuolingoClient;
use crate::error::Result;
use crate::farm::{AttemptReport, ClaimableReward, RewardFamily};
use crate::token::Identity;

/// Claims the one gem reward the API hands out repeatedly. No configuration
/// to resolve; the claim body only echoes the account's language pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct GemReward;

#[async_trait]
impl ClaimableReward for GemReward {
    fn family(&self) -> RewardFamily {
        RewardFamily::Gem
    }

    async fn attempt(
        &self,
        client: &DuolingoClient,
        token: &str,
        identity: &Identity,
        snapshot: &AccountSnapshot,
    ) -> Result<AttemptReport> {
        client
            .claim_gem_reward(identity.sub, token, snapshot)
            .await?;
        Ok(AttemptReport::new("Gem claimed successfully"))
    }
}

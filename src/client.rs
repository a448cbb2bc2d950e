//! Duolingo API client.
//!
//! Stateless call set over a shared `reqwest` client: fetch the account
//! snapshot, claim the fixed gem reward, create + finalize a timed practice
//! session, and complete a story. Request bodies are built by shallow-merging
//! a fixed base object with the resolved delta (delta wins).
//!
//! Base URLs are overridable so tests can point the client at a mock server.

use serde_json::{Value, json};

use crate::account::AccountSnapshot;
use crate::error::{FarmError, Result};
use crate::payload::{SessionConfig, merge_payload};

/// Production endpoint for the main API.
pub const DEFAULT_BASE_URL: &str = "https://www.duolingo.com";

/// Production endpoint for the stories API.
pub const DEFAULT_STORIES_URL: &str = "https://stories.duolingo.com";

/// The API rejects non-browser user agents, so every request impersonates a
/// desktop Chrome.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Identity of the one gem reward that is claimable repeatedly.
const GEM_REWARD_ID: &str =
    "SKILL_COMPLETION_BALANCED-dd2495f4_d44e_3fc3_8ac8_94e2191506f0-2-GEMS";

/// Field projection requested with the user document, including the nested
/// curriculum tree the skill locator walks.
const USER_FIELDS: &str = "id,username,fromLanguage,learningLanguage,streak,totalXp,level,\
     numFollowers,numFollowing,gems,creationDate,streakData,privacySettings,\
     currentCourse{pathSectioned{units{levels{pathLevelMetadata{skillId},\
     pathLevelClientData{skillId}}}}}";

/// Client for the four remote operations the orchestration needs.
#[derive(Debug, Clone)]
pub struct DuolingoClient {
    http: reqwest::Client,
    base_url: String,
    stories_url: String,
}

impl Default for DuolingoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl DuolingoClient {
    /// Create a client against the production endpoints.
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_owned(),
            stories_url: DEFAULT_STORIES_URL.to_owned(),
        }
    }

    /// Override the main API base URL (useful for testing with mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the stories API base URL.
    pub fn with_stories_url(mut self, stories_url: impl Into<String>) -> Self {
        self.stories_url = stories_url.into();
        self
    }

    /// Fetch the account snapshot for a user.
    ///
    /// A 404 or an empty document maps to [`FarmError::AccountNotFound`].
    pub async fn get_user(&self, user_id: u64, token: &str) -> Result<AccountSnapshot> {
        let url = format!(
            "{}/2017-06-30/users/{user_id}?fields={USER_FIELDS}",
            self.base_url
        );
        tracing::debug!(user_id, "fetching account snapshot");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(FarmError::AccountNotFound { user_id });
        }
        let body: Value = check_status(response).await?.json().await?;
        if body.is_null() {
            return Err(FarmError::AccountNotFound { user_id });
        }
        serde_json::from_value(body).map_err(|e| FarmError::RemoteApi {
            status: 200,
            body: format!("unreadable user document: {e}"),
        })
    }

    /// Claim the fixed-identity gem reward by marking it consumed.
    pub async fn claim_gem_reward(
        &self,
        user_id: u64,
        token: &str,
        snapshot: &AccountSnapshot,
    ) -> Result<Value> {
        let url = format!(
            "{}/2017-06-30/users/{user_id}/rewards/{GEM_REWARD_ID}",
            self.base_url
        );
        let body = json!({
            "consumed": true,
            "learningLanguage": snapshot.learning_language(),
            "fromLanguage": snapshot.from_language(),
        });
        tracing::debug!(user_id, "claiming gem reward");

        let response = self
            .http
            .patch(&url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .json(&body)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Create and immediately finalize a practice session.
    ///
    /// The session is created with the merged creation payload, then closed
    /// with a finalization payload that reports a short completed window.
    /// The configured window (if any) backdates that report.
    pub async fn run_session(
        &self,
        token: &str,
        snapshot: &AccountSnapshot,
        config: &SessionConfig,
    ) -> Result<Value> {
        let (start_time, end_time) = match config.window {
            Some(window) => (window.start, window.end),
            None => {
                let now = chrono::Utc::now().timestamp();
                (now, now + 60)
            }
        };

        let create_base = json!({
            "challengeTypes": [],
            "fromLanguage": snapshot.from_language(),
            "learningLanguage": snapshot.learning_language(),
            "type": "GLOBAL_PRACTICE",
        });
        let create_body = merge_payload(create_base, &config.create);

        tracing::debug!(session_type = ?create_body["type"], "creating session");
        let response = self
            .http
            .post(format!("{}/2017-06-30/sessions", self.base_url))
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .json(&create_body)
            .send()
            .await?;
        let created: Value = check_status(response).await?.json().await?;

        let session_id = created["id"].as_str().map(str::to_owned).ok_or_else(|| {
            FarmError::RemoteApi {
                status: 200,
                body: "session creation response carried no id".to_owned(),
            }
        })?;

        let finalize_base = json!({
            "id": session_id,
            "metadata": created["metadata"],
            "type": created["type"],
            "fromLanguage": snapshot.from_language(),
            "learningLanguage": snapshot.learning_language(),
            "challenges": [],
            "adaptiveChallenges": [],
            "sessionExperimentRecord": [],
            "experiments_with_treatment_contexts": [],
            "adaptiveInterleavedChallenges": [],
            "sessionStartExperiments": [],
            "trackingProperties": [],
            "ttsAnnotations": [],
            "heartsLeft": 0,
            "startTime": start_time,
            "enableBonusPoints": false,
            "endTime": end_time,
            "failed": false,
            "maxInLessonStreak": 9,
            "shouldLearnThings": true,
        });
        let finalize_body = merge_payload(finalize_base, &config.finalize);

        tracing::debug!(%session_id, "finalizing session");
        let response = self
            .http
            .put(format!(
                "{}/2017-06-30/sessions/{session_id}",
                self.base_url
            ))
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .json(&finalize_body)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Complete the fixed narrative unit and collect its XP.
    ///
    /// The story slug is derived from the account's source language; "the
    /// passport" exists for every course pair.
    pub async fn complete_story(
        &self,
        token: &str,
        snapshot: &AccountSnapshot,
        delta: &Value,
    ) -> Result<Value> {
        let from_language = snapshot.from_language();
        let url = format!(
            "{}/api2/stories/en-{from_language}-the-passport/complete",
            self.stories_url
        );
        let base = json!({
            "awardXp": true,
            "isFeaturedStoryInPracticeHub": false,
            "completedBonusChallenge": true,
            "mode": "READ",
            "isV2Redo": false,
            "isV2Story": false,
            "isLegendaryMode": true,
            "masterVersion": false,
            "maxScore": 0,
            "numHintsUsed": 0,
            "score": 0,
            "startTime": chrono::Utc::now().timestamp(),
            "fromLanguage": from_language,
            "learningLanguage": snapshot.learning_language(),
            "hasXpBoost": false,
        });
        let body = merge_payload(base, delta);

        tracing::debug!(%from_language, "completing story");
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, BROWSER_USER_AGENT)
            .json(&body)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }
}

/// Map a non-success response to [`FarmError::RemoteApi`], keeping the
/// response body as context.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "remote call failed");
    Err(FarmError::RemoteApi {
        status: status.as_u16(),
        body,
    })
}

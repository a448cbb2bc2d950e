//! Duolingo client contract tests.
//!
//! Verify exact HTTP shapes against a mock server: paths, auth headers,
//! merged request bodies and error mapping.

mod common;

use common::{snapshot_json, token_for};
use duofarm::payload::{SessionConfig, SessionWindow, session_config, story_config};
use duofarm::{AccountSnapshot, DuolingoClient, FarmError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn snapshot() -> AccountSnapshot {
    serde_json::from_value(snapshot_json()).expect("fixture snapshot decodes")
}

// ────────────────────────────────────────────────────────────────────────────
// Account snapshot fetch
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_user_sends_bearer_and_browser_user_agent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2017-06-30/users/42"))
        .and(header("authorization", format!("Bearer {}", token_for(42))))
        // wiremock's exact header matcher treats commas as value separators, so
        // the comma-containing user agent must be supplied as its split parts.
        .and(headers(
            "user-agent",
            vec![
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML",
                "like Gecko) Chrome/126.0.0.0 Safari/537.36",
            ],
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(snapshot_json()))
        .expect(1)
        .mount(&server)
        .await;

    let client = DuolingoClient::new().with_base_url(server.uri());
    let snapshot = client.get_user(42, &token_for(42)).await.expect("fetch succeeds");
    assert_eq!(snapshot.id, Some(42));
    assert_eq!(snapshot.learning_language(), "en");
    assert_eq!(snapshot.from_language(), "fr");
}

#[tokio::test]
async fn get_user_maps_404_to_account_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2017-06-30/users/7"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = DuolingoClient::new().with_base_url(server.uri());
    let err = client.get_user(7, &token_for(7)).await.unwrap_err();
    assert!(matches!(err, FarmError::AccountNotFound { user_id: 7 }));
}

#[tokio::test]
async fn get_user_surfaces_remote_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2017-06-30/users/7"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream broke"))
        .mount(&server)
        .await;

    let client = DuolingoClient::new().with_base_url(server.uri());
    match client.get_user(7, &token_for(7)).await.unwrap_err() {
        FarmError::RemoteApi { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream broke");
        }
        other => panic!("expected RemoteApi, got {other}"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Gem claim
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn gem_claim_patches_the_fixed_reward_with_language_pair() {
    let server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(
            "/2017-06-30/users/42/rewards/SKILL_COMPLETION_BALANCED-dd2495f4_d44e_3fc3_8ac8_94e2191506f0-2-GEMS",
        ))
        .and(body_partial_json(json!({
            "consumed": true,
            "learningLanguage": "en",
            "fromLanguage": "fr",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "consumed": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DuolingoClient::new().with_base_url(server.uri());
    let result = client
        .claim_gem_reward(42, &token_for(42), &snapshot())
        .await
        .expect("claim succeeds");
    assert_eq!(result["consumed"], json!(true));
}

// ────────────────────────────────────────────────────────────────────────────
// Session create + finalize
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_flow_creates_then_finalizes_with_merged_payloads() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2017-06-30/sessions"))
        .and(body_partial_json(json!({
            "type": "GLOBAL_PRACTICE",
            "challengeTypes": [],
            "fromLanguage": "fr",
            "learningLanguage": "en",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "session-123",
            "type": "GLOBAL_PRACTICE",
            "metadata": { "seed": 9 },
        })))
        .expect(1)
        .mount(&server)
        .await;

    // Tier 50 flags land in the finalize body only.
    Mock::given(method("PUT"))
        .and(path("/2017-06-30/sessions/session-123"))
        .and(body_partial_json(json!({
            "id": "session-123",
            "metadata": { "seed": 9 },
            "enableBonusPoints": true,
            "hasBoost": true,
            "happyHourBonusXp": 10,
            "type": "TARGET_PRACTICE",
            "heartsLeft": 0,
            "failed": false,
            "maxInLessonStreak": 9,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "xpGain": 50 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DuolingoClient::new().with_base_url(server.uri());
    let config = session_config(50, None).expect("tier 50 resolves");
    let result = client
        .run_session(&token_for(42), &snapshot(), &config)
        .await
        .expect("session flow succeeds");
    assert_eq!(result["xpGain"], json!(50));
}

#[tokio::test]
async fn unit_test_session_carries_the_skill_id_in_the_create_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2017-06-30/sessions"))
        .and(body_partial_json(json!({
            "type": "UNIT_TEST",
            "skillIds": ["skill-abc"],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s-1",
            "type": "UNIT_TEST",
            "metadata": {},
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/2017-06-30/sessions/s-1"))
        .and(body_partial_json(json!({
            "type": "UNIT_TEST",
            "pathLevelSpecifics": { "unitIndex": 0 },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "xpGain": 110 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DuolingoClient::new().with_base_url(server.uri());
    let config = session_config(110, Some("skill-abc")).expect("tier 110 resolves");
    let result = client
        .run_session(&token_for(42), &snapshot(), &config)
        .await
        .expect("session flow succeeds");
    assert_eq!(result["xpGain"], json!(110));
}

#[tokio::test]
async fn backdated_window_overrides_the_reported_times() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2017-06-30/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "s-2",
            "type": "GLOBAL_PRACTICE",
            "metadata": {},
        })))
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/2017-06-30/sessions/s-2"))
        .and(body_partial_json(json!({
            "startTime": 1_000_000,
            "endTime": 1_000_060,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = DuolingoClient::new().with_base_url(server.uri());
    let config = SessionConfig::backdated(SessionWindow {
        start: 1_000_000,
        end: 1_000_060,
    });
    client
        .run_session(&token_for(42), &snapshot(), &config)
        .await
        .expect("backdated session succeeds");
}

#[tokio::test]
async fn session_creation_without_an_id_is_a_remote_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/2017-06-30/sessions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "type": "GLOBAL_PRACTICE" })))
        .mount(&server)
        .await;

    let client = DuolingoClient::new().with_base_url(server.uri());
    let err = client
        .run_session(&token_for(42), &snapshot(), &SessionConfig::plain())
        .await
        .unwrap_err();
    assert!(matches!(err, FarmError::RemoteApi { .. }), "got {err}");
}

// ────────────────────────────────────────────────────────────────────────────
// Story completion
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn story_completion_posts_the_language_derived_slug() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api2/stories/en-fr-the-passport/complete"))
        .and(body_partial_json(json!({
            "awardXp": true,
            "isLegendaryMode": true,
            "mode": "READ",
            "happyHourBonusXp": 150,
            "fromLanguage": "fr",
            "learningLanguage": "en",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "awardedXp": 200 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = DuolingoClient::new().with_stories_url(server.uri());
    let delta = story_config(200).expect("tier 200 resolves");
    let result = client
        .complete_story(&token_for(42), &snapshot(), &delta)
        .await
        .expect("story completes");
    assert_eq!(result["awardedXp"], json!(200));
}

#[tokio::test]
async fn story_error_keeps_the_remote_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api2/stories/en-fr-the-passport/complete"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let client = DuolingoClient::new().with_stories_url(server.uri());
    let err = client
        .complete_story(&token_for(42), &snapshot(), &json!({}))
        .await
        .unwrap_err();
    match err {
        FarmError::RemoteApi { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "Forbidden");
        }
        other => panic!("expected RemoteApi, got {other}"),
    }
}

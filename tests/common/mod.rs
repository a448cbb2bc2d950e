//! Shared fixtures for the mock-server test suites.

#![allow(dead_code)]

use base64::Engine;
use duofarm::{DuolingoClient, Farmer};
use serde_json::{Value, json};
use wiremock::MockServer;

/// Far-future expiry so fixture tokens never age out.
const FOREVER: u64 = 4_100_000_000;

fn encode_token(payload: &Value) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = engine.encode(serde_json::to_vec(payload).expect("serializable payload"));
    format!("{header}.{body}.test-signature")
}

/// A valid token for the given user id.
pub fn token_for(sub: u64) -> String {
    encode_token(&json!({ "sub": sub, "iat": 1_700_000_000, "exp": FOREVER }))
}

/// A token whose expiry has already passed.
pub fn expired_token(sub: u64) -> String {
    encode_token(&json!({ "sub": sub, "exp": 1_000 }))
}

/// Minimal user document: language pair and streak metadata, no course.
pub fn snapshot_json() -> Value {
    json!({
        "id": 42,
        "username": "learner",
        "fromLanguage": "fr",
        "learningLanguage": "en",
        "streak": 3,
        "totalXp": 1200,
        "gems": 500,
    })
}

/// User document whose curriculum exposes a single skill id.
pub fn snapshot_with_skill(skill_id: &str) -> Value {
    let mut snapshot = snapshot_json();
    snapshot["currentCourse"] = json!({
        "pathSectioned": [
            { "units": [ { "levels": [
                {},
                { "pathLevelMetadata": { "skillId": skill_id } },
            ] } ] },
        ]
    });
    snapshot
}

/// A farmer whose client points both APIs at the mock server.
pub fn farmer_for(server: &MockServer) -> Farmer {
    Farmer::new(
        DuolingoClient::new()
            .with_base_url(server.uri())
            .with_stories_url(server.uri()),
    )
}

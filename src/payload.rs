//! Reward payload configuration.
//!
//! Each XP tier maps to a fixed pair of payload deltas merged onto the
//! family base payloads before transmission. The tiers are a lookup table,
//! not a formula: an unknown magnitude is a hard input failure, never an
//! approximation. New tiers are added by adding table rows.

use serde_json::{Value, json};

/// Session XP magnitudes the table knows about.
pub const SESSION_MAGNITUDES: [u32; 5] = [10, 20, 40, 50, 110];

/// Story XP magnitudes the table knows about.
pub const STORY_MAGNITUDES: [u32; 6] = [50, 100, 200, 300, 400, 499];

/// Reported time window of a practice session, unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionWindow {
    pub start: i64,
    pub end: i64,
}

/// Deltas applied to the create/finalize payloads of one timed session.
///
/// Immutable once resolved; one instance is produced per attempt.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Merged into the session creation (POST) body.
    pub create: Value,
    /// Merged into the session finalization (PUT) body.
    pub finalize: Value,
    /// Overrides the reported session window; `None` means "now".
    pub window: Option<SessionWindow>,
}

impl SessionConfig {
    /// An empty delta pair: the base payloads go out unchanged.
    pub fn plain() -> Self {
        Self {
            create: json!({}),
            finalize: json!({}),
            window: None,
        }
    }

    /// An empty delta pair with a back-dated session window.
    pub fn backdated(window: SessionWindow) -> Self {
        Self {
            window: Some(window),
            ..Self::plain()
        }
    }
}

/// Resolve the payload deltas for one session XP tier.
///
/// Higher tiers carry a superset of the lower tiers' flags. The 110 tier is
/// the only one that references a skill: its creation payload switches to a
/// unit test over exactly the supplied skill id. Returns `None` for any
/// magnitude outside [`SESSION_MAGNITUDES`].
pub fn session_config(magnitude: u32, skill_id: Option<&str>) -> Option<SessionConfig> {
    let (create, finalize) = match magnitude {
        10 => (json!({}), json!({})),
        20 => (json!({}), json!({ "hasBoost": true })),
        40 => (
            json!({}),
            json!({ "hasBoost": true, "type": "TARGET_PRACTICE" }),
        ),
        50 => (
            json!({}),
            json!({
                "enableBonusPoints": true,
                "hasBoost": true,
                "happyHourBonusXp": 10,
                "type": "TARGET_PRACTICE",
            }),
        ),
        110 => (
            json!({
                "type": "UNIT_TEST",
                "skillIds": skill_id.map_or_else(Vec::new, |id| vec![id.to_owned()]),
            }),
            json!({
                "type": "UNIT_TEST",
                "hasBoost": true,
                "happyHourBonusXp": 10,
                "pathLevelSpecifics": { "unitIndex": 0 },
            }),
        ),
        _ => return None,
    };
    Some(SessionConfig {
        create,
        finalize,
        window: None,
    })
}

/// Resolve the payload delta for one story XP tier.
///
/// The delta is solely a bonus-XP value, non-decreasing in magnitude; the
/// base tier (50) carries none. Returns `None` for any magnitude outside
/// [`STORY_MAGNITUDES`].
pub fn story_config(magnitude: u32) -> Option<Value> {
    match magnitude {
        50 => Some(json!({})),
        100 => Some(json!({ "happyHourBonusXp": 50 })),
        200 => Some(json!({ "happyHourBonusXp": 150 })),
        300 => Some(json!({ "happyHourBonusXp": 250 })),
        400 => Some(json!({ "happyHourBonusXp": 350 })),
        499 => Some(json!({ "happyHourBonusXp": 449 })),
        _ => None,
    }
}

/// Shallow-merge a delta object onto a base object.
///
/// Delta keys win on conflict; array and object values replace the base
/// value wholesale, they are never merged element-wise. A non-object delta
/// leaves the base untouched.
pub fn merge_payload(mut base: Value, delta: &Value) -> Value {
    if let (Some(base_map), Some(delta_map)) = (base.as_object_mut(), delta.as_object()) {
        for (key, value) in delta_map {
            base_map.insert(key.clone(), value.clone());
        }
    }
    base
}

//! Account snapshot types and curriculum traversal.
//!
//! [`AccountSnapshot`] mirrors the subset of the Duolingo user document the
//! farming flows read. Everything is decoded leniently: the API regularly
//! omits fields depending on the account's state, and a missing field must
//! never fail the whole claim.

use serde::{Deserialize, Serialize};

/// Read-only view of a user account, fetched once per attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccountSnapshot {
    pub id: Option<u64>,
    pub username: Option<String>,
    /// UI language, used as the source language of shaped requests.
    pub from_language: Option<String>,
    pub learning_language: Option<String>,
    /// Current streak length in days.
    pub streak: Option<i64>,
    pub total_xp: Option<u64>,
    pub gems: Option<u64>,
    pub streak_data: Option<StreakData>,
    pub current_course: Option<CurrentCourse>,
}

impl AccountSnapshot {
    /// Source language, defaulting to English when the API omits it.
    pub fn from_language(&self) -> &str {
        self.from_language.as_deref().unwrap_or("en")
    }

    /// Target language, defaulting to English when the API omits it.
    pub fn learning_language(&self) -> &str {
        self.learning_language.as_deref().unwrap_or("en")
    }

    /// Start date of the current streak (`YYYY-MM-DD`), if any.
    pub fn streak_start_date(&self) -> Option<&str> {
        self.streak_data
            .as_ref()?
            .current_streak
            .as_ref()?
            .start_date
            .as_deref()
    }
}

/// Streak metadata block of the user document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StreakData {
    pub current_streak: Option<CurrentStreak>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentStreak {
    pub start_date: Option<String>,
}

/// The nested curriculum projection requested alongside the user document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentCourse {
    pub path_sectioned: Option<Vec<PathSection>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathSection {
    pub units: Vec<PathUnit>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathUnit {
    pub levels: Vec<PathLevel>,
}

/// One level of the learning path. Skill ids show up under either of two
/// metadata blocks depending on course generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathLevel {
    pub path_level_metadata: Option<SkillRef>,
    pub path_level_client_data: Option<SkillRef>,
}

impl PathLevel {
    /// Skill id of this level, preferring `pathLevelMetadata` when both
    /// blocks carry one. Empty strings count as absent.
    fn skill_id(&self) -> Option<&str> {
        fn from(r: Option<&SkillRef>) -> Option<&str> {
            r.and_then(|r| r.skill_id.as_deref())
                .filter(|s| !s.is_empty())
        }
        from(self.path_level_metadata.as_ref()).or_else(|| from(self.path_level_client_data.as_ref()))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SkillRef {
    pub skill_id: Option<String>,
}

/// Scan the curriculum section → unit → level in document order and return
/// the first skill id encountered.
///
/// The traversal short-circuits on the first hit and is deterministic for a
/// given tree; it never ranks candidates. Returns `None` when the course or
/// its sectioned path is absent, or when no level exposes an id.
pub fn find_skill_id(course: Option<&CurrentCourse>) -> Option<&str> {
    course?
        .path_sectioned
        .as_ref()?
        .iter()
        .flat_map(|section| &section.units)
        .flat_map(|unit| &unit.levels)
        .find_map(PathLevel::skill_id)
}

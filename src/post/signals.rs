use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::identifiers::{normalize_tag, normalize_tags, CreatorId, PostId, UserId};

/// Score given to a tag the user picked explicitly during onboarding.
pub const INTEREST_SEED_SCORE: f64 = 100.0;

/// Engagement boost applied by the store when a creator buys a badge.
pub const CREATOR_BADGE_BOOST: f64 = 25.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagPreference {
    pub user_id: UserId,
    pub tag: String,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorPreference {
    pub user_id: UserId,
    pub creator_id: CreatorId,
    pub score: f64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenRecord {
    pub user_id: UserId,
    pub post_id: PostId,
    pub seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Like,
    Comment,
    Tip,
    ProfileCheck,
}

impl InteractionType {
    /// Weight added to the viewer's tag and creator preferences.
    pub fn preference_weight(&self) -> f64 {
        match self {
            InteractionType::Like => 10.0,
            InteractionType::Comment => 20.0,
            InteractionType::Tip => 40.0,
            InteractionType::ProfileCheck => 5.0,
        }
    }

    /// Boost the store applies to the post's engagement score.
    pub fn creator_boost(&self) -> f64 {
        match self {
            InteractionType::Like => 5.0,
            InteractionType::Comment => 10.0,
            InteractionType::Tip => 15.0,
            InteractionType::ProfileCheck => 3.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionType::Like => "like",
            InteractionType::Comment => "comment",
            InteractionType::Tip => "tip",
            InteractionType::ProfileCheck => "profile_check",
        }
    }
}

/// Append-only interaction log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEvent {
    pub user_id: UserId,
    pub post_id: PostId,
    pub creator_id: CreatorId,
    pub kind: InteractionType,
    pub created_at: DateTime<Utc>,
}

/// In-memory view of one user's signal tables for a single computation.
///
/// Tags and interests are normalized on the way in; rows whose tag is blank
/// after trimming match nothing but still count as preference rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserSignals {
    pub tag_prefs: HashMap<String, f64>,
    pub creator_prefs: HashMap<CreatorId, f64>,
    pub interests: Vec<String>,
    pub seen: HashSet<PostId>,
    /// Tag preference rows loaded, blank tags included.
    pub tag_rows: usize,
}

impl UserSignals {
    pub fn from_rows(
        tags: Vec<TagPreference>,
        creators: Vec<CreatorPreference>,
        interests: Vec<String>,
        seen: Vec<SeenRecord>,
    ) -> Self {
        let tag_rows = tags.len();
        let mut tag_prefs = HashMap::new();
        for row in tags {
            if let Some(tag) = normalize_tag(&row.tag) {
                *tag_prefs.entry(tag).or_insert(0.0) += row.score;
            }
        }

        let mut creator_prefs = HashMap::new();
        for row in creators {
            *creator_prefs.entry(row.creator_id).or_insert(0.0) += row.score;
        }

        UserSignals {
            tag_prefs,
            creator_prefs,
            interests: normalize_tags(&interests),
            seen: seen.into_iter().map(|r| r.post_id).collect(),
            tag_rows,
        }
    }

    /// Any tag preference row at all, even one whose tag is blank.
    pub fn has_preferences(&self) -> bool {
        self.tag_rows > 0 || !self.tag_prefs.is_empty()
    }

    pub fn has_interests(&self) -> bool {
        !self.interests.is_empty()
    }
}

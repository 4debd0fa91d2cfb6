use serde::{Deserialize, Serialize};

use crate::store::StoreError;
use crate::types::identifiers::{CreatorId, FeedVersion, PostId};

/// Which regime produced a page.
///
/// The presentation layer uses this to decide on labels such as
/// "based on what you like".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedSource {
    Personalized,
    Interests,
    Trending,
}

impl FeedSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedSource::Personalized => "personalized",
            FeedSource::Interests => "interests",
            FeedSource::Trending => "trending",
        }
    }
}

/// Explanation for why a post received its score.
///
/// Every field is the weighted contribution of one term, so the final
/// score is their sum.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub matched_tags: Vec<String>,
    pub tag_relevance: f64,
    pub related_bonus: f64,
    pub creator_affinity: f64,
    pub engagement: f64,
    pub viral: f64,
    pub freshness: f64,
    pub quality: f64,
    pub badge_bonus: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.tag_relevance
            + self.related_bonus
            + self.creator_affinity
            + self.engagement
            + self.viral
            + self.freshness
            + self.quality
            + self.badge_bonus
    }
}

/// A ranked post in the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPost {
    pub post_id: PostId,
    pub creator_id: Option<CreatorId>,
    pub score: f64,
    pub why: ScoreBreakdown,
}

/// One page of feed output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedPage {
    pub source: FeedSource,
    pub posts: Vec<ScoredPost>,
    pub version: FeedVersion,
}

impl FeedPage {
    pub fn new(source: FeedSource, posts: Vec<ScoredPost>) -> Self {
        let version = FeedVersion::from_post_ids(posts.iter().map(|p| &p.post_id));
        Self {
            source,
            posts,
            version,
        }
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("Candidate pool unavailable: {0}")]
    CandidatePool(#[source] StoreError),
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::identifiers::{normalize_tags, CreatorId, PostId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

/// A candidate post as supplied by the pool loader.
///
/// Counters are read-only snapshots; nothing in the ranking path mutates a
/// post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    #[serde(default)]
    pub media: MediaKind,
    #[serde(default)]
    pub creator_id: Option<CreatorId>,
    #[serde(default, deserialize_with = "tags_or_empty")]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub engagement_score: f64,
    #[serde(default)]
    pub viral_score: f64,
    #[serde(default)]
    pub quality_score: f64,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub creator_has_badge: bool,
}

impl Post {
    pub fn new(id: impl Into<PostId>, created_at: DateTime<Utc>) -> Self {
        Post {
            id: id.into(),
            media: MediaKind::Image,
            creator_id: None,
            tags: Vec::new(),
            created_at,
            engagement_score: 0.0,
            viral_score: 0.0,
            quality_score: 0.0,
            view_count: 0,
            like_count: 0,
            creator_has_badge: false,
        }
    }

    pub fn with_creator(mut self, creator: impl Into<CreatorId>) -> Self {
        self.creator_id = Some(creator.into());
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Tags trimmed, lowercased and de-duplicated, in first-seen order.
    pub fn normalized_tags(&self) -> Vec<String> {
        normalize_tags(&self.tags)
    }
}

// Missing, null or otherwise malformed tag lists become empty; non-string
// entries are dropped.
fn tags_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let tags = match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(tags)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_tags_dedupe_and_skip_blank() {
        let post = Post::new("p1", Utc::now()).with_tags([" Art", "art ", "", "Music", "  "]);
        assert_eq!(post.normalized_tags(), vec!["art".to_string(), "music".to_string()]);
    }

    #[test]
    fn malformed_tags_deserialize_as_empty() {
        let json = r#"{"id":"p1","created_at":"2024-01-01T00:00:00Z","tags":"gaming"}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert!(post.tags.is_empty());

        let json = r#"{"id":"p2","created_at":"2024-01-01T00:00:00Z","tags":null}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert!(post.tags.is_empty());

        let json = r#"{"id":"p3","created_at":"2024-01-01T00:00:00Z","tags":["art",7,"music"]}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.tags, vec!["art".to_string(), "music".to_string()]);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let json = r#"{"id":"p1","created_at":"2024-01-01T00:00:00Z"}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert_eq!(post.creator_id, None);
        assert_eq!(post.media, MediaKind::Image);
        assert!(!post.creator_has_badge);
    }
}

//! Boundary with the external signal store and candidate pool.
//!
//! Every method is scoped by user id; implementations must not let one
//! user's rows leak into another user's reads.

use async_trait::async_trait;

use crate::post::{CreatorPreference, InteractionEvent, Post, SeenRecord, TagPreference};
use crate::store::StoreError;
use crate::types::identifiers::{CreatorId, UserId};

#[async_trait]
pub trait SignalStore: Send + Sync {
    // ===== Tag preferences =====

    async fn tag_preferences(&self, user: &UserId) -> Result<Vec<TagPreference>, StoreError>;

    async fn tag_preference(&self, user: &UserId, tag: &str) -> Result<Option<f64>, StoreError>;

    /// Insert or replace the row keyed by `(user_id, tag)`.
    async fn upsert_tag_preference(&self, pref: &TagPreference) -> Result<(), StoreError>;

    // ===== Creator preferences =====

    async fn creator_preferences(
        &self,
        user: &UserId,
    ) -> Result<Vec<CreatorPreference>, StoreError>;

    async fn creator_preference(
        &self,
        user: &UserId,
        creator: &CreatorId,
    ) -> Result<Option<f64>, StoreError>;

    /// Insert or replace the row keyed by `(user_id, creator_id)`.
    async fn upsert_creator_preference(&self, pref: &CreatorPreference) -> Result<(), StoreError>;

    // ===== Seen history =====

    /// Most recent `limit` seen records, newest first.
    async fn seen_posts(&self, user: &UserId, limit: usize) -> Result<Vec<SeenRecord>, StoreError>;

    /// Upsert keyed by `(user_id, post_id)`; repeating it is not an error.
    async fn upsert_seen(&self, record: &SeenRecord) -> Result<(), StoreError>;

    // ===== Interactions and interests =====

    async fn append_interaction(&self, event: &InteractionEvent) -> Result<(), StoreError>;

    async fn interests(&self, user: &UserId) -> Result<Vec<String>, StoreError>;

    async fn save_interests(&self, user: &UserId, labels: &[String]) -> Result<(), StoreError>;
}

/// Supplies the bounded snapshot of posts a feed is ranked from.
#[async_trait]
pub trait CandidatePoolLoader: Send + Sync {
    /// At most `limit` posts, most recent first.
    async fn load_candidates(&self, limit: usize) -> Result<Vec<Post>, StoreError>;
}

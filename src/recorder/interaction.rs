//! Best-effort bookkeeping for user actions.
//!
//! Nothing here may block or fail the action that triggered it: every store
//! failure is logged and swallowed, and the three writes of a recording are
//! independent, so a partial application is left as is.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::feed::session::FeedSession;
use crate::post::{
    CreatorPreference, InteractionEvent, InteractionType, SeenRecord, TagPreference,
    INTEREST_SEED_SCORE,
};
use crate::store::SignalStore;
use crate::types::identifiers::{normalize_tags, CreatorId, PostId, UserId};

/// What a recording actually managed to persist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordOutcome {
    pub tags_updated: usize,
    pub creator_updated: bool,
    pub event_logged: bool,
}

pub struct InteractionRecorder<S> {
    store: Arc<S>,
}

impl<S> Clone for InteractionRecorder<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: SignalStore> InteractionRecorder<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Turn one user action into preference weight and an interaction event.
    pub async fn record(
        &self,
        user: &UserId,
        post: &PostId,
        creator: &CreatorId,
        tags: &[String],
        kind: InteractionType,
    ) -> RecordOutcome {
        let weight = kind.preference_weight();
        let now = Utc::now();
        let tags = normalize_tags(tags);

        let event = InteractionEvent {
            user_id: user.clone(),
            post_id: post.clone(),
            creator_id: creator.clone(),
            kind,
            created_at: now,
        };

        let (tags_updated, creator_updated, event_result) = tokio::join!(
            self.accumulate_tags(user, &tags, weight, now),
            self.accumulate_creator(user, creator, weight, now),
            self.store.append_interaction(&event),
        );

        let event_logged = match event_result {
            Ok(()) => true,
            Err(e) => {
                warn!(user = %user, post = %post, kind = kind.as_str(), error = %e, "interaction event not recorded");
                false
            }
        };

        debug!(
            user = %user,
            post = %post,
            kind = kind.as_str(),
            tags_updated,
            creator_updated,
            event_logged,
            "interaction recorded"
        );

        RecordOutcome {
            tags_updated,
            creator_updated,
            event_logged,
        }
    }

    /// Persist a seen marker unless this session already holds one.
    ///
    /// Returns whether a write was issued and succeeded. Anonymous sessions
    /// never write.
    pub async fn mark_seen(&self, session: &mut FeedSession, post: &PostId) -> bool {
        let Some(user) = session.user_id().cloned() else {
            return false;
        };
        if session.is_seen(post) {
            return false;
        }

        let record = SeenRecord {
            user_id: user.clone(),
            post_id: post.clone(),
            seen_at: Utc::now(),
        };
        match self.store.upsert_seen(&record).await {
            Ok(()) => {
                session.remember_seen(post.clone());
                true
            }
            Err(e) => {
                warn!(user = %user, post = %post, error = %e, "seen marker not recorded");
                false
            }
        }
    }

    /// Store onboarding interests and seed a strong preference for each.
    ///
    /// An existing preference above the seed value is left untouched, so
    /// seeding never lowers a score. Returns the number of tags seeded.
    pub async fn seed_interests(&self, user: &UserId, labels: &[String]) -> usize {
        let labels = normalize_tags(labels);

        if let Err(e) = self.store.save_interests(user, &labels).await {
            warn!(user = %user, error = %e, "interest selection not saved");
        }

        let now = Utc::now();
        let mut seeded = 0;
        for tag in &labels {
            let current = match self.store.tag_preference(user, tag).await {
                Ok(score) => score.unwrap_or(0.0),
                Err(e) => {
                    warn!(user = %user, tag = %tag, error = %e, "interest seed skipped");
                    continue;
                }
            };
            if current >= INTEREST_SEED_SCORE {
                continue;
            }
            let pref = TagPreference {
                user_id: user.clone(),
                tag: tag.clone(),
                score: INTEREST_SEED_SCORE,
                updated_at: now,
            };
            match self.store.upsert_tag_preference(&pref).await {
                Ok(()) => seeded += 1,
                Err(e) => warn!(user = %user, tag = %tag, error = %e, "interest seed not saved"),
            }
        }
        seeded
    }

    async fn accumulate_tags(
        &self,
        user: &UserId,
        tags: &[String],
        weight: f64,
        now: DateTime<Utc>,
    ) -> usize {
        let mut updated = 0;
        for tag in tags {
            let current = match self.store.tag_preference(user, tag).await {
                Ok(score) => score.unwrap_or(0.0),
                Err(e) => {
                    warn!(user = %user, tag = %tag, error = %e, "tag preference read failed");
                    continue;
                }
            };
            let pref = TagPreference {
                user_id: user.clone(),
                tag: tag.clone(),
                score: current + weight,
                updated_at: now,
            };
            match self.store.upsert_tag_preference(&pref).await {
                Ok(()) => updated += 1,
                Err(e) => warn!(user = %user, tag = %tag, error = %e, "tag preference update failed"),
            }
        }
        updated
    }

    async fn accumulate_creator(
        &self,
        user: &UserId,
        creator: &CreatorId,
        weight: f64,
        now: DateTime<Utc>,
    ) -> bool {
        let current = match self.store.creator_preference(user, creator).await {
            Ok(score) => score.unwrap_or(0.0),
            Err(e) => {
                warn!(user = %user, creator = %creator, error = %e, "creator preference read failed");
                return false;
            }
        };
        let pref = CreatorPreference {
            user_id: user.clone(),
            creator_id: creator.clone(),
            score: current + weight,
            updated_at: now,
        };
        match self.store.upsert_creator_preference(&pref).await {
            Ok(()) => true,
            Err(e) => {
                warn!(user = %user, creator = %creator, error = %e, "creator preference update failed");
                false
            }
        }
    }
}

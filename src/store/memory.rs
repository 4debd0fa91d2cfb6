use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::post::{CreatorPreference, InteractionEvent, Post, SeenRecord, TagPreference};
use crate::store::snapshot::most_recent;
use crate::store::traits::{CandidatePoolLoader, SignalStore};
use crate::store::StoreError;
use crate::types::identifiers::{CreatorId, PostId, UserId};

/// Process-local signal store.
///
/// Used by tests and by hosts that keep signals in memory. Every table is
/// keyed by user id first, so reads never cross users. Availability can be
/// switched off to exercise the degraded paths.
#[derive(Debug)]
pub struct InMemorySignalStore {
    tag_prefs: DashMap<(UserId, String), TagPreference>,
    creator_prefs: DashMap<(UserId, CreatorId), CreatorPreference>,
    seen: DashMap<(UserId, PostId), SeenRecord>,
    interactions: DashMap<UserId, Vec<InteractionEvent>>,
    interests: DashMap<UserId, Vec<String>>,
    available: AtomicBool,
}

impl Default for InMemorySignalStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySignalStore {
    pub fn new() -> Self {
        Self {
            tag_prefs: DashMap::new(),
            creator_prefs: DashMap::new(),
            seen: DashMap::new(),
            interactions: DashMap::new(),
            interests: DashMap::new(),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of seen rows held for `user`.
    pub fn seen_count(&self, user: &UserId) -> usize {
        self.seen.iter().filter(|e| &e.key().0 == user).count()
    }

    pub fn interactions_for(&self, user: &UserId) -> Vec<InteractionEvent> {
        self.interactions
            .get(user)
            .map(|events| events.value().clone())
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store switched off".into()))
        }
    }
}

#[async_trait]
impl SignalStore for InMemorySignalStore {
    async fn tag_preferences(&self, user: &UserId) -> Result<Vec<TagPreference>, StoreError> {
        self.check()?;
        let mut rows: Vec<TagPreference> = self
            .tag_prefs
            .iter()
            .filter(|e| &e.key().0 == user)
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by(|a, b| a.tag.cmp(&b.tag));
        Ok(rows)
    }

    async fn tag_preference(&self, user: &UserId, tag: &str) -> Result<Option<f64>, StoreError> {
        self.check()?;
        Ok(self
            .tag_prefs
            .get(&(user.clone(), tag.to_string()))
            .map(|row| row.score))
    }

    async fn upsert_tag_preference(&self, pref: &TagPreference) -> Result<(), StoreError> {
        self.check()?;
        self.tag_prefs
            .insert((pref.user_id.clone(), pref.tag.clone()), pref.clone());
        Ok(())
    }

    async fn creator_preferences(
        &self,
        user: &UserId,
    ) -> Result<Vec<CreatorPreference>, StoreError> {
        self.check()?;
        let mut rows: Vec<CreatorPreference> = self
            .creator_prefs
            .iter()
            .filter(|e| &e.key().0 == user)
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by(|a, b| a.creator_id.cmp(&b.creator_id));
        Ok(rows)
    }

    async fn creator_preference(
        &self,
        user: &UserId,
        creator: &CreatorId,
    ) -> Result<Option<f64>, StoreError> {
        self.check()?;
        Ok(self
            .creator_prefs
            .get(&(user.clone(), creator.clone()))
            .map(|row| row.score))
    }

    async fn upsert_creator_preference(&self, pref: &CreatorPreference) -> Result<(), StoreError> {
        self.check()?;
        self.creator_prefs
            .insert((pref.user_id.clone(), pref.creator_id.clone()), pref.clone());
        Ok(())
    }

    async fn seen_posts(&self, user: &UserId, limit: usize) -> Result<Vec<SeenRecord>, StoreError> {
        self.check()?;
        let mut rows: Vec<SeenRecord> = self
            .seen
            .iter()
            .filter(|e| &e.key().0 == user)
            .map(|e| e.value().clone())
            .collect();
        rows.sort_by(|a, b| b.seen_at.cmp(&a.seen_at).then_with(|| a.post_id.cmp(&b.post_id)));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn upsert_seen(&self, record: &SeenRecord) -> Result<(), StoreError> {
        self.check()?;
        self.seen
            .insert((record.user_id.clone(), record.post_id.clone()), record.clone());
        Ok(())
    }

    async fn append_interaction(&self, event: &InteractionEvent) -> Result<(), StoreError> {
        self.check()?;
        self.interactions
            .entry(event.user_id.clone())
            .or_default()
            .push(event.clone());
        Ok(())
    }

    async fn interests(&self, user: &UserId) -> Result<Vec<String>, StoreError> {
        self.check()?;
        Ok(self
            .interests
            .get(user)
            .map(|labels| labels.value().clone())
            .unwrap_or_default())
    }

    async fn save_interests(&self, user: &UserId, labels: &[String]) -> Result<(), StoreError> {
        self.check()?;
        self.interests.insert(user.clone(), labels.to_vec());
        Ok(())
    }
}

/// Candidate pool held in memory.
///
/// `replace` swaps the whole snapshot, which is how a realtime "new post"
/// notification is modelled.
#[derive(Debug)]
pub struct InMemoryPool {
    posts: RwLock<Vec<Post>>,
    available: AtomicBool,
}

impl InMemoryPool {
    pub fn new(posts: Vec<Post>) -> Self {
        Self {
            posts: RwLock::new(posts),
            available: AtomicBool::new(true),
        }
    }

    pub fn replace(&self, posts: Vec<Post>) -> Result<(), StoreError> {
        let mut guard = self
            .posts
            .write()
            .map_err(|_| StoreError::Unavailable("candidate pool lock poisoned".into()))?;
        *guard = posts;
        Ok(())
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

#[async_trait]
impl CandidatePoolLoader for InMemoryPool {
    async fn load_candidates(&self, limit: usize) -> Result<Vec<Post>, StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("candidate pool switched off".into()));
        }
        let posts = self
            .posts
            .read()
            .map_err(|_| StoreError::Unavailable("candidate pool lock poisoned".into()))?
            .clone();
        Ok(most_recent(posts, limit))
    }
}

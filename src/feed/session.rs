use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::types::identifiers::{PostId, UserId};

/// Per-viewer state for one browsing session.
///
/// The seen set is a write-avoidance cache only; the store's seen records
/// remain the source of truth for the next session. `started_at` anchors
/// freshness so every page of a session is scored against the same clock.
#[derive(Debug, Clone)]
pub struct FeedSession {
    user_id: Option<UserId>,
    started_at: DateTime<Utc>,
    seen: HashSet<PostId>,
    served: Vec<PostId>,
    served_set: HashSet<PostId>,
    excluded: HashSet<PostId>,
    next_offset: usize,
}

impl FeedSession {
    pub fn new(user_id: Option<UserId>) -> Self {
        Self::starting_at(user_id, Utc::now())
    }

    pub fn anonymous() -> Self {
        Self::new(None)
    }

    pub fn for_user(user_id: impl Into<UserId>) -> Self {
        Self::new(Some(user_id.into()))
    }

    /// Session with an explicit clock anchor.
    pub fn starting_at(user_id: Option<UserId>, started_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            started_at,
            seen: HashSet::new(),
            served: Vec::new(),
            served_set: HashSet::new(),
            excluded: HashSet::new(),
            next_offset: 0,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_seen(&self, post: &PostId) -> bool {
        self.seen.contains(post)
    }

    pub fn remember_seen(&mut self, post: PostId) -> bool {
        self.seen.insert(post)
    }

    pub fn merge_seen<I: IntoIterator<Item = PostId>>(&mut self, posts: I) {
        self.seen.extend(posts);
    }

    /// Posts of the initial page, in display order.
    pub fn served(&self) -> &[PostId] {
        &self.served
    }

    pub fn served_set(&self) -> &HashSet<PostId> {
        &self.served_set
    }

    /// Seen posts held back from the ranking pool when the first page was
    /// built. Continuation pages skip them too.
    pub fn excluded(&self) -> &HashSet<PostId> {
        &self.excluded
    }

    /// Offset the next continuation page starts at.
    pub fn next_offset(&self) -> usize {
        self.next_offset
    }

    pub(crate) fn start_page<I, E>(&mut self, posts: I, excluded: E)
    where
        I: IntoIterator<Item = PostId>,
        E: IntoIterator<Item = PostId>,
    {
        self.served.clear();
        self.served_set.clear();
        self.excluded = excluded.into_iter().collect();
        self.next_offset = 0;
        for post in posts {
            if self.served_set.insert(post.clone()) {
                self.served.push(post);
            }
        }
    }

    pub(crate) fn advance(&mut self, by: usize) {
        self.next_offset += by;
    }

    /// Drop everything cached for this session.
    pub fn clear(&mut self) {
        self.seen.clear();
        self.served.clear();
        self.served_set.clear();
        self.excluded.clear();
        self.next_offset = 0;
    }
}

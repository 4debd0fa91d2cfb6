use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, warn};

use crate::compose::{diversify, FeedComposer};
use crate::feed::continuation::continuation;
use crate::feed::session::FeedSession;
use crate::post::{Post, UserSignals};
use crate::ranking::config::RankingConfig;
use crate::ranking::regime::classify_user;
use crate::ranking::scorer::{rank_posts, score_post, sort_by_score, ScoringContext, WeightedScorer};
use crate::recorder::InteractionRecorder;
use crate::store::{CandidatePoolLoader, SignalStore, StoreError};
use crate::types::feed_page::{FeedError, FeedPage, FeedSource, ScoredPost};
use crate::types::identifiers::{PostId, UserId};

/// Computes feed pages for one viewer at a time.
///
/// The engine holds no per-user state; everything user-scoped lives in the
/// [`FeedSession`] passed to each call.
pub struct FeedEngine<S, L> {
    store: Arc<S>,
    loader: Arc<L>,
    config: RankingConfig,
    scorer: WeightedScorer,
    composer: FeedComposer,
}

impl<S, L> FeedEngine<S, L>
where
    S: SignalStore,
    L: CandidatePoolLoader,
{
    pub fn new(store: Arc<S>, loader: Arc<L>, config: RankingConfig) -> Self {
        let scorer = WeightedScorer::new(config.weights.clone());
        let composer = FeedComposer::from_config(&config);
        Self {
            store,
            loader,
            config,
            scorer,
            composer,
        }
    }

    /// A recorder writing to the same store this engine reads from.
    pub fn recorder(&self) -> InteractionRecorder<S> {
        InteractionRecorder::new(Arc::clone(&self.store))
    }

    /// Read every signal table for `user` concurrently.
    ///
    /// A table that fails to load is treated as empty, so a store outage
    /// degrades the viewer to the trending regime instead of failing the feed.
    pub async fn load_signals(&self, user: &UserId) -> UserSignals {
        let (tags, creators, seen, interests) = tokio::join!(
            self.store.tag_preferences(user),
            self.store.creator_preferences(user),
            self.store.seen_posts(user, self.config.seen_lookback),
            self.store.interests(user),
        );

        UserSignals::from_rows(
            or_empty(tags, user, "tag preferences"),
            or_empty(creators, user, "creator preferences"),
            or_empty(interests, user, "interests"),
            or_empty(seen, user, "seen history"),
        )
    }

    /// First page of the feed, starting from offset 0.
    pub async fn feed(
        &self,
        session: &mut FeedSession,
        limit: usize,
    ) -> Result<FeedPage, FeedError> {
        let (pool, signals) = self.gather(session).await?;
        let mut rng = rand::rng();
        Ok(self.first_page(session, &pool, signals.as_ref(), limit, &mut rng))
    }

    pub async fn feed_with_rng<R>(
        &self,
        session: &mut FeedSession,
        limit: usize,
        rng: &mut R,
    ) -> Result<FeedPage, FeedError>
    where
        R: Rng + Send,
    {
        let (pool, signals) = self.gather(session).await?;
        Ok(self.first_page(session, &pool, signals.as_ref(), limit, rng))
    }

    /// Recompute from offset 0 after the candidate pool changed.
    ///
    /// Scroll position is not preserved; continuation offsets restart.
    pub async fn refresh(
        &self,
        session: &mut FeedSession,
        limit: usize,
    ) -> Result<FeedPage, FeedError> {
        debug!(served = session.served().len(), "candidate pool changed, recomputing feed");
        self.feed(session, limit).await
    }

    /// Continuation page over an explicit pool.
    ///
    /// Preferences are re-read so interactions since the first page count.
    pub async fn more(
        &self,
        session: &FeedSession,
        pool: &[Post],
        offset: usize,
        page_size: usize,
    ) -> FeedPage {
        let signals = match session.user_id() {
            Some(user) => Some(self.load_signals(user).await),
            None => None,
        };
        let source = classify_user(signals.as_ref());
        let signals = signals.unwrap_or_default();

        // Offsets stay stable while the viewer marks posts seen mid-scroll:
        // only posts excluded from the first page are skipped.
        let hidden: HashSet<PostId> = session
            .served_set()
            .union(session.excluded())
            .cloned()
            .collect();
        let posts = continuation(
            &self.scorer,
            &signals,
            &hidden,
            pool,
            offset,
            page_size,
            &self.config,
            session.started_at(),
        );
        debug!(offset, page_size, returned = posts.len(), "continuation page");
        FeedPage::new(source, posts)
    }

    /// Continuation page at the session's running offset, reloading the pool.
    pub async fn next_page(
        &self,
        session: &mut FeedSession,
        page_size: usize,
    ) -> Result<FeedPage, FeedError> {
        let pool = self.load_pool().await?;
        let offset = session.next_offset();
        let page = self.more(session, &pool, offset, page_size).await;
        session.advance(page.len());
        Ok(page)
    }

    async fn gather(
        &self,
        session: &FeedSession,
    ) -> Result<(Vec<Post>, Option<UserSignals>), FeedError> {
        match session.user_id() {
            Some(user) => {
                let (pool, signals) = tokio::join!(self.load_pool(), self.load_signals(user));
                Ok((pool?, Some(signals)))
            }
            None => Ok((self.load_pool().await?, None)),
        }
    }

    async fn load_pool(&self) -> Result<Vec<Post>, FeedError> {
        let posts = self
            .loader
            .load_candidates(self.config.candidate_pool_limit)
            .await
            .map_err(|e| {
                warn!(error = %e, "candidate pool load failed");
                FeedError::CandidatePool(e)
            })?;
        Ok(dedupe_by_id(posts))
    }

    fn first_page<R>(
        &self,
        session: &mut FeedSession,
        pool: &[Post],
        signals: Option<&UserSignals>,
        limit: usize,
        rng: &mut R,
    ) -> FeedPage
    where
        R: Rng + ?Sized,
    {
        if let Some(s) = signals {
            session.merge_seen(s.seen.iter().cloned());
        }

        let (mut candidates, mut excluded): (Vec<&Post>, Vec<&Post>) =
            pool.iter().partition(|p| !session.is_seen(&p.id));
        if candidates.is_empty() && !pool.is_empty() {
            debug!(pool = pool.len(), "every candidate already seen, using full pool");
            candidates = pool.iter().collect();
            excluded.clear();
        }
        let excluded: Vec<PostId> = excluded.into_iter().map(|p| p.id.clone()).collect();

        let source = classify_user(signals);
        let empty = UserSignals::default();
        let signals = signals.unwrap_or(&empty);
        let now = session.started_at();

        let posts = match source {
            FeedSource::Personalized => self.personalized(&candidates, signals, limit, now, rng),
            FeedSource::Interests => self.interests(&candidates, signals, limit, now, rng),
            FeedSource::Trending => self.trending(&candidates, limit, now),
        };

        debug!(
            source = source.as_str(),
            candidates = candidates.len(),
            returned = posts.len(),
            "feed page composed"
        );

        session.start_page(posts.iter().map(|p| p.post_id.clone()), excluded);
        FeedPage::new(source, posts)
    }

    // Matching: any preferred tag or a preferred creator. Discovery: the rest.
    fn personalized<R>(
        &self,
        candidates: &[&Post],
        signals: &UserSignals,
        limit: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<ScoredPost>
    where
        R: Rng + ?Sized,
    {
        let ctx = ScoringContext::new(signals, self.config.top_tag_count, now);
        let mut matching = Vec::new();
        let mut discovery = Vec::new();

        for post in candidates {
            let scored = score_post(&self.scorer, post, &ctx);
            let prefers_creator = post
                .creator_id
                .as_ref()
                .is_some_and(|c| signals.creator_prefs.contains_key(c));
            if !scored.why.matched_tags.is_empty() || prefers_creator {
                matching.push(scored);
            } else {
                discovery.push(scored);
            }
        }

        self.composer.compose(matching, discovery, limit, rng).posts
    }

    // No preference signal yet: interest matches and their category
    // neighbours are shuffled rather than ranked. Short pages are topped up
    // from the trending ranking of everything else.
    fn interests<R>(
        &self,
        candidates: &[&Post],
        signals: &UserSignals,
        limit: usize,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<ScoredPost>
    where
        R: Rng + ?Sized,
    {
        let ctx = ScoringContext::from_interests(signals, now);
        let mut matching = Vec::new();
        let mut related = Vec::new();
        let mut rest = Vec::new();

        for post in candidates {
            let tags = post.normalized_tags();
            let scored = score_post(&self.scorer, post, &ctx);
            if tags.iter().any(|t| signals.interests.contains(t)) {
                matching.push(scored);
            } else if tags.iter().any(|t| ctx.related_tags.contains(t)) {
                related.push(scored);
            } else {
                rest.push(scored);
            }
        }

        let mut posts = self.composer.compose_shuffled(matching, related, limit, rng).posts;
        if posts.len() < limit && !rest.is_empty() {
            sort_by_score(&mut rest);
            let missing = limit - posts.len();
            posts.extend(rest.into_iter().take(missing));
            posts = diversify(posts, self.config.max_same_creator_in_feed, limit).posts;
        }
        posts
    }

    // Ranked as for an anonymous viewer.
    fn trending(&self, candidates: &[&Post], limit: usize, now: DateTime<Utc>) -> Vec<ScoredPost> {
        let anonymous = UserSignals::default();
        let ctx = ScoringContext::new(&anonymous, self.config.top_tag_count, now);
        let ranked = rank_posts(&self.scorer, candidates.iter().copied(), &ctx);
        diversify(ranked, self.config.max_same_creator_in_feed, limit).posts
    }
}

fn or_empty<T>(result: Result<Vec<T>, StoreError>, user: &UserId, what: &str) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(user = %user, error = %e, "{} unavailable, treating as empty", what);
        Vec::new()
    })
}

fn dedupe_by_id(posts: Vec<Post>) -> Vec<Post> {
    let mut ids = HashSet::with_capacity(posts.len());
    posts
        .into_iter()
        .filter(|p| ids.insert(p.id.clone()))
        .collect()
}

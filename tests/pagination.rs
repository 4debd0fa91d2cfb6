use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use feed_core::feed::{continuation, FeedEngine, FeedSession};
use feed_core::post::{Post, PostId, SeenRecord, TagPreference, UserId, UserSignals};
use feed_core::ranking::{RankingConfig, WeightedScorer};
use feed_core::store::{InMemoryPool, InMemorySignalStore, SignalStore};
use feed_core::types::{FeedSource, ScoredPost};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn make_post(i: i64, creator: &str, tag: &str) -> Post {
    Post::new(format!("p{i}"), now() - Duration::hours(i))
        .with_creator(creator)
        .with_tags([tag])
}

fn pool(count: i64) -> Vec<Post> {
    (0..count)
        .map(|i| make_post(i, &format!("c{i}"), "gaming"))
        .collect()
}

fn served(ids: &[&str]) -> HashSet<PostId> {
    ids.iter().map(|id| PostId::from(*id)).collect()
}

fn ids(posts: &[ScoredPost]) -> Vec<&str> {
    posts.iter().map(|p| p.post_id.as_str()).collect()
}

#[test]
fn continuation_walks_the_remaining_pool() {
    let scorer = WeightedScorer::default();
    let signals = UserSignals::default();
    let config = RankingConfig::default();
    let pool = pool(10);
    let served = served(&["p0", "p1"]);

    let page = |offset| continuation(&scorer, &signals, &served, &pool, offset, 3, &config, now());

    let first = page(0);
    let second = page(3);
    let third = page(6);
    let past_end = page(9);

    assert_eq!(ids(&first), vec!["p2", "p3", "p4"]);
    assert_eq!(ids(&second), vec!["p5", "p6", "p7"]);
    assert_eq!(ids(&third), vec!["p8", "p9"]);
    assert!(past_end.is_empty());
}

#[test]
fn invariant_continuation_never_repeats_served_posts() {
    let scorer = WeightedScorer::default();
    let signals = UserSignals::default();
    let config = RankingConfig::default();
    let pool = pool(25);
    let served = served(&["p0", "p3", "p7", "p11"]);

    let mut all = Vec::new();
    let mut offset = 0;
    loop {
        let page = continuation(&scorer, &signals, &served, &pool, offset, 4, &config, now());
        if page.is_empty() {
            break;
        }
        offset += page.len();
        all.extend(page.into_iter().map(|p| p.post_id));
    }

    let unique: HashSet<&PostId> = all.iter().collect();
    assert_eq!(unique.len(), all.len());
    assert_eq!(all.len(), 21);
    assert!(all.iter().all(|id| !served.contains(id)));
}

#[test]
fn continuation_creator_cap_is_opt_in() {
    let scorer = WeightedScorer::default();
    let signals = UserSignals::default();
    let pool: Vec<Post> = (0..6)
        .map(|i| make_post(i, if i < 4 { "A" } else { "B" }, "gaming"))
        .collect();
    let served = HashSet::new();

    let plain = RankingConfig::default();
    let page = continuation(&scorer, &signals, &served, &pool, 0, 4, &plain, now());
    assert_eq!(ids(&page), vec!["p0", "p1", "p2", "p3"]);

    let capped = RankingConfig {
        diversify_continuation: true,
        ..RankingConfig::default()
    };
    let page = continuation(&scorer, &signals, &served, &pool, 0, 4, &capped, now());
    assert_eq!(ids(&page), vec!["p0", "p1", "p2", "p4"]);
}

#[test]
fn continuation_reflects_current_preferences() {
    let scorer = WeightedScorer::default();
    let config = RankingConfig::default();
    let mut pool = pool(3);
    pool.push(make_post(9, "c9", "cooking"));

    let mut signals = UserSignals::default();
    signals.tag_prefs.insert("cooking".to_string(), 50.0);

    let page = continuation(&scorer, &signals, &HashSet::new(), &pool, 0, 1, &config, now());
    assert_eq!(ids(&page), vec!["p9"]);
}

#[tokio::test]
async fn next_page_continues_after_the_first_page() {
    let store = Arc::new(InMemorySignalStore::new());
    let engine = FeedEngine::new(store, Arc::new(InMemoryPool::new(pool(10))), RankingConfig::default());
    let mut session = FeedSession::starting_at(None, now());

    let first = engine.feed(&mut session, 3).await.unwrap();
    assert_eq!(ids(&first.posts), vec!["p0", "p1", "p2"]);

    let mut seen: Vec<&str> = ids(&first.posts);
    let mut pages = Vec::new();
    loop {
        let page = engine.next_page(&mut session, 3).await.unwrap();
        if page.is_empty() {
            break;
        }
        assert_eq!(page.source, FeedSource::Trending);
        pages.push(page);
    }
    for page in &pages {
        seen.extend(ids(&page.posts));
    }

    let unique: HashSet<&str> = seen.iter().copied().collect();
    assert_eq!(unique.len(), 10);
    assert_eq!(seen.len(), 10);
    assert_eq!(session.next_offset(), 7);
}

#[tokio::test]
async fn more_rereads_preferences() {
    let store = Arc::new(InMemorySignalStore::new());
    let mut pool = pool(4);
    pool.push(make_post(9, "c9", "cooking"));
    let engine = FeedEngine::new(
        Arc::clone(&store),
        Arc::new(InMemoryPool::new(pool.clone())),
        RankingConfig::default(),
    );
    let mut session = FeedSession::starting_at(Some(UserId::from("u1")), now());

    let first = engine.feed(&mut session, 2).await.unwrap();
    assert_eq!(first.source, FeedSource::Trending);

    store
        .upsert_tag_preference(&TagPreference {
            user_id: UserId::from("u1"),
            tag: "cooking".into(),
            score: 50.0,
            updated_at: now(),
        })
        .await
        .unwrap();

    let more = engine.more(&session, &pool, 0, 1).await;
    assert_eq!(more.source, FeedSource::Personalized);
    assert_eq!(ids(&more.posts), vec!["p9"]);
}

async fn see(store: &InMemorySignalStore, user: &str, post: &str) {
    store
        .upsert_seen(&SeenRecord {
            user_id: UserId::from(user),
            post_id: PostId::from(post),
            seen_at: now(),
        })
        .await
        .unwrap();
}

async fn prefer(store: &InMemorySignalStore, user: &str, tag: &str) {
    store
        .upsert_tag_preference(&TagPreference {
            user_id: UserId::from(user),
            tag: tag.to_string(),
            score: 80.0,
            updated_at: now(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn previously_seen_post_stays_out_of_continuation() {
    let store = Arc::new(InMemorySignalStore::new());
    prefer(&store, "u1", "gaming").await;
    see(&store, "u1", "p0").await;
    let engine = FeedEngine::new(
        Arc::clone(&store),
        Arc::new(InMemoryPool::new(pool(6))),
        RankingConfig::default(),
    );
    let mut session = FeedSession::starting_at(Some(UserId::from("u1")), now());

    let first = engine.feed(&mut session, 2).await.unwrap();
    assert_eq!(ids(&first.posts), vec!["p1", "p2"]);

    let next = engine.next_page(&mut session, 10).await.unwrap();
    assert_eq!(ids(&next.posts), vec!["p3", "p4", "p5"]);
}

#[tokio::test]
async fn marking_seen_mid_scroll_keeps_offsets_stable() {
    let store = Arc::new(InMemorySignalStore::new());
    let engine = FeedEngine::new(
        Arc::clone(&store),
        Arc::new(InMemoryPool::new(pool(6))),
        RankingConfig::default(),
    );
    let recorder = engine.recorder();
    let mut session = FeedSession::starting_at(Some(UserId::from("u1")), now());

    let first = engine.feed(&mut session, 2).await.unwrap();
    assert_eq!(ids(&first.posts), vec!["p0", "p1"]);

    let second = engine.next_page(&mut session, 2).await.unwrap();
    assert_eq!(ids(&second.posts), vec!["p2", "p3"]);
    for post in ["p2", "p3"] {
        recorder.mark_seen(&mut session, &PostId::from(post)).await;
    }

    let third = engine.next_page(&mut session, 2).await.unwrap();
    assert_eq!(ids(&third.posts), vec!["p4", "p5"]);
}

#[tokio::test]
async fn fully_seen_pool_still_paginates() {
    let store = Arc::new(InMemorySignalStore::new());
    for i in 0..4 {
        see(&store, "u1", &format!("p{i}")).await;
    }
    let engine = FeedEngine::new(
        Arc::clone(&store),
        Arc::new(InMemoryPool::new(pool(4))),
        RankingConfig::default(),
    );
    let mut session = FeedSession::starting_at(Some(UserId::from("u1")), now());

    let first = engine.feed(&mut session, 2).await.unwrap();
    assert_eq!(ids(&first.posts), vec!["p0", "p1"]);
    assert!(session.excluded().is_empty());

    let next = engine.next_page(&mut session, 10).await.unwrap();
    assert_eq!(ids(&next.posts), vec!["p2", "p3"]);
}

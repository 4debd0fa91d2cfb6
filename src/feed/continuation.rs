use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::compose::diversify;
use crate::post::{Post, UserSignals};
use crate::ranking::config::RankingConfig;
use crate::ranking::scorer::{rank_posts, Scorer, ScoringContext};
use crate::types::feed_page::ScoredPost;
use crate::types::identifiers::PostId;

/// The `[offset, offset + page_size)` slice of the pool left after the
/// served posts, ranked with the same scorer as the initial page.
///
/// Top and related tags are re-derived from `signals`, so preferences
/// updated since the first page are reflected. The creator cap is applied
/// only when `config.diversify_continuation` is set.
#[allow(clippy::too_many_arguments)]
pub fn continuation<S: Scorer>(
    scorer: &S,
    signals: &UserSignals,
    served: &HashSet<PostId>,
    pool: &[Post],
    offset: usize,
    page_size: usize,
    config: &RankingConfig,
    now: DateTime<Utc>,
) -> Vec<ScoredPost> {
    let ctx = ScoringContext::new(signals, config.top_tag_count, now);
    let remaining = pool.iter().filter(|post| !served.contains(&post.id));
    let mut ranked = rank_posts(scorer, remaining, &ctx);

    if config.diversify_continuation {
        let len = ranked.len();
        ranked = diversify(ranked, config.max_same_creator_in_feed, len).posts;
    }

    ranked.into_iter().skip(offset).take(page_size).collect()
}

pub mod diversify;
pub mod interleave;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::ranking::config::{InterleavePattern, RankingConfig};
use crate::ranking::scorer::sort_by_score;
use crate::types::feed_page::ScoredPost;
pub use diversify::{diversify, DiversifyResult};
pub use interleave::interleave;

/// Merges a personalized stream with a discovery stream.
#[derive(Debug, Clone)]
pub struct FeedComposer {
    pattern: InterleavePattern,
    max_same_creator: usize,
}

impl Default for FeedComposer {
    fn default() -> Self {
        Self::from_config(&RankingConfig::default())
    }
}

impl FeedComposer {
    pub fn new(pattern: InterleavePattern, max_same_creator: usize) -> Self {
        Self {
            pattern,
            max_same_creator,
        }
    }

    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(config.interleave.clone(), config.max_same_creator_in_feed)
    }

    /// Sort both streams by score, interleave, diversify, truncate.
    pub fn compose<R>(
        &self,
        mut matching: Vec<ScoredPost>,
        mut discovery: Vec<ScoredPost>,
        limit: usize,
        rng: &mut R,
    ) -> DiversifyResult
    where
        R: Rng + ?Sized,
    {
        sort_by_score(&mut matching);
        sort_by_score(&mut discovery);
        self.weave(matching, discovery, limit, rng)
    }

    /// Same as [`compose`](Self::compose) but both streams are shuffled
    /// instead of sorted; used when there is no preference signal to rank by.
    pub fn compose_shuffled<R>(
        &self,
        mut matching: Vec<ScoredPost>,
        mut related: Vec<ScoredPost>,
        limit: usize,
        rng: &mut R,
    ) -> DiversifyResult
    where
        R: Rng + ?Sized,
    {
        matching.shuffle(rng);
        related.shuffle(rng);
        self.weave(matching, related, limit, rng)
    }

    fn weave<R>(
        &self,
        primary: Vec<ScoredPost>,
        secondary: Vec<ScoredPost>,
        limit: usize,
        rng: &mut R,
    ) -> DiversifyResult
    where
        R: Rng + ?Sized,
    {
        let woven = interleave(primary, secondary, limit, &self.pattern, rng);
        diversify(woven, self.max_same_creator, limit)
    }
}

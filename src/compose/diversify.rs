use std::collections::HashMap;

use crate::types::feed_page::ScoredPost;
use crate::types::identifiers::CreatorId;

pub struct DiversifyResult {
    pub posts: Vec<ScoredPost>,
    /// Length of the leading segment in which every creator is capped.
    pub primary_len: usize,
    pub deferred: usize,
}

/// Cap each creator at `max_same_creator` appearances in the leading segment.
///
/// Over-cap posts are moved to the end in their original relative order, not
/// dropped. Posts without a creator are never capped. The result is cut to
/// `limit`.
pub fn diversify(posts: Vec<ScoredPost>, max_same_creator: usize, limit: usize) -> DiversifyResult {
    let mut counts: HashMap<CreatorId, usize> = HashMap::new();
    let mut kept = Vec::with_capacity(posts.len());
    let mut deferred = Vec::new();

    for post in posts {
        match &post.creator_id {
            Some(creator) => {
                let count = counts.entry(creator.clone()).or_insert(0);
                if *count < max_same_creator {
                    *count += 1;
                    kept.push(post);
                } else {
                    deferred.push(post);
                }
            }
            None => kept.push(post),
        }
    }

    let primary_len = kept.len().min(limit);
    let deferred_count = deferred.len();
    kept.extend(deferred);
    kept.truncate(limit);

    DiversifyResult {
        posts: kept,
        primary_len,
        deferred: deferred_count,
    }
}

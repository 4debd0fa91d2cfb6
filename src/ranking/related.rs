//! Related-tag expansion.
//!
//! A fixed table groups tags into broad categories. Expanding a set of seed
//! tags yields every tag that shares a category with any seed, minus the
//! seeds themselves: topically adjacent but not already preferred.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

pub const TAG_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "sports",
        &[
            "sports", "football", "soccer", "basketball", "baseball", "tennis", "fitness",
            "running", "gym", "golf",
        ],
    ),
    (
        "gaming",
        &[
            "gaming", "games", "esports", "videogames", "minecraft", "fortnite", "twitch",
            "console", "pc", "streaming",
        ],
    ),
    (
        "art",
        &[
            "art", "drawing", "painting", "illustration", "digitalart", "sketch", "design",
            "photography", "anime",
        ],
    ),
    (
        "music",
        &[
            "music", "singing", "guitar", "piano", "hiphop", "rock", "dance", "concert", "dj",
            "producer",
        ],
    ),
    (
        "tech",
        &[
            "tech", "technology", "programming", "coding", "ai", "gadgets", "crypto",
            "blockchain", "web3", "nft",
        ],
    ),
    (
        "lifestyle",
        &[
            "lifestyle", "fashion", "beauty", "food", "cooking", "travel", "wellness", "vlog",
            "home",
        ],
    ),
    (
        "entertainment",
        &[
            "entertainment", "movies", "tv", "comedy", "memes", "funny", "celebrity", "anime",
            "streaming",
        ],
    ),
    (
        "nature",
        &[
            "nature", "animals", "pets", "wildlife", "outdoors", "hiking", "landscape", "ocean",
            "plants",
        ],
    ),
    (
        "automotive",
        &[
            "automotive", "cars", "motorcycles", "racing", "trucks", "supercars", "tuning", "ev",
        ],
    ),
    (
        "education",
        &[
            "education", "learning", "science", "history", "math", "tutorial", "study", "books",
            "language",
        ],
    ),
];

/// The user's `n` strongest tags by score, ties broken alphabetically.
///
/// Non-positive scores carry no preference and are skipped.
pub fn top_tags(prefs: &HashMap<String, f64>, n: usize) -> Vec<String> {
    let mut ranked: Vec<(&String, f64)> = prefs
        .iter()
        .filter(|(_, score)| **score > 0.0)
        .map(|(tag, score)| (tag, *score))
        .collect();
    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });
    ranked.into_iter().take(n).map(|(tag, _)| tag.clone()).collect()
}

/// Tags sharing a category with any of `seeds`, excluding the seeds.
///
/// Seeds are expected to be normalized already.
pub fn related_tags(seeds: &[String]) -> BTreeSet<String> {
    let mut related = BTreeSet::new();
    for (_, members) in TAG_CATEGORIES {
        if members.iter().any(|m| seeds.iter().any(|s| s == m)) {
            related.extend(members.iter().map(|m| m.to_string()));
        }
    }
    for seed in seeds {
        related.remove(seed);
    }
    related
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaming_does_not_reach_cooking() {
        let related = related_tags(&["gaming".to_string()]);
        assert!(related.contains("esports"));
        assert!(!related.contains("gaming"));
        assert!(!related.contains("cooking"));
    }

    #[test]
    fn overlapping_categories_union() {
        let related = related_tags(&["anime".to_string()]);
        assert!(related.contains("drawing"));
        assert!(related.contains("comedy"));
    }

    #[test]
    fn unknown_seed_expands_to_nothing() {
        assert!(related_tags(&["knitting".to_string()]).is_empty());
    }

    #[test]
    fn top_tags_order_and_cut() {
        let prefs: HashMap<String, f64> = [
            ("gaming".to_string(), 80.0),
            ("art".to_string(), 20.0),
            ("music".to_string(), 20.0),
            ("tech".to_string(), 0.0),
        ]
        .into_iter()
        .collect();
        assert_eq!(top_tags(&prefs, 2), vec!["gaming".to_string(), "art".to_string()]);
        assert_eq!(top_tags(&prefs, 10).len(), 3);
    }
}

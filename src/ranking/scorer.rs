use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::post::{Post, UserSignals};
use crate::ranking::config::ScoreWeights;
use crate::ranking::related::{related_tags, top_tags};
use crate::types::feed_page::{ScoreBreakdown, ScoredPost};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Everything about the viewer a score depends on.
///
/// Built once per feed computation and shared by every candidate.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub signals: &'a UserSignals,
    pub top_tags: Vec<String>,
    pub related_tags: BTreeSet<String>,
    pub now: DateTime<Utc>,
}

impl<'a> ScoringContext<'a> {
    /// Derive top and related tags from the user's current preferences.
    pub fn new(signals: &'a UserSignals, top_tag_count: usize, now: DateTime<Utc>) -> Self {
        let top = top_tags(&signals.tag_prefs, top_tag_count);
        let related = related_tags(&top);
        Self {
            signals,
            top_tags: top,
            related_tags: related,
            now,
        }
    }

    /// Seed the expansion from explicit interests instead of preferences.
    pub fn from_interests(signals: &'a UserSignals, now: DateTime<Utc>) -> Self {
        let related = related_tags(&signals.interests);
        Self {
            signals,
            top_tags: signals.interests.clone(),
            related_tags: related,
            now,
        }
    }
}

pub trait Scorer {
    fn score(&self, post: &Post, ctx: &ScoringContext<'_>) -> ScoreBreakdown;

    fn score_value(&self, details: &ScoreBreakdown) -> f64 {
        let score = details.total();
        debug_assert!(score.is_finite(), "score {score} is not finite");
        score
    }
}

/// Weighted sum of normalized terms plus an uncapped badge bonus.
#[derive(Debug, Clone, Default)]
pub struct WeightedScorer {
    weights: ScoreWeights,
}

impl WeightedScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    // Missing or negative preference totals count as zero.
    fn normalize_preference(&self, total: f64) -> f64 {
        (total.max(0.0) / self.weights.preference_denominator).min(1.0)
    }

    fn log_term(value: f64) -> f64 {
        value.max(0.0).ln_1p() / 10.0
    }
}

impl Scorer for WeightedScorer {
    fn score(&self, post: &Post, ctx: &ScoringContext<'_>) -> ScoreBreakdown {
        let w = &self.weights;
        let tags = post.normalized_tags();

        let mut matched_tags = Vec::new();
        let mut preference_total = 0.0;
        for tag in &tags {
            if let Some(score) = ctx.signals.tag_prefs.get(tag) {
                preference_total += score.max(0.0);
                matched_tags.push(tag.clone());
            }
        }
        let tag_relevance = self.normalize_preference(preference_total) * w.tag_relevance;

        let related_bonus = if tags.iter().any(|t| ctx.related_tags.contains(t)) {
            w.related_bonus
        } else {
            0.0
        };

        let creator_total = post
            .creator_id
            .as_ref()
            .and_then(|c| ctx.signals.creator_prefs.get(c))
            .copied()
            .unwrap_or(0.0);
        let creator_affinity = self.normalize_preference(creator_total) * w.creator_affinity;

        let days = ((ctx.now - post.created_at).num_milliseconds() as f64 / MILLIS_PER_DAY).max(0.0);

        ScoreBreakdown {
            matched_tags,
            tag_relevance,
            related_bonus,
            creator_affinity,
            engagement: Self::log_term(post.engagement_score) * w.engagement,
            viral: Self::log_term(post.viral_score) * w.viral,
            freshness: w.freshness_decay.powf(days) * w.freshness,
            quality: post.quality_score / 100.0 * w.quality,
            badge_bonus: if post.creator_has_badge { w.badge_bonus } else { 0.0 },
        }
    }
}

pub fn score_post<S: Scorer>(scorer: &S, post: &Post, ctx: &ScoringContext<'_>) -> ScoredPost {
    let why = scorer.score(post, ctx);
    let score = scorer.score_value(&why);
    ScoredPost {
        post_id: post.id.clone(),
        creator_id: post.creator_id.clone(),
        score,
        why,
    }
}

/// Score every post and order by (score desc, id asc).
pub fn rank_posts<'p, S, I>(scorer: &S, posts: I, ctx: &ScoringContext<'_>) -> Vec<ScoredPost>
where
    S: Scorer,
    I: IntoIterator<Item = &'p Post>,
{
    let mut scored: Vec<ScoredPost> = posts
        .into_iter()
        .map(|post| score_post(scorer, post, ctx))
        .collect();
    sort_by_score(&mut scored);
    scored
}

pub fn sort_by_score(scored: &mut [ScoredPost]) {
    scored.sort_by(|a, b| {
        let score_cmp = b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal);
        if score_cmp != Ordering::Equal {
            score_cmp
        } else {
            a.post_id.cmp(&b.post_id)
        }
    });

    debug_assert!(scored.windows(2).all(|w| {
        let a = &w[0];
        let b = &w[1];
        a.score > b.score
            || (a.score == b.score && a.post_id <= b.post_id)
            || a.score.is_nan()
            || b.score.is_nan()
    }));
}

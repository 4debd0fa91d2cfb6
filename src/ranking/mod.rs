pub mod config;
pub mod regime;
pub mod related;
pub mod scorer;

pub use config::{ConfigError, InterleavePattern, RankingConfig, ScoreWeights};
pub use regime::classify_user;
pub use related::{related_tags, top_tags, TAG_CATEGORIES};
pub use scorer::{rank_posts, score_post, sort_by_score, Scorer, ScoringContext, WeightedScorer};

pub mod feed_page;
pub mod identifiers;

pub use feed_page::{FeedError, FeedPage, FeedSource, ScoreBreakdown, ScoredPost};
pub use identifiers::{normalize_tag, normalize_tags, CreatorId, FeedVersion, PostId, UserId};

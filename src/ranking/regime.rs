use crate::post::UserSignals;
use crate::types::feed_page::FeedSource;

impl FeedSource {
    /// Cold-start routing.
    ///
    /// | preferences | interests | regime       |
    /// |-------------|-----------|--------------|
    /// | yes         | any       | personalized |
    /// | no          | yes       | interests    |
    /// | no          | no        | trending     |
    pub fn classify(has_preferences: bool, has_interests: bool) -> Self {
        if has_preferences {
            FeedSource::Personalized
        } else if has_interests {
            FeedSource::Interests
        } else {
            FeedSource::Trending
        }
    }
}

/// Regime for a possibly anonymous viewer.
pub fn classify_user(signals: Option<&UserSignals>) -> FeedSource {
    match signals {
        Some(s) => FeedSource::classify(s.has_preferences(), s.has_interests()),
        None => FeedSource::Trending,
    }
}

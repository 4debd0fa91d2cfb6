pub mod post;
pub mod signals;

pub use crate::types::identifiers::{CreatorId, PostId, UserId};
pub use post::{MediaKind, Post};
pub use signals::{
    CreatorPreference, InteractionEvent, InteractionType, SeenRecord, TagPreference, UserSignals,
    CREATOR_BADGE_BOOST, INTEREST_SEED_SCORE,
};

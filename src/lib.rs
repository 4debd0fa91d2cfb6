//! Feed recommendation engine for a social content-sharing application.
//!
//! `feed-core` decides, for a viewer and a bounded pool of candidate posts,
//! which posts to show and in what order. It scores posts against the
//! viewer's tag and creator preferences, routes viewers without history
//! through interest-seeded or trending regimes, interleaves personalized
//! and discovery streams, and caps how often one creator appears.
//!
//! Storage is external: the crate talks to it through the
//! [`store::SignalStore`] and [`store::CandidatePoolLoader`] traits.

pub mod compose;
pub mod feed;
pub mod post;
pub mod ranking;
pub mod recorder;
pub mod store;
pub mod types;

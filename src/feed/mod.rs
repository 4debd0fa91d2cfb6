pub mod continuation;
pub mod engine;
pub mod session;

pub use continuation::continuation;
pub use engine::FeedEngine;
pub use session::FeedSession;

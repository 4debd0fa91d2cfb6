pub mod interaction;

pub use interaction::{InteractionRecorder, RecordOutcome};

pub mod memory;
pub mod snapshot;
pub mod traits;

use thiserror::Error;

pub use memory::{InMemoryPool, InMemorySignalStore};
pub use snapshot::JsonPoolLoader;
pub use traits::{CandidatePoolLoader, SignalStore};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

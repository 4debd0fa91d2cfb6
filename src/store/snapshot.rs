use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::post::Post;
use crate::store::traits::CandidatePoolLoader;
use crate::store::StoreError;

/// Loads the candidate pool from a JSON array of posts on disk.
///
/// The file is re-read on every call, so replacing it between calls is
/// picked up by the next feed computation.
#[derive(Debug, Clone)]
pub struct JsonPoolLoader {
    path: PathBuf,
}

impl JsonPoolLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write `posts` as a snapshot the loader can read back.
    pub fn write_snapshot(path: &Path, posts: &[Post]) -> Result<(), StoreError> {
        let f = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(&f, posts)?;
        f.sync_all()?;
        Ok(())
    }
}

#[async_trait]
impl CandidatePoolLoader for JsonPoolLoader {
    async fn load_candidates(&self, limit: usize) -> Result<Vec<Post>, StoreError> {
        let f = std::fs::File::open(&self.path)?;
        let posts: Vec<Post> = serde_json::from_reader(std::io::BufReader::new(f))?;
        Ok(most_recent(posts, limit))
    }
}

/// Keep the `limit` newest posts, newest first, ties broken by id.
pub(crate) fn most_recent(mut posts: Vec<Post>, limit: usize) -> Vec<Post> {
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    posts.truncate(limit);
    posts
}

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What the indexer does when a document id equals a term's cumulative id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateIdPolicy {
    /// Append another posting with a zero delta. Re-indexing is not deduplicated.
    #[default]
    Append,
    /// Fail with an ordering error.
    Reject,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexerConfig {
    #[serde(default)]
    pub duplicate_ids: DuplicateIdPolicy,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Upper bound on returned documents; `None` returns every match.
    #[serde(default)]
    pub max_results: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,
    /// Background flush interval; `None` leaves flushing to explicit calls.
    #[serde(default = "default_flush_every_ms")]
    pub flush_every_ms: Option<u64>,
    /// Open a throwaway store that is removed on drop.
    #[serde(default)]
    pub temporary: bool,
}

fn default_cache_capacity() -> u64 { 64 * 1024 * 1024 }
fn default_flush_every_ms() -> Option<u64> { Some(500) }

impl StoreConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            cache_capacity: default_cache_capacity(),
            flush_every_ms: default_flush_every_ms(),
            temporary: false,
        }
    }
}

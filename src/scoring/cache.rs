//! In-memory memo of relevance results keyed by the BLAKE3 hash of the final prompt.
//!
//! Generation is greedy, so an identical prompt always yields an identical result.

use moka::sync::Cache;

use super::types::RelevanceResult;

#[inline]
pub fn hash_prompt(prompt: &str) -> [u8; 32] {
    *blake3::hash(prompt.as_bytes()).as_bytes()
}

pub struct ResultCache {
    entries: Cache<[u8; 32], RelevanceResult>,
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("entries", &self.entries.entry_count())
            .finish()
    }
}

impl ResultCache {
    pub const DEFAULT_CAPACITY: u64 = 10_000;

    /// Creates a cache with a max entry capacity (LRU eviction).
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
        }
    }

    #[inline]
    pub fn get(&self, key: &[u8; 32]) -> Option<RelevanceResult> {
        self.entries.get(key)
    }

    #[inline]
    pub fn insert(&self, key: [u8; 32], result: RelevanceResult) {
        self.entries.insert(key, result);
    }

    /// Approximate entry count (moka updates it lazily).
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

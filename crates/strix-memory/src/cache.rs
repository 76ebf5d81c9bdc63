//! Cache of previously generated chunk summaries, keyed by chunk content.
//!
//! Summaries are themselves cached (§4.4) so that re-compressing the same
//! prefix of a long-running agent's history on every iteration doesn't
//! re-request a summary for a chunk that's already been folded.

use std::collections::HashMap;

use strix_crypto::ContentHash;
use tokio::sync::Mutex;

/// A cache from chunk content hash to its generated summary text.
#[derive(Default)]
pub struct SummaryCache {
    entries: Mutex<HashMap<ContentHash, String>>,
}

impl SummaryCache {
    /// A new, empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached summary for this chunk's content.
    pub async fn get(&self, key: &ContentHash) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }

    /// Record a freshly generated summary.
    pub async fn insert(&self, key: ContentHash, summary: String) {
        self.entries.lock().await.insert(key, summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_then_get_roundtrips() {
        let cache = SummaryCache::new();
        let key = ContentHash::hash(b"chunk-1");
        cache.insert(key, "summary".into()).await;
        assert_eq!(cache.get(&key).await.as_deref(), Some("summary"));
    }

    #[tokio::test]
    async fn miss_returns_none() {
        let cache = SummaryCache::new();
        assert!(cache.get(&ContentHash::hash(b"nope")).await.is_none());
    }
}

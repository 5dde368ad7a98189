//! Shared, append-only knowledge store.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::entry::KnowledgeEntry;

/// Ordered, append-only collection of [`KnowledgeEntry`] values.
///
/// Cloning the store yields another handle to the same entries. Appends take
/// the write lock, so concurrent appends are serialized and none is lost.
/// Reads return owned data and never hold the lock past the call.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeStore {
    entries: Arc<RwLock<Vec<KnowledgeEntry>>>,
}

impl KnowledgeStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to the end of the store.
    pub async fn append(&self, entry: KnowledgeEntry) {
        let mut entries = self.entries.write().await;
        entries.push(entry);
        tracing::debug!(count = entries.len(), "Appended knowledge entry");
    }

    /// Join the text of every entry with newlines, in insertion order.
    ///
    /// Returns an empty string when the store is empty.
    pub async fn render_context(&self) -> String {
        let entries = self.entries.read().await;
        entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Owned copy of all entries, in insertion order.
    pub async fn snapshot(&self) -> Vec<KnowledgeEntry> {
        self.entries.read().await.clone()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store has no entries.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

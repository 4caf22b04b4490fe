use crate::index::inverted::InvertedIndex;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

/// Immutable view of one committed index state. Searches hold an Arc
/// to the snapshot they started on, so a concurrent commit never
/// mutates data under them.
pub struct IndexSnapshot {
    pub version: u64,
    pub index: Arc<InvertedIndex>,
    pub committed_at: DateTime<Utc>,
}

impl IndexSnapshot {
    pub fn doc_count(&self) -> usize {
        self.index.doc_count()
    }
}

/// Publishes snapshots after each commit; readers always see a whole
/// commit, never a partial one.
pub struct SnapshotController {
    current: RwLock<Arc<IndexSnapshot>>,
}

impl SnapshotController {
    pub fn new(index: InvertedIndex) -> Self {
        SnapshotController {
            current: RwLock::new(Arc::new(IndexSnapshot {
                version: 1,
                index: Arc::new(index),
                committed_at: Utc::now(),
            })),
        }
    }

    /// The latest committed snapshot
    pub fn current(&self) -> Arc<IndexSnapshot> {
        self.current.read().clone()
    }

    /// Swap in a new committed state, bumping the version
    pub fn publish(&self, index: Arc<InvertedIndex>) -> u64 {
        let mut guard = self.current.write();
        let version = guard.version + 1;
        *guard = Arc::new(IndexSnapshot {
            version,
            index,
            committed_at: Utc::now(),
        });
        version
    }
}

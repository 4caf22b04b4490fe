use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of the live index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_documents: usize,
    pub total_terms: usize,
    pub snapshot_version: u64,
    pub committed_at: DateTime<Utc>,
}

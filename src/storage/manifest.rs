use crate::core::error::{Error, ErrorKind, Result};
use crate::storage::layout::StorageLayout;
use crate::storage::segment::SegmentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;

/// Commit pointer: names the one segment that constitutes the live
/// index. Written to a staging file and renamed into place so readers
/// observe either the old commit or the new one, never a torn state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub segment_id: SegmentId,
    pub committed_at: DateTime<Utc>,
    pub doc_count: usize,
}

impl Manifest {
    pub fn new(segment_id: SegmentId, doc_count: usize) -> Self {
        Manifest {
            segment_id,
            committed_at: Utc::now(),
            doc_count,
        }
    }

    pub fn commit(&self, layout: &StorageLayout) -> Result<()> {
        let temp_path = layout.manifest_temp_path();
        let data = bincode::serialize(self)?;

        let mut file = File::create(&temp_path)?;
        file.write_all(&data)?;
        file.sync_all()?;
        drop(file);

        std::fs::rename(&temp_path, layout.manifest_path())?;
        Ok(())
    }

    /// Load the current commit pointer; None for a fresh index. A
    /// manifest that exists but cannot be decoded means the index
    /// cannot be opened, not that a query was malformed.
    pub fn load(layout: &StorageLayout) -> Result<Option<Manifest>> {
        let path = layout.manifest_path();
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read(&path)?;
        let manifest = bincode::deserialize(&data).map_err(|e| {
            Error::new(
                ErrorKind::IndexUnavailable,
                format!("Manifest at {} is corrupt: {}", path.display(), e),
            )
        })?;
        Ok(Some(manifest))
    }
}

use crate::core::error::Result;
use crate::storage::segment::SegmentId;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory structure under the index root
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,
    pub segments_dir: PathBuf, // Serialized index snapshots (.seg)
    pub meta_dir: PathBuf,     // Manifest and lock files
}

impl StorageLayout {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        let segments_dir = base_dir.join("segments");
        let meta_dir = base_dir.join("meta");

        fs::create_dir_all(&segments_dir)?;
        fs::create_dir_all(&meta_dir)?;

        Ok(StorageLayout {
            base_dir,
            segments_dir,
            meta_dir,
        })
    }

    pub fn segment_path(&self, id: &SegmentId) -> PathBuf {
        self.segments_dir.join(format!("{}.seg", id.0))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.meta_dir.join("manifest.bin")
    }

    /// Staging path for the manifest; renamed over the live file on commit
    pub fn manifest_temp_path(&self) -> PathBuf {
        self.meta_dir.join("manifest.tmp")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.meta_dir.join(".lock")
    }

    /// Segment files currently on disk
    pub fn list_segments(&self) -> Result<Vec<(SegmentId, PathBuf)>> {
        let mut segments = Vec::new();
        for entry in fs::read_dir(&self.segments_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("seg") {
                continue;
            }
            if let Some(id) = parse_segment_id(&path) {
                segments.push((id, path));
            }
        }
        Ok(segments)
    }
}

fn parse_segment_id(path: &Path) -> Option<SegmentId> {
    let stem = path.file_stem()?.to_str()?;
    stem.parse().ok().map(SegmentId)
}

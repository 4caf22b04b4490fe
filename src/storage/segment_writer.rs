use crate::core::error::Result;
use crate::index::inverted::InvertedIndex;
use crate::storage::layout::StorageLayout;
use crate::storage::segment::{CompressionType, SegmentHeader, SegmentId};
use crc32fast::Hasher;
use std::fs::File;
use std::io::Write;

/// Serializes a full index snapshot into a new segment file:
/// [u32 header length][header][lz4 payload], fsynced before return.
pub struct SegmentWriter<'a> {
    layout: &'a StorageLayout,
}

impl<'a> SegmentWriter<'a> {
    pub fn new(layout: &'a StorageLayout) -> Self {
        SegmentWriter { layout }
    }

    pub fn write(&self, index: &InvertedIndex) -> Result<SegmentId> {
        let segment_id = SegmentId::new();

        let raw = bincode::serialize(index)?;
        let payload = lz4_flex::compress_prepend_size(&raw);

        let mut hasher = Hasher::new();
        hasher.update(&payload);
        let header = SegmentHeader::new(
            hasher.finalize(),
            CompressionType::Lz4,
            payload.len() as u64,
        );
        let header_bytes = bincode::serialize(&header)?;

        let mut file = File::create(self.layout.segment_path(&segment_id))?;
        file.write_all(&(header_bytes.len() as u32).to_le_bytes())?;
        file.write_all(&header_bytes)?;
        file.write_all(&payload)?;
        file.sync_all()?;

        Ok(segment_id)
    }
}

use crate::core::error::{Error, ErrorKind, Result};
use crate::index::inverted::InvertedIndex;
use crate::storage::layout::StorageLayout;
use crate::storage::segment::{CompressionType, SegmentHeader, SegmentId};
use crc32fast::Hasher;
use std::fs::File;
use std::io::Read;

/// Loads and verifies a committed segment
pub struct SegmentReader<'a> {
    layout: &'a StorageLayout,
}

impl<'a> SegmentReader<'a> {
    pub fn new(layout: &'a StorageLayout) -> Self {
        SegmentReader { layout }
    }

    pub fn read(&self, segment_id: &SegmentId) -> Result<InvertedIndex> {
        let mut file = File::open(self.layout.segment_path(segment_id))?;

        let mut len_buf = [0u8; 4];
        file.read_exact(&mut len_buf)?;
        let header_len = u32::from_le_bytes(len_buf) as usize;

        let mut header_buf = vec![0u8; header_len];
        file.read_exact(&mut header_buf)?;
        let header: SegmentHeader = bincode::deserialize(&header_buf)?;

        if header.version != SegmentHeader::VERSION {
            return Err(Error::new(
                ErrorKind::IndexUnavailable,
                format!("Unsupported segment version {}", header.version),
            ));
        }

        let mut payload = vec![0u8; header.payload_len as usize];
        file.read_exact(&mut payload)?;

        let mut hasher = Hasher::new();
        hasher.update(&payload);
        if hasher.finalize() != header.checksum {
            return Err(Error::new(
                ErrorKind::IndexUnavailable,
                format!("Checksum mismatch in segment {}", segment_id),
            ));
        }

        let raw = match header.compression {
            CompressionType::Lz4 => lz4_flex::decompress_size_prepended(&payload)
                .map_err(|e| {
                    Error::new(ErrorKind::IndexUnavailable, format!("Decompression failed: {}", e))
                })?,
            CompressionType::None => payload,
        };

        Ok(bincode::deserialize(&raw)?)
    }
}

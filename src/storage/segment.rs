use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one committed index snapshot on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SegmentId(pub Uuid);

impl SegmentId {
    pub fn new() -> Self {
        SegmentId(Uuid::new_v4())
    }
}

impl Default for SegmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Segment file header, written length-prefixed ahead of the payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentHeader {
    pub version: u32,
    pub checksum: u32, // CRC32 over the compressed payload
    pub compression: CompressionType,
    pub payload_len: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionType {
    None,
    Lz4,
}

impl SegmentHeader {
    pub const VERSION: u32 = 1;

    pub fn new(checksum: u32, compression: CompressionType, payload_len: u64) -> Self {
        SegmentHeader {
            version: Self::VERSION,
            checksum,
            compression,
            payload_len,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Token representation
///
/// `offset`/`length` always refer to the original word in the source
/// text, even after filters rewrite `text`. The snippet extractor relies
/// on this to map matched terms back to character windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub position: u32,  // Token ordinal in the field (posting position)
    pub offset: usize,  // Byte offset of the original word
    pub length: usize,  // Byte length of the original word
}

impl Token {
    pub fn new(text: String, position: u32, offset: usize, length: usize) -> Self {
        Token {
            text,
            position,
            offset,
            length,
        }
    }
}

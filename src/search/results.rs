use crate::core::types::DocId;
use std::collections::HashSet;

/// One match occurrence produced by the searcher. Content-field hits
/// carry the token position of the occurrence; matches found only in
/// filename fields carry no position.
#[derive(Debug, Clone)]
pub struct RawMatch {
    pub doc_id: DocId,
    pub score: f32,
    pub position: Option<u32>,
    /// Analyzed content terms that matched this document, for highlighting
    pub matched_terms: HashSet<String>,
}

impl RawMatch {
    pub fn is_content_match(&self) -> bool {
        self.position.is_some()
    }
}

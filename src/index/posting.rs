use crate::core::types::DocId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub term_freq: u32,      // Term frequency in the field
    pub positions: Vec<u32>, // Token positions, ascending
}

/// Posting list for a term, sorted by doc_id for efficient merging
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostingList {
    pub postings: Vec<Posting>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
        }
    }

    pub fn add_posting(&mut self, posting: Posting) {
        match self
            .postings
            .binary_search_by_key(&posting.doc_id.0, |p| p.doc_id.0)
        {
            Ok(pos) => {
                self.postings[pos] = posting;
            }
            Err(pos) => {
                self.postings.insert(pos, posting);
            }
        }
    }

    /// Remove the posting for a document, if present
    pub fn remove(&mut self, doc_id: DocId) -> bool {
        match self
            .postings
            .binary_search_by_key(&doc_id.0, |p| p.doc_id.0)
        {
            Ok(pos) => {
                self.postings.remove(pos);
                true
            }
            Err(_) => false,
        }
    }

    pub fn get(&self, doc_id: DocId) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&doc_id.0, |p| p.doc_id.0)
            .ok()
            .map(|pos| &self.postings[pos])
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }
}

use crate::core::error::Result;
use fst::{IntoStreamer, Map, MapBuilder, Streamer};

/// FST-backed term lookup for ends-open wildcard patterns ("term*").
/// Rebuilt from the field dictionary at every commit; general patterns
/// go through the regex dictionary scan in the inverted index instead.
pub struct PrefixIndex {
    fst: Map<Vec<u8>>,
}

impl std::fmt::Debug for PrefixIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefixIndex")
            .field("terms", &self.fst.len())
            .finish()
    }
}

impl Clone for PrefixIndex {
    fn clone(&self) -> Self {
        let bytes = self.fst.as_fst().as_bytes().to_vec();
        // Bytes come from a map we built, so reconstruction cannot fail
        PrefixIndex {
            fst: Map::new(bytes).expect("fst bytes from a built map"),
        }
    }
}

impl PrefixIndex {
    /// Build from (term, doc_freq) pairs
    pub fn build<I>(terms: I) -> Result<Self>
    where
        I: Iterator<Item = (String, u32)>,
    {
        let mut sorted: Vec<(String, u32)> = terms.collect();
        // FST requires sorted input
        sorted.sort_by(|a, b| a.0.cmp(&b.0));
        sorted.dedup_by(|a, b| a.0 == b.0);

        let mut builder = MapBuilder::memory();
        for (term, freq) in sorted {
            builder.insert(term.as_bytes(), freq as u64)?;
        }

        Ok(PrefixIndex {
            fst: builder.into_map(),
        })
    }

    /// Find all terms starting with the given prefix
    pub fn search_prefix(&self, prefix: &str) -> Vec<String> {
        if prefix.is_empty() {
            return Vec::new();
        }

        let prefix_bytes = prefix.as_bytes();
        let mut results = Vec::new();
        let mut stream = self.fst.range().ge(prefix_bytes).into_stream();

        while let Some((term_bytes, _freq)) = stream.next() {
            if !term_bytes.starts_with(prefix_bytes) {
                break;
            }
            if let Ok(term) = String::from_utf8(term_bytes.to_vec()) {
                results.push(term);
            }
        }

        results
    }
}

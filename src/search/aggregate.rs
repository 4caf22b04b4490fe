use crate::core::config::IndexConfig;
use crate::core::types::DocId;
use crate::index::inverted::InvertedIndex;
use crate::query::builder::SearchOptions;
use crate::schema::schema::{FIELD_CONTENT, FIELD_ORIGINAL_FILENAME, FIELD_UPLOAD_DATE};
use crate::search::results::RawMatch;
use crate::search::snippet::SnippetExtractor;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One row handed back to callers, ready for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultEntry {
    pub doc_id: u64,
    pub filename: String,
    pub snippet: String,
    pub score: f32,
    pub upload_date: String,
    /// 1-based index of this occurrence within its document
    pub occurrence_index: usize,
    pub total_matches_in_doc: usize,
    pub total_unique_docs: usize,
    pub total_docs_in_system: usize,
}

/// Walks raw matches in rank order, applying the per-document snippet
/// cap and the allow-multiple policy, then annotates every entry with
/// collection-level counts.
pub struct ResultAggregator<'a> {
    config: &'a IndexConfig,
    options: &'a SearchOptions,
}

impl<'a> ResultAggregator<'a> {
    pub fn new(config: &'a IndexConfig, options: &'a SearchOptions) -> Self {
        ResultAggregator { config, options }
    }

    pub fn aggregate(
        &self,
        raw_matches: &[RawMatch],
        index: &InvertedIndex,
        limit: usize,
        total_docs_in_system: usize,
    ) -> Vec<SearchResultEntry> {
        let extractor = SnippetExtractor::new(self.config);

        // Occurrence totals are per document over the whole match set,
        // independent of how many entries survive the caps
        let mut totals: HashMap<DocId, usize> = HashMap::new();
        for raw in raw_matches {
            *totals.entry(raw.doc_id).or_insert(0) += 1;
        }

        let mut emitted: HashMap<DocId, usize> = HashMap::new();
        let mut unique_docs: HashSet<DocId> = HashSet::new();
        let mut snippet_cache: HashMap<DocId, String> = HashMap::new();
        let mut entries: Vec<SearchResultEntry> = Vec::new();

        for raw in raw_matches {
            // Unique documents are counted across every match seen,
            // including ones the caps drop
            unique_docs.insert(raw.doc_id);

            let count = emitted.get(&raw.doc_id).copied().unwrap_or(0);
            if !self.options.allow_multiple_per_doc && count >= 1 {
                continue;
            }
            if count >= self.options.max_snippets_per_doc {
                continue;
            }

            let Some(stored) = index.stored_fields(raw.doc_id) else {
                continue;
            };
            let content = stored.get(FIELD_CONTENT).map(String::as_str).unwrap_or("");

            let snippet = snippet_cache
                .entry(raw.doc_id)
                .or_insert_with(|| {
                    if raw.is_content_match() {
                        extractor.extract(content, &raw.matched_terms)
                    } else {
                        extractor.fallback(content)
                    }
                })
                .clone();

            emitted.insert(raw.doc_id, count + 1);
            entries.push(SearchResultEntry {
                doc_id: raw.doc_id.value(),
                filename: stored
                    .get(FIELD_ORIGINAL_FILENAME)
                    .cloned()
                    .unwrap_or_default(),
                snippet,
                score: raw.score,
                upload_date: stored.get(FIELD_UPLOAD_DATE).cloned().unwrap_or_default(),
                occurrence_index: count + 1,
                total_matches_in_doc: 0,
                total_unique_docs: 0,
                total_docs_in_system,
            });

            if !self.options.allow_multiple_per_doc && entries.len() >= limit * 2 {
                break;
            }
        }

        let total_unique = unique_docs.len();
        for entry in &mut entries {
            entry.total_matches_in_doc = totals.get(&DocId(entry.doc_id)).copied().unwrap_or(0);
            entry.total_unique_docs = total_unique;
        }

        entries
    }
}

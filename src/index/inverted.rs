use crate::analysis::analyzer::Analyzer;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{DocId, Document};
use crate::index::posting::{Posting, PostingList};
use crate::schema::schema::{FieldKind, Schema};
use crate::search::fuzzy::FuzzyAutomaton;
use crate::search::prefix::PrefixIndex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Analyzed term
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Term(String);

impl Term {
    pub fn new(text: &str) -> Self {
        Term(text.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Per-field postings and dictionary
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct FieldIndex {
    pub postings: HashMap<Term, PostingList>,
    pub doc_lengths: HashMap<DocId, u32>,
    pub total_tokens: u64,

    // Rebuilt at commit and after load; never persisted
    #[serde(skip)]
    prefix_index: Option<PrefixIndex>,
}

impl FieldIndex {
    /// Index analyzed tokens for a document; returns the distinct terms
    /// added so the owner can register them for later removal.
    pub fn add_tokens(&mut self, doc_id: DocId, tokens: &[crate::analysis::token::Token]) -> Vec<Term> {
        let mut term_positions: HashMap<Term, Vec<u32>> = HashMap::new();

        for token in tokens {
            term_positions
                .entry(Term::new(&token.text))
                .or_default()
                .push(token.position);
        }

        let mut terms = Vec::with_capacity(term_positions.len());
        for (term, mut positions) in term_positions {
            positions.sort_unstable();
            let posting = Posting {
                doc_id,
                term_freq: positions.len() as u32,
                positions,
            };
            self.postings
                .entry(term.clone())
                .or_default()
                .add_posting(posting);
            terms.push(term);
        }

        self.doc_lengths.insert(doc_id, tokens.len() as u32);
        self.total_tokens += tokens.len() as u64;
        terms
    }

    /// Index an exact-match token (no analysis)
    pub fn add_keyword(&mut self, doc_id: DocId, value: &str) -> Term {
        let term = Term::new(value);
        self.postings.entry(term.clone()).or_default().add_posting(Posting {
            doc_id,
            term_freq: 1,
            positions: Vec::new(),
        });
        term
    }

    fn remove_term_posting(&mut self, term: &Term, doc_id: DocId) {
        if let Some(list) = self.postings.get_mut(term) {
            list.remove(doc_id);
            if list.is_empty() {
                self.postings.remove(term);
            }
        }
    }

    fn remove_doc_length(&mut self, doc_id: DocId) {
        if let Some(len) = self.doc_lengths.remove(&doc_id) {
            self.total_tokens = self.total_tokens.saturating_sub(len as u64);
        }
    }

    pub fn posting_list(&self, term: &Term) -> Option<&PostingList> {
        self.postings.get(term)
    }

    pub fn doc_length(&self, doc_id: DocId) -> u32 {
        self.doc_lengths.get(&doc_id).copied().unwrap_or(0)
    }

    pub fn avg_doc_length(&self) -> f32 {
        if self.doc_lengths.is_empty() {
            0.0
        } else {
            self.total_tokens as f32 / self.doc_lengths.len() as f32
        }
    }

    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn rebuild_prefix_index(&mut self) -> Result<()> {
        let terms = self
            .postings
            .iter()
            .map(|(term, list)| (term.as_str().to_string(), list.doc_freq()));
        self.prefix_index = Some(PrefixIndex::build(terms)?);
        Ok(())
    }

    /// Terms starting with the given prefix (ends-open wildcard)
    pub fn expand_prefix(&self, prefix: &str) -> Vec<Term> {
        match &self.prefix_index {
            Some(index) => index
                .search_prefix(prefix)
                .into_iter()
                .map(|t| Term(t))
                .collect(),
            // Prefix index not built yet (fresh in-memory state); fall
            // back to a dictionary scan.
            None => self
                .postings
                .keys()
                .filter(|term| term.as_str().starts_with(prefix))
                .cloned()
                .collect(),
        }
    }

    /// Terms matching a wildcard pattern (* = any run, ? = one char).
    /// Literal characters are regex-escaped before compilation.
    pub fn expand_wildcard(&self, pattern: &str) -> Result<Vec<Term>> {
        let mut regex_pattern = String::with_capacity(pattern.len() + 8);
        regex_pattern.push('^');
        for ch in pattern.chars() {
            match ch {
                '*' => regex_pattern.push_str(".*"),
                '?' => regex_pattern.push('.'),
                _ => regex_pattern.push_str(&regex::escape(&ch.to_string())),
            }
        }
        regex_pattern.push('$');

        let regex = Regex::new(&regex_pattern)
            .map_err(|e| Error::new(ErrorKind::Parse, format!("Invalid wildcard: {}", e)))?;

        Ok(self
            .postings
            .keys()
            .filter(|term| regex.is_match(term.as_str()))
            .cloned()
            .collect())
    }

    /// Terms within edit distance of the given term, closest first
    pub fn expand_fuzzy(&self, term: &str, max_edits: u8) -> Vec<(Term, u8)> {
        let automaton = FuzzyAutomaton::new(term, max_edits);

        let mut matches: Vec<(Term, u8)> = self
            .postings
            .keys()
            .filter_map(|candidate| {
                automaton
                    .distance(candidate.as_str())
                    .map(|d| (candidate.clone(), d))
            })
            .collect();

        matches.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
        matches
    }
}

/// Inverted index over the fixed document schema: per-field postings,
/// stored field values, and a per-document term registry so deletion
/// removes exactly the postings a document contributed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InvertedIndex {
    pub schema: Schema,
    pub fields: HashMap<String, FieldIndex>,
    stored: HashMap<DocId, HashMap<String, String>>,
    doc_terms: HashMap<DocId, Vec<(String, Term)>>,
    doc_count: usize,
}

impl InvertedIndex {
    pub fn new(schema: Schema) -> Self {
        let fields = schema
            .fields
            .iter()
            .filter(|f| f.kind != FieldKind::Stored)
            .map(|f| (f.name.clone(), FieldIndex::default()))
            .collect();

        InvertedIndex {
            schema,
            fields,
            stored: HashMap::new(),
            doc_terms: HashMap::new(),
            doc_count: 0,
        }
    }

    /// Add a document, superseding any existing entry with the same id.
    /// Exactly one live entry per doc id at any time.
    pub fn add_document(&mut self, doc: &Document, analyzer: &Analyzer) -> Result<()> {
        self.remove_document(doc.id);

        let mut registry: Vec<(String, Term)> = Vec::new();
        let mut stored_fields: HashMap<String, String> = HashMap::new();

        let field_defs = self.schema.fields.clone();
        for field_def in &field_defs {
            let Some(value) = doc.get_field(&field_def.name) else {
                continue;
            };

            match field_def.kind {
                FieldKind::Text => {
                    let tokens = analyzer.analyze(value);
                    let field_index = self
                        .fields
                        .get_mut(&field_def.name)
                        .ok_or_else(|| Error::new(ErrorKind::InvalidState, "Missing field index"))?;
                    for term in field_index.add_tokens(doc.id, &tokens) {
                        registry.push((field_def.name.clone(), term));
                    }
                }
                FieldKind::Keyword => {
                    let field_index = self
                        .fields
                        .get_mut(&field_def.name)
                        .ok_or_else(|| Error::new(ErrorKind::InvalidState, "Missing field index"))?;
                    let term = field_index.add_keyword(doc.id, value);
                    registry.push((field_def.name.clone(), term));
                }
                FieldKind::Stored => {}
            }

            if field_def.stored {
                stored_fields.insert(field_def.name.clone(), value.to_string());
            }
        }

        self.doc_terms.insert(doc.id, registry);
        self.stored.insert(doc.id, stored_fields);
        self.doc_count += 1;
        Ok(())
    }

    /// Remove a document and all its postings; no-op when absent
    pub fn remove_document(&mut self, doc_id: DocId) -> bool {
        let Some(registry) = self.doc_terms.remove(&doc_id) else {
            return false;
        };

        for (field_name, term) in &registry {
            if let Some(field_index) = self.fields.get_mut(field_name) {
                field_index.remove_term_posting(term, doc_id);
            }
        }
        for field_index in self.fields.values_mut() {
            field_index.remove_doc_length(doc_id);
        }

        self.stored.remove(&doc_id);
        self.doc_count = self.doc_count.saturating_sub(1);
        true
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.doc_terms.contains_key(&doc_id)
    }

    pub fn field(&self, name: &str) -> Option<&FieldIndex> {
        self.fields.get(name)
    }

    pub fn stored_fields(&self, doc_id: DocId) -> Option<&HashMap<String, String>> {
        self.stored.get(&doc_id)
    }

    pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.doc_terms.keys().copied()
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    pub fn term_count(&self) -> usize {
        self.fields.values().map(|f| f.term_count()).sum()
    }

    pub fn rebuild_prefix_indexes(&mut self) -> Result<()> {
        for field_index in self.fields.values_mut() {
            field_index.rebuild_prefix_index()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::schema::{self, document_schema};

    fn doc(id: u64, content: &str, user_id: &str) -> Document {
        let mut d = Document::new(DocId(id));
        d.add_field(schema::FIELD_DOC_ID, id.to_string());
        d.add_field(schema::FIELD_FILENAME, format!("stored_{}.txt", id));
        d.add_field(schema::FIELD_ORIGINAL_FILENAME, format!("file_{}.txt", id));
        d.add_field(schema::FIELD_CONTENT, content);
        d.add_field(schema::FIELD_UPLOAD_DATE, "Jan 01, 2026 12:00 PM (UTC)");
        d.add_field(schema::FIELD_UPLOAD_DATE_ISO, "2026-01-01T12:00:00Z");
        d.add_field(schema::FIELD_USER_ID, user_id);
        d
    }

    fn index_with(docs: &[(u64, &str, &str)]) -> InvertedIndex {
        let analyzer = Analyzer::indexing();
        let mut index = InvertedIndex::new(document_schema());
        for (id, content, user) in docs {
            index.add_document(&doc(*id, content, user), &analyzer).unwrap();
        }
        index
    }

    #[test]
    fn indexes_analyzed_content_terms() {
        let index = index_with(&[(1, "Running quickly", "1")]);
        let field = index.field(schema::FIELD_CONTENT).unwrap();
        assert!(field.posting_list(&Term::new("run")).is_some());
        assert!(field.posting_list(&Term::new("Running")).is_none());
    }

    #[test]
    fn keyword_fields_skip_analysis() {
        let index = index_with(&[(1, "text", "42")]);
        let field = index.field(schema::FIELD_USER_ID).unwrap();
        assert!(field.posting_list(&Term::new("42")).is_some());
    }

    #[test]
    fn re_add_supersedes_previous_entry() {
        let analyzer = Analyzer::indexing();
        let mut index = index_with(&[(1, "alpha", "1")]);
        index.add_document(&doc(1, "omega", "1"), &analyzer).unwrap();

        assert_eq!(index.doc_count(), 1);
        let field = index.field(schema::FIELD_CONTENT).unwrap();
        assert!(field.posting_list(&Term::new("alpha")).is_none());
        assert!(field.posting_list(&Term::new("omega")).is_some());
    }

    #[test]
    fn remove_clears_postings_and_stored_fields() {
        let mut index = index_with(&[(1, "unique marker", "1"), (2, "other", "1")]);
        assert!(index.remove_document(DocId(1)));
        assert!(!index.remove_document(DocId(1)));

        assert_eq!(index.doc_count(), 1);
        let field = index.field(schema::FIELD_CONTENT).unwrap();
        assert!(field.posting_list(&Term::new("marker")).is_none());
        assert!(index.stored_fields(DocId(1)).is_none());
    }

    #[test]
    fn wildcard_expansion_matches_substrings() {
        let index = index_with(&[(1, "category catalog dog", "1")]);
        let field = index.field(schema::FIELD_CONTENT).unwrap();
        let mut terms: Vec<String> = field
            .expand_wildcard("*cat*")
            .unwrap()
            .into_iter()
            .map(|t| t.as_str().to_string())
            .collect();
        terms.sort();
        assert_eq!(terms, vec!["catalog", "categori"]);
    }

    #[test]
    fn wildcard_escapes_regex_metacharacters() {
        let index = index_with(&[(1, "alpha beta", "1")]);
        let field = index.field(schema::FIELD_CONTENT).unwrap();
        // A pattern with regex syntax must be treated literally
        assert!(field.expand_wildcard("a(l|x)*").unwrap().is_empty());
    }

    #[test]
    fn fuzzy_expansion_orders_by_distance() {
        let index = index_with(&[(1, "hello hallo help", "1")]);
        let field = index.field(schema::FIELD_CONTENT).unwrap();
        let matches = field.expand_fuzzy("hello", 1);
        assert_eq!(matches[0].0.as_str(), "hello");
        assert_eq!(matches[0].1, 0);
        assert!(matches.iter().any(|(t, d)| t.as_str() == "hallo" && *d == 1));
        assert!(!matches.iter().any(|(t, _)| t.as_str() == "help"));
    }
}

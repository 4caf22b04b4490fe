use crate::core::error::Result;
use crate::core::types::DocId;
use crate::index::inverted::{InvertedIndex, Term};
use crate::query::ast::Query;
use crate::schema::schema::FIELD_CONTENT;
use crate::scoring::scorer::{inverse_doc_freq, BM25Scorer, DocStats, Scorer};
use crate::search::results::RawMatch;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Score reduction per edit of distance for fuzzy matches
const FUZZY_EDIT_PENALTY: f32 = 0.2;

/// Per-document accumulator built while walking the query tree
#[derive(Debug, Default, Clone)]
struct DocAccum {
    score: f32,
    positions: Vec<u32>,
    terms: HashSet<String>,
}

impl DocAccum {
    fn merge(&mut self, other: DocAccum) {
        self.score += other.score;
        self.positions.extend(other.positions);
        self.terms.extend(other.terms);
    }
}

/// Executes a query tree against one index snapshot. Emits one raw
/// match per content-field occurrence so downstream aggregation can
/// surface multiple snippets from the same document.
pub struct Searcher<'a> {
    index: &'a InvertedIndex,
    scorer: Box<dyn Scorer>,
    result_cap: usize,
}

impl<'a> Searcher<'a> {
    pub fn new(index: &'a InvertedIndex, result_cap: usize) -> Self {
        Searcher {
            index,
            scorer: Box::new(BM25Scorer::default()),
            result_cap,
        }
    }

    pub fn with_scorer(index: &'a InvertedIndex, scorer: Box<dyn Scorer>, result_cap: usize) -> Self {
        Searcher {
            index,
            scorer,
            result_cap,
        }
    }

    pub fn search(&self, query: &Query) -> Result<Vec<RawMatch>> {
        let accums = self.evaluate(query)?;

        let mut docs: Vec<(DocId, DocAccum)> = accums.into_iter().collect();
        docs.sort_by(|a, b| {
            b.1.score
                .partial_cmp(&a.1.score)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let mut matches = Vec::new();
        'docs: for (doc_id, mut accum) in docs {
            if accum.positions.is_empty() {
                // Filename-only hit: a single positionless match
                matches.push(RawMatch {
                    doc_id,
                    score: accum.score,
                    position: None,
                    matched_terms: accum.terms,
                });
                if matches.len() >= self.result_cap {
                    break;
                }
            } else {
                accum.positions.sort_unstable();
                accum.positions.dedup();
                for position in accum.positions {
                    matches.push(RawMatch {
                        doc_id,
                        score: accum.score,
                        position: Some(position),
                        matched_terms: accum.terms.clone(),
                    });
                    if matches.len() >= self.result_cap {
                        break 'docs;
                    }
                }
            }
        }

        Ok(matches)
    }

    fn evaluate(&self, query: &Query) -> Result<HashMap<DocId, DocAccum>> {
        match query {
            Query::Term(t) => Ok(self.score_terms(&t.field, vec![(Term::new(&t.value), 1.0)])),
            Query::Prefix(p) => {
                let expansions = match self.index.field(&p.field) {
                    Some(field) => field
                        .expand_prefix(&p.prefix)
                        .into_iter()
                        .map(|term| (term, 1.0))
                        .collect(),
                    None => Vec::new(),
                };
                Ok(self.score_terms(&p.field, expansions))
            }
            Query::Wildcard(w) => {
                let expansions = match self.index.field(&w.field) {
                    Some(field) => field
                        .expand_wildcard(&w.pattern)?
                        .into_iter()
                        .map(|term| (term, 1.0))
                        .collect(),
                    None => Vec::new(),
                };
                Ok(self.score_terms(&w.field, expansions))
            }
            Query::Fuzzy(f) => {
                let expansions = match self.index.field(&f.field) {
                    Some(field) => field
                        .expand_fuzzy(&f.term, f.max_edits)
                        .into_iter()
                        .map(|(term, distance)| {
                            (term, 1.0 - distance as f32 * FUZZY_EDIT_PENALTY)
                        })
                        .collect(),
                    None => Vec::new(),
                };
                Ok(self.score_terms(&f.field, expansions))
            }
            Query::Bool(b) => {
                let mut result: Option<HashMap<DocId, DocAccum>> = None;
                for clause in &b.must {
                    let child = self.evaluate(clause)?;
                    result = Some(match result {
                        None => child,
                        Some(current) => intersect_sum(current, child),
                    });
                }

                let mut result = match result {
                    Some(map) => {
                        // With must clauses present, should clauses only
                        // boost documents already matched
                        let mut map = map;
                        for clause in &b.should {
                            for (doc_id, accum) in self.evaluate(clause)? {
                                if let Some(existing) = map.get_mut(&doc_id) {
                                    existing.merge(accum);
                                }
                            }
                        }
                        map
                    }
                    None => {
                        let mut union = HashMap::new();
                        for clause in &b.should {
                            for (doc_id, accum) in self.evaluate(clause)? {
                                union.entry(doc_id).or_insert_with(DocAccum::default).merge(accum);
                            }
                        }
                        union
                    }
                };

                // Filters restrict without scoring
                for clause in &b.filter {
                    let allowed = self.evaluate(clause)?;
                    result.retain(|doc_id, _| allowed.contains_key(doc_id));
                }

                Ok(result)
            }
            Query::MatchAll => Ok(self
                .index
                .doc_ids()
                .map(|doc_id| {
                    (
                        doc_id,
                        DocAccum {
                            score: 1.0,
                            ..DocAccum::default()
                        },
                    )
                })
                .collect()),
        }
    }

    /// Score a set of expanded terms over one field, accumulating
    /// per-document. Content-field hits record positions and terms for
    /// snippet extraction.
    fn score_terms(&self, field_name: &str, expansions: Vec<(Term, f32)>) -> HashMap<DocId, DocAccum> {
        let mut out: HashMap<DocId, DocAccum> = HashMap::new();
        let Some(field) = self.index.field(field_name) else {
            return out;
        };

        let total_docs = self.index.doc_count();
        let avg_doc_length = field.avg_doc_length();
        let is_content = field_name == FIELD_CONTENT;

        for (term, boost) in expansions {
            let Some(list) = field.posting_list(&term) else {
                continue;
            };
            let idf = inverse_doc_freq(total_docs, list.doc_freq());

            for posting in &list.postings {
                let stats = DocStats {
                    doc_length: field.doc_length(posting.doc_id),
                    avg_doc_length,
                    total_docs,
                };
                let accum = out.entry(posting.doc_id).or_default();
                accum.score += self.scorer.score(posting, idf, &stats) * boost;
                if is_content {
                    accum.positions.extend_from_slice(&posting.positions);
                    accum.terms.insert(term.as_str().to_string());
                }
            }
        }

        out
    }
}

fn intersect_sum(
    mut left: HashMap<DocId, DocAccum>,
    right: HashMap<DocId, DocAccum>,
) -> HashMap<DocId, DocAccum> {
    left.retain(|doc_id, _| right.contains_key(doc_id));
    for (doc_id, accum) in right {
        if let Some(existing) = left.get_mut(&doc_id) {
            existing.merge(accum);
        }
    }
    left
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyzer::Analyzer;
    use crate::core::types::Document;
    use crate::query::ast::{BoolQuery, PrefixQuery, TermQuery};
    use crate::query::builder::{QueryBuilder, SearchOptions};
    use crate::schema::schema::{self, document_schema};

    fn doc(id: u64, filename: &str, content: &str, user_id: &str) -> Document {
        let mut d = Document::new(DocId(id));
        d.add_field(schema::FIELD_DOC_ID, id.to_string());
        d.add_field(schema::FIELD_FILENAME, format!("{}_stored", filename));
        d.add_field(schema::FIELD_ORIGINAL_FILENAME, filename);
        d.add_field(schema::FIELD_CONTENT, content);
        d.add_field(schema::FIELD_UPLOAD_DATE, "Jan 01, 2026 12:00 PM (UTC)");
        d.add_field(schema::FIELD_UPLOAD_DATE_ISO, "2026-01-01T12:00:00Z");
        d.add_field(schema::FIELD_USER_ID, user_id);
        d
    }

    fn index_with(docs: Vec<Document>) -> InvertedIndex {
        let analyzer = Analyzer::indexing();
        let mut index = InvertedIndex::new(document_schema());
        for d in docs {
            index.add_document(&d, &analyzer).unwrap();
        }
        index
    }

    fn term(field: &str, value: &str) -> Query {
        Query::Term(TermQuery {
            field: field.to_string(),
            value: value.to_string(),
        })
    }

    #[test]
    fn emits_one_match_per_content_occurrence() {
        let index = index_with(vec![doc(1, "a.txt", "cat dog cat bird cat", "1")]);
        let searcher = Searcher::new(&index, 1000);
        let matches = searcher.search(&term(schema::FIELD_CONTENT, "cat")).unwrap();

        assert_eq!(matches.len(), 3);
        let positions: Vec<u32> = matches.iter().map(|m| m.position.unwrap()).collect();
        assert_eq!(positions, vec![0, 2, 4]);
        // Same document-level score on every occurrence
        assert!(matches.windows(2).all(|w| w[0].score == w[1].score));
    }

    #[test]
    fn filename_only_hits_are_positionless() {
        let index = index_with(vec![doc(1, "report.txt", "nothing relevant", "1")]);
        let searcher = Searcher::new(&index, 1000);
        let matches = searcher
            .search(&term(schema::FIELD_ORIGINAL_FILENAME, "report"))
            .unwrap();

        assert_eq!(matches.len(), 1);
        assert!(matches[0].position.is_none());
    }

    #[test]
    fn higher_frequency_docs_rank_first() {
        let index = index_with(vec![
            doc(1, "a.txt", "cat once here", "1"),
            doc(2, "b.txt", "cat cat cat always", "1"),
        ]);
        let searcher = Searcher::new(&index, 1000);
        let matches = searcher.search(&term(schema::FIELD_CONTENT, "cat")).unwrap();
        assert_eq!(matches[0].doc_id, DocId(2));
    }

    #[test]
    fn ties_break_by_ascending_doc_id() {
        let index = index_with(vec![
            doc(2, "b.txt", "cat", "1"),
            doc(1, "a.txt", "cat", "1"),
        ]);
        let searcher = Searcher::new(&index, 1000);
        let matches = searcher.search(&term(schema::FIELD_CONTENT, "cat")).unwrap();
        assert_eq!(matches[0].doc_id, DocId(1));
        assert_eq!(matches[1].doc_id, DocId(2));
    }

    #[test]
    fn filter_clause_restricts_without_scoring() {
        let index = index_with(vec![
            doc(1, "a.txt", "cat", "7"),
            doc(2, "b.txt", "cat", "8"),
        ]);
        let searcher = Searcher::new(&index, 1000);

        let query = Query::Bool(
            BoolQuery::new()
                .with_must(term(schema::FIELD_CONTENT, "cat"))
                .with_filter(term(schema::FIELD_USER_ID, "7")),
        );
        let matches = searcher.search(&query).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].doc_id, DocId(1));
    }

    #[test]
    fn prefix_query_matches_expanded_terms() {
        let index = index_with(vec![doc(1, "a.txt", "helicopter helmet dog", "1")]);
        let searcher = Searcher::new(&index, 1000);

        let query = Query::Prefix(PrefixQuery {
            field: FIELD_CONTENT.to_string(),
            prefix: "hel".to_string(),
        });
        let matches = searcher.search(&query).unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn result_cap_bounds_emitted_matches() {
        let content = "cat ".repeat(50);
        let index = index_with(vec![doc(1, "a.txt", content.trim(), "1")]);
        let searcher = Searcher::new(&index, 10);
        let matches = searcher.search(&term(schema::FIELD_CONTENT, "cat")).unwrap();
        assert_eq!(matches.len(), 10);
    }

    #[test]
    fn built_queries_find_partial_matches() {
        let index = index_with(vec![doc(1, "notes.txt", "concatenate strings", "1")]);
        let searcher = Searcher::new(&index, 1000);

        let query = QueryBuilder::new()
            .build("cat", &SearchOptions::default())
            .unwrap();
        let matches = searcher.search(&query).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(matches[0].matched_terms.contains("concaten"));
    }
}

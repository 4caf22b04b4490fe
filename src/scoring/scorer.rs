use crate::index::posting::Posting;

/// Scorer trait. Implementations must be monotonic in term frequency
/// and deterministic across repeated identical queries.
pub trait Scorer: Send + Sync {
    fn score(&self, posting: &Posting, idf: f32, doc_stats: &DocStats) -> f32;

    fn name(&self) -> &str;
}

/// Per-document statistics for scoring
#[derive(Debug, Clone, Copy)]
pub struct DocStats {
    pub doc_length: u32,     // Tokens in the matched field
    pub avg_doc_length: f32, // Average field length in the collection
    pub total_docs: usize,
}

/// IDF with add-one smoothing so single-document indexes still rank
pub fn inverse_doc_freq(total_docs: usize, doc_freq: u32) -> f32 {
    ((total_docs as f32 + 1.0) / (doc_freq as f32 + 1.0)).ln() + 1.0
}

/// TF-IDF scorer
pub struct TfIdfScorer {
    pub normalize: bool,
}

impl TfIdfScorer {
    pub fn new(normalize: bool) -> Self {
        TfIdfScorer { normalize }
    }
}

impl Scorer for TfIdfScorer {
    fn score(&self, posting: &Posting, idf: f32, doc_stats: &DocStats) -> f32 {
        let tf = if self.normalize && doc_stats.doc_length > 0 {
            posting.term_freq as f32 / doc_stats.doc_length as f32
        } else {
            posting.term_freq as f32
        };

        tf * idf
    }

    fn name(&self) -> &str {
        "tfidf"
    }
}

/// BM25 scorer, the default
pub struct BM25Scorer {
    pub k1: f32, // Term frequency saturation
    pub b: f32,  // Length normalization strength
}

impl Default for BM25Scorer {
    fn default() -> Self {
        BM25Scorer { k1: 1.2, b: 0.75 }
    }
}

impl Scorer for BM25Scorer {
    fn score(&self, posting: &Posting, idf: f32, doc_stats: &DocStats) -> f32 {
        let tf = posting.term_freq as f32;
        let doc_len = doc_stats.doc_length as f32;
        let avg_doc_len = if doc_stats.avg_doc_length > 0.0 {
            doc_stats.avg_doc_length
        } else {
            1.0
        };

        let numerator = idf * tf * (self.k1 + 1.0);
        let denominator = tf + self.k1 * (1.0 - self.b + self.b * (doc_len / avg_doc_len));

        numerator / denominator
    }

    fn name(&self) -> &str {
        "bm25"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::DocId;

    fn posting(freq: u32) -> Posting {
        Posting {
            doc_id: DocId(1),
            term_freq: freq,
            positions: (0..freq).collect(),
        }
    }

    fn stats() -> DocStats {
        DocStats {
            doc_length: 100,
            avg_doc_length: 100.0,
            total_docs: 10,
        }
    }

    #[test]
    fn bm25_is_monotonic_in_term_frequency() {
        let scorer = BM25Scorer::default();
        let idf = inverse_doc_freq(10, 2);
        let low = scorer.score(&posting(1), idf, &stats());
        let high = scorer.score(&posting(5), idf, &stats());
        assert!(high > low);
    }

    #[test]
    fn rarer_terms_score_higher() {
        let scorer = BM25Scorer::default();
        let rare = scorer.score(&posting(2), inverse_doc_freq(100, 1), &stats());
        let common = scorer.score(&posting(2), inverse_doc_freq(100, 90), &stats());
        assert!(rare > common);
    }

    #[test]
    fn tfidf_normalization_divides_by_length() {
        let scorer = TfIdfScorer::new(true);
        let idf = inverse_doc_freq(10, 1);
        let score = scorer.score(&posting(10), idf, &stats());
        assert!((score - (10.0 / 100.0) * idf).abs() < 1e-6);
    }
}

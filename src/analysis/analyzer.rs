use crate::analysis::filter::TokenFilter;
use crate::analysis::filters::lowercase::LowercaseFilter;
use crate::analysis::filters::stemmer::StemmerFilter;
use crate::analysis::token::Token;
use crate::analysis::tokenizer::{StandardTokenizer, Tokenizer};
use rust_stemmers::Algorithm;

/// Text analysis pipeline shared by indexing and query enhancement.
/// Index and query sides must be built from the constructors below so a
/// stored word and its query variant normalize to the same term.
pub struct Analyzer {
    pub tokenizer: Box<dyn Tokenizer>,
    pub filters: Vec<Box<dyn TokenFilter>>,
    pub name: String,
}

impl Analyzer {
    pub fn new(name: &str, tokenizer: Box<dyn Tokenizer>) -> Self {
        Analyzer {
            tokenizer,
            filters: Vec::new(),
            name: name.to_string(),
        }
    }

    pub fn add_filter(mut self, filter: Box<dyn TokenFilter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn analyze(&self, text: &str) -> Vec<Token> {
        let mut tokens = self.tokenizer.tokenize(text);

        for filter in &self.filters {
            tokens = filter.filter(tokens);
        }

        tokens
    }

    /// Indexing pipeline: lowercase + English stemming
    pub fn indexing() -> Self {
        Analyzer::new("indexing", Box::new(StandardTokenizer::default()))
            .add_filter(Box::new(LowercaseFilter))
            .add_filter(Box::new(StemmerFilter::new(Algorithm::English)))
    }

    /// Query-side pipeline. Case sensitivity only skips the lowercase
    /// step on this side; index terms are always stored lowercased, so a
    /// mixed-case query under case_sensitive stops matching them.
    pub fn searching(case_sensitive: bool) -> Self {
        if case_sensitive {
            Analyzer::new("searching_cs", Box::new(StandardTokenizer::default()))
                .add_filter(Box::new(StemmerFilter::new(Algorithm::English)))
        } else {
            Analyzer::indexing()
        }
    }
}

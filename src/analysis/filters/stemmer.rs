use crate::analysis::filter::TokenFilter;
use crate::analysis::token::Token;
use rust_stemmers::{Algorithm, Stemmer};

pub struct StemmerFilter {
    pub algorithm: Algorithm,
}

impl StemmerFilter {
    pub fn new(algorithm: Algorithm) -> Self {
        StemmerFilter { algorithm }
    }
}

impl TokenFilter for StemmerFilter {
    fn filter(&self, tokens: Vec<Token>) -> Vec<Token> {
        let stemmer = Stemmer::create(self.algorithm);

        tokens
            .into_iter()
            .map(|mut token| {
                token.text = stemmer.stem(&token.text).to_string();
                token
            })
            .collect()
    }

    fn name(&self) -> &str {
        "stemmer"
    }
}

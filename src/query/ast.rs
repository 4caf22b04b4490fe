use serde::{Deserialize, Serialize};

/// Query tree, built fresh per search call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Query {
    Term(TermQuery),
    Prefix(PrefixQuery),
    Wildcard(WildcardQuery),
    Fuzzy(FuzzyQuery),
    Bool(BoolQuery),
    MatchAll,
}

/// Single analyzed term over a named field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TermQuery {
    pub field: String,
    pub value: String,
}

/// Ends-open wildcard ("term*")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefixQuery {
    pub field: String,
    pub prefix: String,
}

/// General wildcard pattern (* = any run, ? = one char)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WildcardQuery {
    pub field: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyQuery {
    pub field: String,
    pub term: String,
    pub max_edits: u8,
}

/// Boolean combination. `filter` clauses restrict matches without
/// contributing to the score.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoolQuery {
    pub must: Vec<Query>,
    pub should: Vec<Query>,
    pub filter: Vec<Query>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_must(mut self, query: Query) -> Self {
        self.must.push(query);
        self
    }

    pub fn with_should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    pub fn with_filter(mut self, query: Query) -> Self {
        self.filter.push(query);
        self
    }
}

use crate::analysis::analyzer::Analyzer;
use crate::core::error::{Error, ErrorKind, Result};
use crate::query::ast::{BoolQuery, FuzzyQuery, PrefixQuery, Query, TermQuery, WildcardQuery};
use crate::schema::schema::{Schema, FIELD_USER_ID};

const MAX_FUZZY_EDITS: u8 = 2;

/// Search options with named, defaulted fields. Validated once at the
/// query-building boundary.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub partial_match: bool,
    pub case_sensitive: bool,
    pub user_filter: Option<u64>,
    pub allow_multiple_per_doc: bool,
    pub max_snippets_per_doc: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            partial_match: true,
            case_sensitive: false,
            user_filter: None,
            allow_multiple_per_doc: true,
            max_snippets_per_doc: 5,
        }
    }
}

/// Turns a raw query string plus options into a query tree over the
/// default search fields, OR-grouped, optionally AND-ed with an exact
/// user_id filter.
pub struct QueryBuilder {
    pub fields: Vec<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        QueryBuilder {
            fields: Schema::default_search_fields()
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }

    pub fn build(&self, raw: &str, options: &SearchOptions) -> Result<Query> {
        let terms: Vec<&str> = raw.split_whitespace().collect();
        if terms.is_empty() {
            return Ok(Query::MatchAll);
        }

        // Query-side analyzer; case sensitivity is a pass-through here
        let analyzer = Analyzer::searching(options.case_sensitive);

        let mut should: Vec<Query> = Vec::new();
        for term in terms {
            // Bare terms become substring wildcards under partial
            // matching; terms carrying their own markers pass through.
            let enhanced = if options.partial_match && !has_marker(term) {
                format!("*{}*", term)
            } else {
                term.to_string()
            };

            for field in &self.fields {
                should.extend(self.term_leaves(field, &enhanced, options, &analyzer)?);
            }
        }

        let query = Query::Bool(BoolQuery {
            must: Vec::new(),
            should,
            filter: Vec::new(),
        });

        // Exact-match user filter: compared as a raw token, not analyzed
        match options.user_filter {
            Some(user_id) => Ok(Query::Bool(
                BoolQuery::new()
                    .with_must(query)
                    .with_filter(Query::Term(TermQuery {
                        field: FIELD_USER_ID.to_string(),
                        value: user_id.to_string(),
                    })),
            )),
            None => Ok(query),
        }
    }

    /// Parse one (possibly marker-carrying) term into leaves for a field
    fn term_leaves(
        &self,
        field: &str,
        term: &str,
        options: &SearchOptions,
        analyzer: &Analyzer,
    ) -> Result<Vec<Query>> {
        if let Some(tilde) = term.find('~') {
            let base = &term[..tilde];
            let distance = &term[tilde + 1..];

            if base.is_empty() || base.contains(['*', '?']) {
                return Err(Error::new(
                    ErrorKind::Parse,
                    format!("Malformed fuzzy term: '{}'", term),
                ));
            }
            let max_edits = if distance.is_empty() {
                1
            } else {
                match distance.parse::<u8>() {
                    Ok(d) if (1..=MAX_FUZZY_EDITS).contains(&d) => d,
                    _ => {
                        return Err(Error::new(
                            ErrorKind::Parse,
                            format!("Invalid fuzzy distance: '{}'", term),
                        ))
                    }
                }
            };

            // Fuzzy terms are analyzed like ordinary terms
            return Ok(analyzer
                .analyze(base)
                .into_iter()
                .map(|token| {
                    Query::Fuzzy(FuzzyQuery {
                        field: field.to_string(),
                        term: token.text,
                        max_edits,
                    })
                })
                .collect());
        }

        if term.contains(['*', '?']) {
            let literal: String = term.chars().filter(|c| *c != '*' && *c != '?').collect();
            if literal.is_empty() {
                return Err(Error::new(
                    ErrorKind::Parse,
                    format!("Wildcard term has no literal characters: '{}'", term),
                ));
            }

            // Wildcard patterns are case-folded but never stemmed
            let pattern = if options.case_sensitive {
                term.to_string()
            } else {
                term.to_lowercase()
            };

            // Pure trailing-star patterns take the prefix path
            if let Some(prefix) = pattern.strip_suffix('*') {
                if !prefix.contains(['*', '?']) {
                    return Ok(vec![Query::Prefix(PrefixQuery {
                        field: field.to_string(),
                        prefix: prefix.to_string(),
                    })]);
                }
            }

            return Ok(vec![Query::Wildcard(WildcardQuery {
                field: field.to_string(),
                pattern,
            })]);
        }

        Ok(analyzer
            .analyze(term)
            .into_iter()
            .map(|token| {
                Query::Term(TermQuery {
                    field: field.to_string(),
                    value: token.text,
                })
            })
            .collect())
    }
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn has_marker(term: &str) -> bool {
    term.contains(['*', '?', '~'])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(raw: &str, options: &SearchOptions) -> Query {
        QueryBuilder::new().build(raw, options).unwrap()
    }

    fn should_clauses(query: &Query) -> &[Query] {
        match query {
            Query::Bool(b) => &b.should,
            _ => panic!("expected bool query"),
        }
    }

    #[test]
    fn bare_terms_are_wrapped_under_partial_matching() {
        let query = build("cat", &SearchOptions::default());
        let clauses = should_clauses(&query);
        // One wildcard leaf per search field
        assert_eq!(clauses.len(), 3);
        assert!(matches!(
            &clauses[0],
            Query::Wildcard(w) if w.pattern == "*cat*"
        ));
    }

    #[test]
    fn exact_terms_are_analyzed_without_wrapping() {
        let options = SearchOptions {
            partial_match: false,
            ..Default::default()
        };
        let query = build("Running", &options);
        let clauses = should_clauses(&query);
        assert!(matches!(&clauses[0], Query::Term(t) if t.value == "run"));
    }

    #[test]
    fn terms_with_markers_pass_through_unwrapped() {
        let query = build("hel* term~1", &SearchOptions::default());
        let clauses = should_clauses(&query);
        assert!(clauses.iter().any(|q| matches!(q, Query::Prefix(p) if p.prefix == "hel")));
        assert!(clauses.iter().any(|q| matches!(q, Query::Fuzzy(f) if f.max_edits == 1)));
    }

    #[test]
    fn user_filter_wraps_query_with_exact_term() {
        let options = SearchOptions {
            user_filter: Some(7),
            ..Default::default()
        };
        let query = build("cat", &options);
        let Query::Bool(outer) = query else {
            panic!("expected bool query");
        };
        assert_eq!(outer.must.len(), 1);
        assert!(matches!(
            &outer.filter[0],
            Query::Term(t) if t.field == FIELD_USER_ID && t.value == "7"
        ));
    }

    #[test]
    fn wildcard_patterns_are_case_folded_but_not_stemmed() {
        let query = build("Categories*", &SearchOptions::default());
        let clauses = should_clauses(&query);
        assert!(matches!(
            &clauses[0],
            Query::Prefix(p) if p.prefix == "categories"
        ));
    }

    #[test]
    fn malformed_fuzzy_distance_is_a_parse_error() {
        let err = QueryBuilder::new()
            .build("term~x", &SearchOptions::default())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);

        let err = QueryBuilder::new()
            .build("term~9", &SearchOptions::default())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn wildcard_only_term_is_a_parse_error() {
        let err = QueryBuilder::new()
            .build("**", &SearchOptions::default())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn empty_input_builds_match_all() {
        assert_eq!(build("   ", &SearchOptions::default()), Query::MatchAll);
    }
}

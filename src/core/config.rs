use std::path::PathBuf;

/// Index-wide configuration
#[derive(Debug, Clone)]
pub struct IndexConfig {
    pub index_dir: PathBuf,

    /// Raw-match cap handed to the searcher. Deliberately high so that
    /// per-document snippet capping downstream is never starved.
    pub result_cap: usize,

    // Snippet geometry
    pub surround_chars: usize,
    pub max_fragments: usize,
    pub snippet_max_chars: usize,
    pub fallback_chars: usize,

    // Highlight markup wrapped around matched words
    pub highlight_open: String,
    pub highlight_close: String,
    pub fragment_separator: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        IndexConfig {
            index_dir: PathBuf::from("./index"),
            result_cap: 1000,
            surround_chars: 60,
            max_fragments: 5,
            snippet_max_chars: 500,
            fallback_chars: 350,
            highlight_open: "<span class=\"search-highlight\">".to_string(),
            highlight_close: "</span>".to_string(),
            fragment_separator: "...".to_string(),
        }
    }
}

impl IndexConfig {
    pub fn with_dir(index_dir: impl Into<PathBuf>) -> Self {
        IndexConfig {
            index_dir: index_dir.into(),
            ..Default::default()
        }
    }
}

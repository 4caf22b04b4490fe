use crate::analysis::analyzer::Analyzer;
use crate::core::config::IndexConfig;
use std::collections::HashSet;

/// Builds highlighted snippets by re-tokenizing stored content and
/// mapping matched terms back to their original byte ranges. Falls back
/// to a plain leading excerpt when no term maps into the content.
pub struct SnippetExtractor<'a> {
    config: &'a IndexConfig,
    analyzer: Analyzer,
}

struct Hit {
    start: usize,
    end: usize,
}

impl<'a> SnippetExtractor<'a> {
    pub fn new(config: &'a IndexConfig) -> Self {
        SnippetExtractor {
            config,
            analyzer: Analyzer::indexing(),
        }
    }

    /// Highlighted snippet for the matched terms, or the fallback
    /// excerpt when nothing maps back into the text
    pub fn extract(&self, content: &str, matched_terms: &HashSet<String>) -> String {
        let hits = self.find_hits(content, matched_terms);
        if hits.is_empty() {
            return self.fallback(content);
        }

        let fragments = self.plan_fragments(content, &hits);
        let mut snippet = String::new();

        for (index, (frag_start, frag_end)) in fragments.iter().enumerate() {
            if index > 0 {
                snippet.push_str(&self.config.fragment_separator);
            }
            self.render_fragment(content, *frag_start, *frag_end, &hits, &mut snippet);
            if snippet.len() >= self.config.snippet_max_chars {
                break;
            }
        }

        truncate_to_boundary(&mut snippet, self.config.snippet_max_chars);
        snippet
    }

    /// Leading excerpt used when a document matched on filename only
    pub fn fallback(&self, content: &str) -> String {
        let cut = floor_char_boundary(content, self.config.fallback_chars);
        if cut >= content.len() {
            content.to_string()
        } else {
            format!("{}...", &content[..cut])
        }
    }

    /// Byte ranges of content tokens whose analyzed form matched
    fn find_hits(&self, content: &str, matched_terms: &HashSet<String>) -> Vec<Hit> {
        self.analyzer
            .analyze(content)
            .into_iter()
            .filter(|token| matched_terms.contains(&token.text))
            .map(|token| Hit {
                start: token.offset,
                end: token.offset + token.length,
            })
            .collect()
    }

    /// Merge hit windows into at most max_fragments context ranges
    fn plan_fragments(&self, content: &str, hits: &[Hit]) -> Vec<(usize, usize)> {
        let surround = self.config.surround_chars;
        let mut fragments: Vec<(usize, usize)> = Vec::new();

        for hit in hits {
            let start = floor_char_boundary(content, hit.start.saturating_sub(surround));
            let end = ceil_char_boundary(content, (hit.end + surround).min(content.len()));

            match fragments.last_mut() {
                Some(last) if start <= last.1 => {
                    last.1 = last.1.max(end);
                }
                _ => {
                    if fragments.len() >= self.config.max_fragments {
                        break;
                    }
                    fragments.push((start, end));
                }
            }
        }

        fragments
    }

    fn render_fragment(
        &self,
        content: &str,
        frag_start: usize,
        frag_end: usize,
        hits: &[Hit],
        out: &mut String,
    ) {
        let mut cursor = frag_start;
        for hit in hits {
            if hit.start < frag_start || hit.end > frag_end || hit.start < cursor {
                continue;
            }
            out.push_str(&content[cursor..hit.start]);
            out.push_str(&self.config.highlight_open);
            out.push_str(&content[hit.start..hit.end]);
            out.push_str(&self.config.highlight_close);
            cursor = hit.end;
        }
        out.push_str(&content[cursor..frag_end]);
    }
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index.min(text.len())
}

fn truncate_to_boundary(text: &mut String, max_chars: usize) {
    if text.len() > max_chars {
        let cut = floor_char_boundary(text, max_chars);
        text.truncate(cut);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> IndexConfig {
        IndexConfig::default()
    }

    fn terms(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn highlights_matched_term_with_surrounding_context() {
        let config = config();
        let extractor = SnippetExtractor::new(&config);
        let content = "The quick brown fox jumps over the lazy dog near the river bank.";

        let snippet = extractor.extract(content, &terms(&["fox"]));
        assert!(snippet.contains("<span class=\"search-highlight\">fox</span>"));
        assert!(snippet.contains("quick brown"));
    }

    #[test]
    fn highlights_original_form_of_stemmed_term() {
        let config = config();
        let extractor = SnippetExtractor::new(&config);
        let content = "They were running through the field.";

        // Index-side analysis stems "running" to "run"
        let snippet = extractor.extract(content, &terms(&["run"]));
        assert!(snippet.contains("<span class=\"search-highlight\">running</span>"));
    }

    #[test]
    fn distant_occurrences_become_separate_fragments() {
        let config = config();
        let extractor = SnippetExtractor::new(&config);
        let filler = "lorem ipsum ".repeat(30);
        let content = format!("cat starts here. {} cat ends here.", filler);

        let snippet = extractor.extract(&content, &terms(&["cat"]));
        assert!(snippet.contains("..."));
        assert_eq!(snippet.matches("search-highlight").count(), 2);
    }

    #[test]
    fn falls_back_to_leading_excerpt() {
        let config = config();
        let extractor = SnippetExtractor::new(&config);
        let content = "word ".repeat(200);

        let snippet = extractor.extract(&content, &terms(&["absent"]));
        assert!(snippet.ends_with("..."));
        assert!(snippet.len() <= config.fallback_chars + 3);
    }

    #[test]
    fn short_content_fallback_is_not_truncated() {
        let config = config();
        let extractor = SnippetExtractor::new(&config);

        let snippet = extractor.extract("tiny file", &terms(&["absent"]));
        assert_eq!(snippet, "tiny file");
    }

    #[test]
    fn snippet_respects_maximum_length() {
        let config = config();
        let extractor = SnippetExtractor::new(&config);
        let content = "cat sentence with plenty of words around it. ".repeat(40);

        let snippet = extractor.extract(&content, &terms(&["cat"]));
        assert!(snippet.len() <= config.snippet_max_chars);
    }
}

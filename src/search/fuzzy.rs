use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder, DFA};

/// Automaton for fuzzy matching within a bounded edit distance.
/// Transpositions count as a single edit (teh -> the).
pub struct FuzzyAutomaton {
    max_edit_distance: u8,
    dfa: DFA,
}

impl FuzzyAutomaton {
    pub fn new(term: &str, max_edit_distance: u8) -> Self {
        let builder = LevenshteinAutomatonBuilder::new(max_edit_distance, true);
        FuzzyAutomaton {
            max_edit_distance,
            dfa: builder.build_dfa(term),
        }
    }

    /// Distance to the candidate if it lies within the bound
    pub fn distance(&self, candidate: &str) -> Option<u8> {
        let mut state = self.dfa.initial_state();

        for &byte in candidate.as_bytes() {
            state = self.dfa.transition(state, byte);
        }

        match self.dfa.distance(state) {
            Distance::Exact(d) if d <= self.max_edit_distance => Some(d),
            _ => None,
        }
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.distance(candidate).is_some()
    }
}

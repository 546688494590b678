//! Context-free dictionary replacement operators (synonyms, hypernyms).

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use veil_search::Operator;

use crate::context::Context;
use crate::ops::dictionary::load_dictionary;
use crate::ops::framework::{self, update_successor};
use crate::ops::words::parse_word_bounds;
use crate::services::OperatorServices;
use crate::state::State;

/// Replaces the word under the focus point with a dictionary alternative,
/// without considering the surrounding context.
///
/// One instance per dictionary: synonym replacement tends to preserve more
/// meaning and costs accordingly more than the blunter hypernym replacement.
pub struct LexicalReplacement {
    name: &'static str,
    description: &'static str,
    cost: f32,
    dictionary: PathBuf,
    services: Arc<OperatorServices>,
}

impl LexicalReplacement {
    /// Synonym replacement backed by the given dictionary file.
    pub fn synonyms(services: Arc<OperatorServices>, dictionary: PathBuf) -> Self {
        Self {
            name: "contextless synonyms",
            description: "replace words with synonyms without context consideration",
            cost: 10.0,
            dictionary,
            services,
        }
    }

    /// Hypernym replacement backed by the given dictionary file.
    pub fn hypernyms(services: Arc<OperatorServices>, dictionary: PathBuf) -> Self {
        Self {
            name: "contextless hypernyms",
            description: "replace words with hypernyms without context consideration",
            cost: 6.0,
            dictionary,
            services,
        }
    }
}

impl Operator<State, Context> for LexicalReplacement {
    fn name(&self) -> &'static str {
        self.name
    }

    fn cost(&self) -> f32 {
        self.cost
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn apply(&self, state: &State, context: &Context) -> HashSet<State> {
        let Some(dictionary) = load_dictionary(&self.services, &self.dictionary, '\t') else {
            return HashSet::new();
        };

        framework::expand(state, context, &self.services, |focus| {
            let (_, after) = parse_word_bounds(focus, 0, 0, &self.services);
            let (word_start, word_end) = after[0];

            let text = focus.text.as_str();
            let Some(word) = text.get(word_start..word_end) else {
                return Vec::new();
            };

            let Some(alternatives) = dictionary.get(&word.to_lowercase()) else {
                return Vec::new();
            };

            alternatives
                .iter()
                .filter_map(|alternative| {
                    update_successor(state, focus, word_start, word_end, alternative)
                })
                .collect()
        })
    }
}

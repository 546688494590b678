//! Phrase-frequency-backed word operators.
//!
//! These operators consult an external phrase-frequency service: mask or
//! drop the focus word inside a window of its neighbors, ask the service for
//! the most frequent completions of that window, and accept only the ones
//! common enough in real usage. The engine ships no concrete backend; the
//! operators are constructed only when an embedder supplies one.

use std::collections::HashSet;
use std::sync::Arc;

use veil_search::Operator;

use crate::context::Context;
use crate::ops::framework::{self, update_successor, FocusPoint};
use crate::ops::words::parse_word_bounds;
use crate::services::OperatorServices;
use crate::state::State;

/// Completions below this corpus frequency are discarded.
pub const MIN_PHRASE_FREQUENCY: u64 = 50_000;

/// Number of completions requested per query.
const MAX_PHRASE_RESULTS: u32 = 5;

/// One ranked completion of a phrase query.
#[derive(Debug, Clone)]
pub struct Phrase {
    /// The completed phrase, one entry per word.
    pub words: Vec<String>,
    /// Corpus frequency of the phrase.
    pub frequency: u64,
}

/// An external phrase-frequency service.
///
/// A query is a space-separated word sequence in which `?` marks a slot the
/// service should fill; the response lists the most frequent matching
/// phrases. Implementations must be safe to call from worker threads.
pub trait PhraseService: Send + Sync {
    /// The top `max_results` completions for `query`, ranked by frequency.
    fn search(&self, query: &str, max_results: u32) -> Vec<Phrase>;
}

/// Query the service through the shared response cache.
fn cached_search(
    services: &OperatorServices,
    backend: &dyn PhraseService,
    query: &str,
    max_results: u32,
) -> Arc<Vec<Phrase>> {
    if let Some(cached) = services.cached_phrases(query, max_results) {
        return cached;
    }

    let phrases = Arc::new(backend.search(query, max_results));
    services.store_phrases(query.to_string(), max_results, Arc::clone(&phrases));
    phrases
}

/// The word windows around a focus point used to build queries: two words of
/// context redistributed around the focus word, sliding one step each way.
fn context_windows() -> [(usize, usize); 3] {
    [(1, 3), (2, 2), (3, 1)]
}

/// Build a query over the window, rendering the focus word as `mask` (or
/// dropping it when `mask` is `None`).
fn build_query(
    text: &str,
    before: &[(usize, usize)],
    after: &[(usize, usize)],
    mask: Option<&str>,
) -> String {
    let mut query = String::new();
    for &(start, end) in before {
        query.push_str(&text[start..end]);
        query.push(' ');
    }
    let mut first = true;
    for &(start, end) in after {
        if first {
            first = false;
            if let Some(mask) = mask {
                query.push_str(mask);
                query.push(' ');
            }
            continue;
        }
        query.push_str(&text[start..end]);
        query.push(' ');
    }
    query
}

/// Replaces the focus word with a completion the service considers common in
/// the same neighborhood.
pub struct WordReplacement {
    services: Arc<OperatorServices>,
    backend: Arc<dyn PhraseService>,
}

impl WordReplacement {
    pub fn new(services: Arc<OperatorServices>, backend: Arc<dyn PhraseService>) -> Self {
        Self { services, backend }
    }

    fn successors_at(&self, focus: &FocusPoint, state: &State) -> Vec<State> {
        let text = focus.text.as_str();
        let mut successors = Vec::new();

        for (words_before, words_after) in context_windows() {
            let (before, after) =
                parse_word_bounds(focus, words_before, words_after, &self.services);
            if before.is_empty() || after.len() < 2 {
                continue;
            }

            let query = build_query(text, &before, &after, Some("?"));
            let response =
                cached_search(&self.services, &*self.backend, &query, MAX_PHRASE_RESULTS);

            let (word_start, word_end) = after[0];
            for phrase in response.iter() {
                if phrase.frequency < MIN_PHRASE_FREQUENCY {
                    continue;
                }
                let Some(replacement) = phrase.words.get(before.len()) else {
                    continue;
                };
                successors.extend(update_successor(
                    state,
                    focus,
                    word_start,
                    word_end,
                    replacement,
                ));
            }
        }

        successors
    }
}

impl Operator<State, Context> for WordReplacement {
    fn name(&self) -> &'static str {
        "word replacement"
    }

    fn cost(&self) -> f32 {
        4.0
    }

    fn description(&self) -> &'static str {
        "replace a word when the replacement commonly appears in that context"
    }

    fn apply(&self, state: &State, context: &Context) -> HashSet<State> {
        framework::expand(state, context, &self.services, |focus| {
            self.successors_at(focus, state)
        })
    }
}

/// Deletes the focus word when its neighborhood is still a common phrase
/// without it.
pub struct WordRemoval {
    services: Arc<OperatorServices>,
    backend: Arc<dyn PhraseService>,
}

impl WordRemoval {
    pub fn new(services: Arc<OperatorServices>, backend: Arc<dyn PhraseService>) -> Self {
        Self { services, backend }
    }

    fn successors_at(&self, focus: &FocusPoint, state: &State) -> Vec<State> {
        let text = focus.text.as_str();
        let mut successors = Vec::new();

        for (words_before, words_after) in context_windows() {
            let (before, after) =
                parse_word_bounds(focus, words_before, words_after, &self.services);
            if before.is_empty() || after.len() < 2 {
                continue;
            }

            let query = build_query(text, &before, &after, None);
            let response =
                cached_search(&self.services, &*self.backend, &query, MAX_PHRASE_RESULTS);

            let (word_start, word_end) = after[0];
            for phrase in response.iter() {
                if phrase.frequency < MIN_PHRASE_FREQUENCY {
                    continue;
                }
                successors.extend(update_successor(state, focus, word_start, word_end, ""));
            }
        }

        successors
    }
}

impl Operator<State, Context> for WordRemoval {
    fn name(&self) -> &'static str {
        "word removal"
    }

    fn cost(&self) -> f32 {
        2.0
    }

    fn description(&self) -> &'static str {
        "delete a word from the text if it's not strictly needed in its context"
    }

    fn apply(&self, state: &State, context: &Context) -> HashSet<State> {
        framework::expand(state, context, &self.services, |focus| {
            self.successors_at(focus, state)
        })
    }
}

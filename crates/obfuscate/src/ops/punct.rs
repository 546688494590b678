//! Punctuation mapping operator.

use std::collections::HashSet;
use std::sync::Arc;

use rand::Rng;
use veil_core::ORDER;
use veil_search::{Operator, SearchState};

use crate::context::Context;
use crate::ops::framework::{self, update_successor};
use crate::services::OperatorServices;
use crate::state::State;

/// Punctuation variants: splitting a sentence where the author ran on, or
/// running on where the author split.
fn variants(byte: u8) -> Option<&'static [u8]> {
    match byte {
        b',' => Some(b";."),
        b'.' => Some(b",!"),
        b':' => Some(b".;"),
        b'!' => Some(b".,"),
        b'?' => Some(b"."),
        _ => None,
    }
}

/// Maps punctuation characters inside the focus n-gram to one of their
/// variants, chosen at random per eligible position.
pub struct PunctuationMap {
    services: Arc<OperatorServices>,
}

impl PunctuationMap {
    pub fn new(services: Arc<OperatorServices>) -> Self {
        Self { services }
    }
}

impl Operator<State, Context> for PunctuationMap {
    fn name(&self) -> &'static str {
        "punctuation mapping"
    }

    fn cost(&self) -> f32 {
        3.0
    }

    fn description(&self) -> &'static str {
        "map punctuation characters to their variants"
    }

    fn apply(&self, state: &State, context: &Context) -> HashSet<State> {
        let mut rng = self.services.rng_for(&state.key(), b"punct");

        framework::expand(state, context, &self.services, |focus| {
            let bytes = focus.text.as_bytes();
            let mut successors = Vec::new();

            for i in 0..ORDER {
                let pos = focus.offset + i;
                if pos >= bytes.len() {
                    break;
                }

                let Some(options) = variants(bytes[pos]) else {
                    continue;
                };
                let replacement = options[rng.random_range(0..options.len())] as char;

                successors.extend(update_successor(
                    state,
                    focus,
                    pos,
                    pos + 1,
                    &replacement.to_string(),
                ));
            }

            successors
        })
    }
}

//! Character flip operator.

use std::collections::HashSet;
use std::sync::Arc;

use veil_core::ORDER;
use veil_search::Operator;

use crate::context::Context;
use crate::ops::framework::{self, update_successor};
use crate::services::OperatorServices;
use crate::state::State;

/// Swaps adjacent character pairs inside the focus n-gram, one successor per
/// non-identity swap.
pub struct CharacterFlip {
    services: Arc<OperatorServices>,
}

impl CharacterFlip {
    pub fn new(services: Arc<OperatorServices>) -> Self {
        Self { services }
    }
}

impl Operator<State, Context> for CharacterFlip {
    fn name(&self) -> &'static str {
        "character flips"
    }

    fn cost(&self) -> f32 {
        30.0
    }

    fn description(&self) -> &'static str {
        "flip two neighboring characters"
    }

    fn apply(&self, state: &State, context: &Context) -> HashSet<State> {
        framework::expand(state, context, &self.services, |focus| {
            let bytes = focus.text.as_bytes();
            let mut successors = Vec::new();

            for i in 0..ORDER - 1 {
                let start = focus.offset + i;
                if start + 2 >= bytes.len() {
                    break;
                }

                if bytes[start] == bytes[start + 1] {
                    continue;
                }
                let swapped = [bytes[start + 1], bytes[start]];
                let Ok(swapped) = std::str::from_utf8(&swapped) else {
                    continue;
                };

                successors.extend(update_successor(state, focus, start, start + 2, swapped));
            }

            successors
        })
    }
}

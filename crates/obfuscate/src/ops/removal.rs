//! N-gram removal operator.

use std::collections::HashSet;
use std::sync::Arc;

use veil_core::ORDER;
use veil_search::Operator;

use crate::context::Context;
use crate::ops::framework::{self, update_successor};
use crate::services::OperatorServices;
use crate::state::State;

/// Deletes the focus n-gram from the text outright.
pub struct NgramRemoval {
    services: Arc<OperatorServices>,
}

impl NgramRemoval {
    pub fn new(services: Arc<OperatorServices>) -> Self {
        Self { services }
    }
}

impl Operator<State, Context> for NgramRemoval {
    fn name(&self) -> &'static str {
        "n-gram removal"
    }

    fn cost(&self) -> f32 {
        40.0
    }

    fn description(&self) -> &'static str {
        "delete n-grams from the text"
    }

    fn apply(&self, state: &State, context: &Context) -> HashSet<State> {
        framework::expand(state, context, &self.services, |focus| {
            update_successor(state, focus, focus.offset, focus.offset + ORDER, "")
                .into_iter()
                .collect()
        })
    }
}

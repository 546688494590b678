//! The set of already-expanded nodes.
//!
//! Full nodes are retained rather than bare keys so the ancestry of any
//! frontier node stays reachable for path reconstruction, at the price of
//! memory the overflow purge reclaims when needed.

use std::collections::HashMap;
use std::sync::Arc;

use crate::node::Node;
use crate::{SearchState, StateKey};

/// Map of expanded states to their nodes.
pub struct ClosedList<S: SearchState> {
    nodes: HashMap<StateKey, Arc<Node<S>>>,
}

impl<S: SearchState> Default for ClosedList<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SearchState> ClosedList<S> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
        }
    }

    /// Insert a node; returns false if its state was already present.
    pub fn put(&mut self, node: Arc<Node<S>>) -> bool {
        let key = node.state().key();
        match self.nodes.entry(key) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(node);
                true
            }
        }
    }

    /// Remove the node for `state`, if present.
    pub fn pop(&mut self, state: &S) -> Option<Arc<Node<S>>> {
        self.nodes.remove(&state.key())
    }

    /// Look up the node for `state`.
    pub fn get(&self, state: &S) -> Option<&Arc<Node<S>>> {
        self.nodes.get(&state.key())
    }

    /// Whether `state` has been expanded.
    pub fn contains(&self, state: &S) -> bool {
        self.nodes.contains_key(&state.key())
    }

    /// Number of expanded states.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no state has been expanded yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Rebuild the list to hold only the ancestors of the given nodes.
    ///
    /// The nodes themselves are not retained; they are expected to be on the
    /// frontier.
    pub fn retain_ancestors<'a, I>(&mut self, kept: I)
    where
        I: Iterator<Item = &'a Arc<Node<S>>>,
        S: 'a,
    {
        let mut retained = HashMap::new();
        for node in kept {
            let mut ancestor = node.parent().cloned();
            while let Some(current) = ancestor {
                retained.insert(current.state().key(), Arc::clone(&current));
                ancestor = current.parent().cloned();
            }
        }
        self.nodes = retained;
    }
}

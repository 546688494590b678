//! Search-space nodes.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// A node in the search graph: one state plus the A* bookkeeping around it.
///
/// Nodes are immutable once created, except for the heuristic cost, which the
/// driver sets after evaluating the node. Parents are shared; a node keeps
/// its whole ancestry alive for path reconstruction, and the chain is
/// reclaimed as soon as OPEN and CLOSED drop the last reference.
pub struct Node<S> {
    state: S,
    cost_g: f32,
    cost_h: AtomicU32,
    opcode: u8,
    parent: Option<Arc<Node<S>>>,
}

impl<S> Node<S> {
    /// Create a root node with zero costs and no parent.
    pub fn root(state: S) -> Self {
        Self {
            state,
            cost_g: 0.0,
            cost_h: AtomicU32::new(0f32.to_bits()),
            opcode: 0,
            parent: None,
        }
    }

    /// Create a successor of `parent` generated by operator `opcode` at cost
    /// `opcost`. The heuristic cost starts at zero until the driver sets it.
    pub fn successor(state: S, parent: &Arc<Node<S>>, opcode: u8, opcost: f32) -> Self {
        Self {
            state,
            cost_g: parent.cost_g + opcost,
            cost_h: AtomicU32::new(0f32.to_bits()),
            opcode,
            parent: Some(Arc::clone(parent)),
        }
    }

    /// The wrapped state.
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Index of the operator that generated this node.
    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    /// The parent node, if any.
    pub fn parent(&self) -> Option<&Arc<Node<S>>> {
        self.parent.as_ref()
    }

    /// Accumulated cost from the root.
    pub fn cost_g(&self) -> f32 {
        self.cost_g
    }

    /// Estimated remaining cost to a goal.
    pub fn cost_h(&self) -> f32 {
        f32::from_bits(self.cost_h.load(Ordering::Relaxed))
    }

    /// Set the heuristic cost. Called by the driver before the node enters
    /// the frontier.
    pub fn set_cost_h(&self, cost: f32) {
        self.cost_h.store(cost.to_bits(), Ordering::Relaxed);
    }

    /// Total estimated cost through this node.
    pub fn cost_f(&self) -> f32 {
        self.cost_g() + self.cost_h()
    }

    /// Length of the parent chain.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut parent = self.parent.as_ref();
        while let Some(node) = parent {
            parent = node.parent.as_ref();
            depth += 1;
        }
        depth
    }

    /// Operator indices applied along the path from the root to this node.
    pub fn opcodes_from_root(&self) -> Vec<u8> {
        let mut opcodes = vec![self.opcode];
        let mut parent = self.parent.as_ref();
        while let Some(node) = parent {
            opcodes.push(node.opcode);
            parent = node.parent.as_ref();
        }
        // The last entry belongs to the root, which no operator produced.
        opcodes.pop();
        opcodes.reverse();
        opcodes
    }
}

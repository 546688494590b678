//! Goal test for the obfuscation search.

use veil_search::Node;

use crate::context::Context;
use crate::heuristic::js_distance;
use crate::state::State;

/// A node is a goal once it has moved at least one edit away from the root
/// and its Jensen-Shannon distance from the target has reached the goal
/// distance. Unevaluated nodes (no recorded divergence) are never goals.
pub fn is_goal_state(node: &Node<State>, context: &Context) -> bool {
    let jsd = node.state().meta().jsd;
    let goal = context.meta().goal_js_dist;

    match (jsd, goal) {
        (Some(jsd), Some(goal)) => node.depth() > 0 && js_distance(jsd) >= goal,
        _ => false,
    }
}

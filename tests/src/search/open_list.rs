use std::sync::Arc;

use veil_search::{ClosedList, Node, OpenList};

use super::IntState;

/// A node with the given g; h is set separately where a test needs it.
fn node_with_g(value: u64, cost_g: f32) -> Arc<Node<IntState>> {
    if cost_g == 0.0 {
        Arc::new(Node::root(IntState(value)))
    } else {
        let parent = Arc::new(Node::root(IntState(u64::MAX - value)));
        Arc::new(Node::successor(IntState(value), &parent, 0, cost_g))
    }
}

#[test]
fn pops_in_ascending_f_order() {
    let mut open = OpenList::new();
    for (value, g) in [(1u64, 5.0f32), (2, 1.0), (3, 3.0)] {
        open.push_or_update(node_with_g(value, g));
    }

    let order: Vec<u64> = std::iter::from_fn(|| open.pop()).map(|n| n.state().0).collect();
    assert_eq!(order, vec![2, 3, 1]);
    assert!(open.is_empty());
}

#[test]
fn heuristic_counts_toward_the_order() {
    let mut open = OpenList::new();

    let cheap_g = node_with_g(1, 1.0);
    cheap_g.set_cost_h(10.0); // f = 11
    let expensive_g = node_with_g(2, 5.0);
    expensive_g.set_cost_h(1.0); // f = 6

    open.push_or_update(cheap_g);
    open.push_or_update(expensive_g);

    assert_eq!(open.pop().unwrap().state().0, 2);
    assert_eq!(open.pop().unwrap().state().0, 1);
}

#[test]
fn equal_f_breaks_ties_by_insertion_order() {
    let mut open = OpenList::new();
    open.push_or_update(node_with_g(10, 2.0));
    open.push_or_update(node_with_g(11, 2.0));
    open.push_or_update(node_with_g(12, 2.0));

    let order: Vec<u64> = std::iter::from_fn(|| open.pop()).map(|n| n.state().0).collect();
    assert_eq!(order, vec![10, 11, 12]);
}

#[test]
fn duplicate_states_keep_the_strictly_cheaper_node() {
    let mut open = OpenList::new();

    assert!(open.push_or_update(node_with_g(7, 5.0)));
    // Same state, higher g: ignored.
    assert!(!open.push_or_update(node_with_g(7, 9.0)));
    // Same state, strictly lower g: replaces the stored node.
    assert!(!open.push_or_update(node_with_g(7, 2.0)));

    assert_eq!(open.len(), 1);
    let popped = open.pop().unwrap();
    assert_eq!(popped.cost_g(), 2.0);
    assert!(open.pop().is_none(), "stale heap entries must not resurface");
}

#[test]
fn clear_retains_the_most_promising_nodes() {
    let mut open = OpenList::new();
    for value in 0..100u64 {
        open.push_or_update(node_with_g(value, value as f32));
    }

    open.clear(10);
    assert_eq!(open.len(), 10);

    let kept: Vec<u64> = std::iter::from_fn(|| open.pop()).map(|n| n.state().0).collect();
    assert_eq!(kept, (0..10).collect::<Vec<_>>());
}

#[test]
fn closed_list_reopen_and_ancestor_retention() {
    let root = Arc::new(Node::root(IntState(0)));
    let child = Arc::new(Node::successor(IntState(1), &root, 0, 1.0));
    let grandchild = Arc::new(Node::successor(IntState(2), &child, 0, 1.0));

    let mut closed = ClosedList::new();
    assert!(closed.put(Arc::clone(&root)));
    assert!(closed.put(Arc::clone(&child)));
    assert!(!closed.put(Arc::clone(&child)), "double insert is rejected");
    assert!(closed.contains(child.state()));

    // Reopen: remove the closed node, as the driver does for a cheaper path.
    let reopened = closed.pop(child.state()).unwrap();
    assert_eq!(reopened.state().0, 1);
    assert!(!closed.contains(child.state()));
    closed.put(Arc::clone(&child));

    // Retaining the ancestors of the frontier keeps the lineage only.
    let mut open = OpenList::new();
    open.push_or_update(Arc::clone(&grandchild));
    closed.retain_ancestors(open.iter());

    assert!(closed.contains(root.state()));
    assert!(closed.contains(child.state()));
    assert!(!closed.contains(grandchild.state()));
    assert_eq!(closed.len(), 2);
}

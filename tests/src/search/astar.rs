use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use veil_search::{astar_search, Node, Operator, Options, Status};

use super::IntState;

/// Options with the memory guard disabled, so runs on low-memory machines
/// cannot trip it mid-test.
fn options() -> Options {
    Options {
        free_memory_limit_in_mbytes: 0,
        ..Options::default()
    }
}

/// Counting context: the value a goal state must reach.
type Target = u64;

/// Increments the state by one; the only move in the toy search space.
struct Increment;

impl Operator<IntState, Target> for Increment {
    fn name(&self) -> &'static str {
        "increment"
    }

    fn cost(&self) -> f32 {
        1.0
    }

    fn apply(&self, state: &IntState, target: &Target) -> HashSet<IntState> {
        if state.0 >= *target + 100 {
            return HashSet::new();
        }
        HashSet::from([IntState(state.0 + 1)])
    }
}

/// Generates nothing, ever.
struct DeadEnd;

impl Operator<IntState, Target> for DeadEnd {
    fn name(&self) -> &'static str {
        "dead end"
    }

    fn cost(&self) -> f32 {
        1.0
    }

    fn apply(&self, _state: &IntState, _target: &Target) -> HashSet<IntState> {
        HashSet::new()
    }
}

fn counting_status(
    operators: Vec<Box<dyn Operator<IntState, Target>>>,
) -> Arc<Status<IntState, Target>> {
    let mut status = Status::new(
        Box::new(|node: &Node<IntState>, target: &Target| {
            (target.saturating_sub(node.state().0)) as f64
        }),
        Box::new(|node: &Node<IntState>, target: &Target| node.state().0 == *target),
    );
    status.set_operators(operators);
    Arc::new(status)
}

#[test]
fn finds_the_goal_along_the_cheapest_path() {
    let status = counting_status(vec![Box::new(Increment)]);
    status.set_current(&Arc::new(Node::root(IntState(0))), &5);

    astar_search(&status, |_| {}, options());

    assert!(status.finished.load(Ordering::Relaxed));
    assert!(status.has_goal_state.load(Ordering::Relaxed));
    assert!(status.error_message().is_none());

    let (goal, _) = status.current().unwrap();
    assert_eq!(goal.state().0, 5);
    assert_eq!(goal.depth(), 5);
    assert_eq!(goal.cost_g(), 5.0);
    assert_eq!(goal.opcodes_from_root(), vec![0, 0, 0, 0, 0]);

    // One goal check per popped state: 0 through 5.
    assert_eq!(status.num_goal_checks.load(Ordering::Relaxed), 6);
}

#[test]
fn empty_frontier_finishes_without_goal() {
    let status = counting_status(vec![Box::new(DeadEnd)]);
    status.set_current(&Arc::new(Node::root(IntState(0))), &5);

    astar_search(&status, |_| {}, options());

    assert!(status.finished.load(Ordering::Relaxed));
    assert!(!status.has_goal_state.load(Ordering::Relaxed));
    assert!(status.error_message().is_none());
    assert_eq!(status.size_of_open.load(Ordering::Relaxed), 0);
}

#[test]
fn caller_abort_is_honored_at_the_loop_boundary() {
    let status = counting_status(vec![Box::new(Increment)]);
    status.set_current(&Arc::new(Node::root(IntState(0))), &1_000_000);
    status.aborted_by_caller.store(true, Ordering::Relaxed);

    astar_search(&status, |_| {}, options());

    assert!(status.finished.load(Ordering::Relaxed));
    assert!(!status.has_goal_state.load(Ordering::Relaxed));
    // Only the root was goal-checked before the abort took effect.
    assert_eq!(status.num_goal_checks.load(Ordering::Relaxed), 1);
}

#[test]
fn callback_fires_at_the_configured_interval() {
    let status = counting_status(vec![Box::new(Increment)]);
    status.set_current(&Arc::new(Node::root(IntState(0))), &10);

    let mut callbacks = 0u64;
    astar_search(
        &status,
        |_| callbacks += 1,
        Options {
            status_update_interval: 1,
            free_memory_limit_in_mbytes: 0,
        },
    );

    // Fired on every pop: states 0..=10.
    assert_eq!(callbacks, 11);
}

#[test]
fn missing_initial_snapshot_is_a_recorded_error() {
    let status = counting_status(vec![Box::new(Increment)]);

    astar_search(&status, |_| {}, options());

    assert!(status.finished.load(Ordering::Relaxed));
    assert!(!status.has_goal_state.load(Ordering::Relaxed));
    assert!(status.error_message().is_some());
}

#[test]
fn panicking_operator_ends_the_search_gracefully() {
    struct Panics;
    impl Operator<IntState, Target> for Panics {
        fn name(&self) -> &'static str {
            "panics"
        }
        fn cost(&self) -> f32 {
            1.0
        }
        fn apply(&self, _state: &IntState, _target: &Target) -> HashSet<IntState> {
            panic!("operator exploded");
        }
    }

    let status = counting_status(vec![Box::new(Panics)]);
    status.set_current(&Arc::new(Node::root(IntState(0))), &5);

    astar_search(&status, |_| {}, options());

    assert!(status.finished.load(Ordering::Relaxed));
    assert!(!status.has_goal_state.load(Ordering::Relaxed));
    let message = status.error_message().expect("panic must be recorded");
    assert!(message.contains("operator exploded"));

    // Waiters are released even on failure.
    status.wait_for_completion();
}

#[test]
fn duplicate_successors_are_counted() {
    /// Two operators that generate the same successor.
    struct AlsoIncrement;
    impl Operator<IntState, Target> for AlsoIncrement {
        fn name(&self) -> &'static str {
            "also increment"
        }
        fn cost(&self) -> f32 {
            1.0
        }
        fn apply(&self, state: &IntState, target: &Target) -> HashSet<IntState> {
            Increment.apply(state, target)
        }
    }

    let status = counting_status(vec![Box::new(Increment), Box::new(AlsoIncrement)]);
    status.set_current(&Arc::new(Node::root(IntState(0))), &3);

    astar_search(&status, |_| {}, options());

    assert!(status.has_goal_state.load(Ordering::Relaxed));
    assert!(status.num_duplicated_states.load(Ordering::Relaxed) > 0);
    assert_eq!(status.num_operator_applications(), 6);
    assert!(status.num_generated_states() >= 6);
}

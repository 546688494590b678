use std::sync::Arc;

use veil_obfuscate::heuristic::{calculate_jsd, compute_cost_h, js_distance};
use veil_obfuscate::goal::is_goal_state;
use veil_obfuscate::{Context, State};
use veil_search::Node;

use super::{context_of, profile_of, state_of};

#[test]
fn jsd_of_a_profile_with_itself_is_exactly_zero() {
    let profile = profile_of("the quick brown fox jumps over the lazy dog");
    assert_eq!(calculate_jsd(&profile, &profile), 0.0);
}

#[test]
fn jsd_is_symmetric() {
    let left = profile_of("it was the best of times, it was the worst of times");
    let right = profile_of("call me ishmael. some years ago, never mind how long");

    let forward = calculate_jsd(&left, &right);
    let backward = calculate_jsd(&right, &left);
    assert!((forward - backward).abs() < 1e-12);
}

#[test]
fn jsd_stays_within_bounds() {
    let pairs = [
        ("aaaa bbbb cccc", "aaaa bbbb cccc dddd"),
        ("some shared words in here", "some shared words over there"),
        ("completely different content", "nothing alike whatsoever!!"),
    ];
    for (a, b) in pairs {
        let jsd = calculate_jsd(&profile_of(a), &profile_of(b));
        assert!((0.0..=1.0).contains(&jsd), "jsd {jsd} out of bounds");
    }
}

#[test]
fn disjoint_profiles_diverge_maximally() {
    let jsd = calculate_jsd(&profile_of("aaaa bbbb"), &profile_of("zzzz qqqq"));
    assert!((1.0 - jsd).abs() < 1e-9, "disjoint profiles must reach 1.0");
}

#[test]
fn js_distance_is_sqrt_of_twice_the_divergence() {
    assert_eq!(js_distance(0.0), 0.0);
    assert_eq!(js_distance(0.5), 1.0);
    assert!((js_distance(1.0) - std::f64::consts::SQRT_2).abs() < 1e-12);
}

#[test]
fn root_heuristic_is_zero_and_fixes_the_baseline() {
    let state = state_of("one the two the six the ten");
    let context = context_of("the the the the the");
    context.update_meta(|meta| meta.goal_js_dist = Some(0.5));

    let root = Node::root(state);
    let h = compute_cost_h(&root, &context);
    assert_eq!(h, 0.0, "no cost paid yet, so no cost-rate to extrapolate");

    let recorded = root.state().meta().jsd.expect("jsd must be recorded");
    assert!(recorded > 0.0);

    let baseline = context.meta().original_jsd.expect("baseline must be set");
    assert!(baseline <= recorded);
    assert!((recorded - baseline).abs() < 1e-9);
}

#[test]
fn identical_start_yields_zero_baseline() {
    let text = "aaaaaa";
    let state = state_of(text);
    let context = Context::new(state_profile(&state));
    context.update_meta(|meta| meta.goal_js_dist = Some(1.0));

    let root = Node::root(state);
    let h = compute_cost_h(&root, &context);
    assert_eq!(h, 0.0);
    assert!(root.state().meta().jsd.unwrap() < 1e-9);
    assert!(context.meta().original_jsd.unwrap() < 1e-9);
}

fn state_profile(state: &State) -> Arc<veil_core::NgramProfile> {
    Arc::clone(state.profile())
}

#[test]
fn goal_requires_depth_and_distance() {
    let state = state_of("one the two the six the ten");
    let context = context_of("the the the the the");
    context.update_meta(|meta| meta.goal_js_dist = Some(0.1));

    let root = Arc::new(Node::root(state.clone()));
    compute_cost_h(&root, &context);

    // The root is past the distance but at depth zero.
    assert!(js_distance(root.state().meta().jsd.unwrap()) >= 0.1);
    assert!(!is_goal_state(&root, &context));

    // A successor with the same (evaluated) state qualifies.
    let child = Node::successor(root.state().clone(), &root, 0, 1.0);
    assert!(is_goal_state(&child, &context));
}

#[test]
fn unevaluated_nodes_are_never_goals() {
    let state = state_of("one the two the six the ten");
    let context = context_of("the the the the the");
    context.update_meta(|meta| meta.goal_js_dist = Some(0.0));

    let root = Arc::new(Node::root(state.clone()));
    let child = Node::successor(state, &root, 0, 1.0);
    // No divergence recorded yet.
    assert!(!is_goal_state(&child, &context));
}

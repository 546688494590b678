//! The h(n) cost function: Jensen-Shannon divergence between a state's
//! n-gram distribution and the target, extrapolated into remaining cost.

use tracing::warn;
use veil_core::dekker::Dekker;
use veil_core::NgramProfile;
use veil_search::Node;

use crate::context::Context;
use crate::state::State;

/// log(exp(s1) + exp(s2)) for log-space probabilities.
#[inline]
fn log_add(s1: f64, s2: f64) -> f64 {
    s1 + (1.0 + (s2 - s1).exp()).ln()
}

/// Jensen-Shannon divergence between two n-gram profiles, in [0, 1].
///
/// Both profiles are walked in merged n-gram order; a key present in only one
/// profile contributes probability zero on the absent side, whose term is
/// omitted from its half of the sum. Terms are computed in log space (the
/// sentinel 1.0 marks an absent side, since real log-probabilities are never
/// positive) and accumulated with compensated summation; naive accumulation
/// visibly drifts above 1.0 on large profiles.
pub fn calculate_jsd(source: &NgramProfile, target: &NgramProfile) -> f64 {
    let p_norm = target.n() as f64;
    let q_norm = source.n() as f64;
    let mut p_iter = target.iter().peekable();
    let mut q_iter = source.iter().peekable();

    let log_half = 0.5f64.ln();
    let mut jsd_p = Dekker::default();
    let mut jsd_q = Dekker::default();

    loop {
        let p_pair = p_iter.peek().copied();
        let q_pair = q_iter.peek().copied();

        let mut p = 1.0;
        let mut q = 1.0;
        match (p_pair, q_pair) {
            (None, None) => break,
            (Some((_, p_count)), None) => {
                p = (p_count as f64).ln() - p_norm.ln();
                p_iter.next();
            }
            (None, Some((_, q_count))) => {
                q = (q_count as f64).ln() - q_norm.ln();
                q_iter.next();
            }
            (Some((p_key, p_count)), Some((q_key, q_count))) => {
                if p_key < q_key {
                    p = (p_count as f64).ln() - p_norm.ln();
                    p_iter.next();
                } else if p_key > q_key {
                    q = (q_count as f64).ln() - q_norm.ln();
                    q_iter.next();
                } else {
                    p = (p_count as f64).ln() - p_norm.ln();
                    q = (q_count as f64).ln() - q_norm.ln();
                    p_iter.next();
                    q_iter.next();
                }
            }
        }

        let m = if p <= 0.0 && q <= 0.0 {
            log_half + log_add(p, q)
        } else {
            log_half + p.min(q)
        };

        if p <= 0.0 {
            jsd_p += p.exp() * (p - m).exp().log2();
        }
        if q <= 0.0 {
            jsd_q += q.exp() * (q - m).exp().log2();
        }
    }

    0.5 * (jsd_p + jsd_q).value()
}

/// Jensen-Shannon distance derived from a divergence.
pub fn js_distance(jsd: f64) -> f64 {
    (2.0 * jsd).sqrt()
}

/// Compute h(n) for a node.
///
/// Side effects, all on the driver thread: the node's divergence is recorded
/// in its state meta, and the first evaluation of a run fixes the baseline
/// divergence in the context meta.
///
/// The estimate extrapolates linearly: the cost paid so far per unit of
/// distance travelled, times the distance still to travel. At the root no
/// cost has been paid, so h is zero and the root is always expanded; at or
/// past the goal the remaining distance is zero and goal states are cheap.
pub fn compute_cost_h(node: &Node<State>, context: &Context) -> f64 {
    let state = node.state();
    let mut jsd = calculate_jsd(state.profile(), &context.target_profile);

    if jsd > 1.0 {
        warn!(jsd, "numerical overflow in divergence, clamping to 1.0");
        jsd = 1.0;
    }
    state.set_jsd(jsd);

    let meta = context.meta();
    let original_jsd = match meta.original_jsd {
        Some(value) => value,
        None => {
            let value = (jsd - 1.0e-10).max(0.0);
            context.update_meta(|m| m.original_jsd = Some(value));
            value
        }
    };

    let distance = js_distance(jsd);
    let goal = meta
        .goal_js_dist
        .expect("goal distance must be set before the search starts");

    let cost_rate = node.cost_g() as f64 / (distance - js_distance(original_jsd)).max(1.0e-6);
    let remaining = (goal - distance).max(0.0);
    remaining * cost_rate
}

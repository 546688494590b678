//! The A* driver loop.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use rayon::prelude::*;
use tracing::debug;

use crate::closed_list::ClosedList;
use crate::node::Node;
use crate::open_list::OpenList;
use crate::status::Status;
use crate::SearchState;

/// Purge the frontier once it grows past this many states.
const OPEN_OVERFLOW_LIMIT: usize = 40_000;

/// Number of most promising frontier nodes surviving a purge.
const OPEN_OVERFLOW_KEEP: usize = 10;

/// Options for one search run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Refresh the snapshot and invoke the callback every n-th goal check.
    pub status_update_interval: u64,
    /// Abort the search if free system memory falls below this limit.
    pub free_memory_limit_in_mbytes: u64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            status_update_interval: 100,
            free_memory_limit_in_mbytes: 1000,
        }
    }
}

/// Apply every operator to `node` in parallel and wrap the generated states
/// in successor nodes. The per-operator result sets are deduplicated, but
/// different operators may still produce the same state; the main loop
/// handles those duplicates.
fn generate_successor_nodes<S, C>(
    status: &Status<S, C>,
    node: &Arc<Node<S>>,
    context: &C,
) -> Vec<Arc<Node<S>>>
where
    S: SearchState,
    C: Clone + Send + Sync,
{
    let results: Vec<_> = status
        .operators()
        .par_iter()
        .enumerate()
        .map(|(index, operator)| {
            let t0 = Instant::now();
            let states = operator.apply(node.state(), context);

            let stats = &status.operator_stats()[index];
            stats
                .runtime_in_micros
                .fetch_add(t0.elapsed().as_micros() as u64, Ordering::Relaxed);
            stats
                .num_generated_states
                .fetch_add(states.len() as u64, Ordering::Relaxed);
            stats.num_applications.fetch_add(1, Ordering::Relaxed);

            states
        })
        .collect();

    let mut new_nodes = Vec::new();
    for (index, states) in results.into_iter().enumerate() {
        let opcost = status.operators()[index].cost();
        // Set iteration order is arbitrary; sort by state key so expansion
        // order (and with it every tie-break downstream) is deterministic.
        let mut states: Vec<S> = states.into_iter().collect();
        states.sort_by_key(|state| state.key());
        for state in states {
            new_nodes.push(Arc::new(Node::successor(
                state,
                node,
                index as u8,
                opcost,
            )));
        }
    }
    new_nodes
}

fn run_search<S, C, F>(
    status: &Arc<Status<S, C>>,
    callback: &mut F,
    options: &Options,
) -> Result<(), String>
where
    S: SearchState,
    C: Clone + Send + Sync,
    F: FnMut(&Status<S, C>),
{
    let t0 = Instant::now();
    let update_interval = options.status_update_interval.max(1);
    debug!(
        workers = num_cpus::get(),
        "starting search with parallel expansion"
    );

    let (initial_node, context) = status
        .current()
        .ok_or_else(|| "no initial node and context set".to_string())?;

    let mut open = OpenList::new();
    let mut closed = ClosedList::new();

    // Rebuild the root from the snapshot state so it carries no stale
    // bookkeeping, then evaluate it.
    let mut node = Arc::new(Node::root(initial_node.state().clone()));
    node.set_cost_h(status.compute_cost_h(&node, &context) as f32);
    open.push_or_update(Arc::clone(&node));

    while let Some(popped) = open.pop() {
        node = popped;
        closed.put(Arc::clone(&node));

        status
            .size_of_open
            .store(open.len() as u64, Ordering::Relaxed);
        status
            .size_of_closed
            .store(closed.len() as u64, Ordering::Relaxed);

        if status.num_goal_checks.load(Ordering::Relaxed) % update_interval == 0 {
            status.set_current(&node, &context);
            status.record_memory_usage();
            status.record_runtime(t0);
            callback(status.as_ref());

            let free_limit_kb = options.free_memory_limit_in_mbytes * 1024;
            if status.free_memory_in_kbytes.load(Ordering::Relaxed) < free_limit_kb {
                debug!("free memory fell below {free_limit_kb} kB, aborting search");
                status.aborted_by_memguard.store(true, Ordering::Relaxed);
            }
        }

        status.num_goal_checks.fetch_add(1, Ordering::Relaxed);
        if status.is_goal_state(&node, &context) {
            status.has_goal_state.store(true, Ordering::Relaxed);
            break;
        }

        if status.aborted_by_memguard.load(Ordering::Relaxed)
            || status.aborted_by_caller.load(Ordering::Relaxed)
        {
            break;
        }

        let new_nodes = generate_successor_nodes(status, &node, &context);
        status.record_branching(new_nodes.len() as u64);

        for new_node in new_nodes {
            if let Some(closed_node) = closed.get(new_node.state()).cloned() {
                if new_node.cost_g() < closed_node.cost_g() {
                    closed.pop(new_node.state());
                    new_node.set_cost_h(status.compute_cost_h(&new_node, &context) as f32);
                    open.push_or_update(new_node);
                    status.num_reopened_states.fetch_add(1, Ordering::Relaxed);
                } else {
                    status.num_duplicated_states.fetch_add(1, Ordering::Relaxed);
                }
            } else {
                new_node.set_cost_h(status.compute_cost_h(&new_node, &context) as f32);
                if !open.push_or_update(new_node) {
                    status.num_duplicated_states.fetch_add(1, Ordering::Relaxed);
                } else if open.len() > OPEN_OVERFLOW_LIMIT {
                    // Aggressive reclamation: sacrifice completeness to
                    // survive memory pressure.
                    debug!(
                        open = open.len(),
                        closed = closed.len(),
                        "frontier overflow, purging"
                    );
                    open.clear(OPEN_OVERFLOW_KEEP);
                    closed.retain_ancestors(open.iter());
                }
            }
        }
    }

    status
        .size_of_open
        .store(open.len() as u64, Ordering::Relaxed);
    status
        .size_of_closed
        .store(closed.len() as u64, Ordering::Relaxed);
    status.set_current(&node, &context);
    status.record_memory_usage();
    status.record_runtime(t0);

    Ok(())
}

/// Run the A* search to completion on the calling thread.
///
/// The initial node and context must have been published on `status` via
/// [`Status::set_current`]. The callback fires on the driver thread every
/// `status_update_interval` goal checks, after the snapshot has been
/// refreshed. Whatever happens (goal, exhausted frontier, abort, memory
/// guard, or a panic during expansion), the status ends `finished` and
/// waiters are notified; panics are recorded as the error message.
pub fn astar_search<S, C, F>(status: &Arc<Status<S, C>>, mut callback: F, options: Options)
where
    S: SearchState,
    C: Clone + Send + Sync,
    F: FnMut(&Status<S, C>),
{
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        run_search(status, &mut callback, &options)
    }));

    match outcome {
        Ok(Ok(())) => {}
        Ok(Err(message)) => status.set_error_message(message),
        Err(payload) => {
            let message = payload
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
                .unwrap_or_else(|| "search panicked with a non-string payload".to_string());
            status.set_error_message(message);
        }
    }

    status.finished.store(true, Ordering::Relaxed);
    status.notify_finished();
}

/// Run the search on a detached thread; returns immediately.
///
/// Poll the shared status for progress and block on
/// [`Status::wait_for_completion`] for the result.
pub fn astar_search_async<S, C, F>(status: Arc<Status<S, C>>, callback: F, options: Options)
where
    S: SearchState,
    C: Clone + Send + Sync + 'static,
    F: FnMut(&Status<S, C>) + Send + 'static,
{
    std::thread::spawn(move || {
        astar_search(&status, callback, options);
    });
}

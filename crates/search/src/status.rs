//! Shared status of a running search.
//!
//! A status object is the central input and output parameter of the driver.
//! When the search runs on its own thread, the caller polls this object for
//! progress, flips the abort flag through it, and blocks on
//! [`wait_for_completion`]. Counters are atomic; the richer snapshot (current
//! node and context) sits behind a mutex and is refreshed at the callback
//! interval.
//!
//! [`wait_for_completion`]: Status::wait_for_completion

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Instant;

use crate::memory;
use crate::node::Node;
use crate::Operator;

/// Usage statistics for one operator, updated from worker threads.
#[derive(Debug, Default)]
pub struct OperatorStats {
    /// Number of times the operator was applied.
    pub num_applications: AtomicU64,
    /// Total number of successor states it generated.
    pub num_generated_states: AtomicU64,
    /// Accumulated wall-clock time spent inside it, in microseconds.
    pub runtime_in_micros: AtomicU64,
}

/// Heuristic cost function: estimated remaining cost of a node.
pub type CostFn<S, C> = Box<dyn Fn(&Node<S>, &C) -> f64 + Send + Sync>;

/// Goal predicate over nodes.
pub type GoalFn<S, C> = Box<dyn Fn(&Node<S>, &C) -> bool + Send + Sync>;

/// Central state of one search run.
pub struct Status<S, C> {
    /// The driver loop has exited (successfully or not).
    pub finished: AtomicBool,
    /// A goal state was reached.
    pub has_goal_state: AtomicBool,
    /// The caller requested an abort; honored at the next loop boundary.
    pub aborted_by_caller: AtomicBool,
    /// The memory guard tripped.
    pub aborted_by_memguard: AtomicBool,
    /// Wall-clock runtime of the search so far.
    pub runtime_in_millis: AtomicU64,
    /// Smallest observed branching factor.
    pub branching_factor_min: AtomicU64,
    /// Largest observed branching factor.
    pub branching_factor_max: AtomicU64,
    /// Process memory usage before the search started.
    pub init_memory_in_kbytes: AtomicU64,
    /// Process memory usage at the last sample.
    pub used_memory_in_kbytes: AtomicU64,
    /// Free system memory at the last sample.
    pub free_memory_in_kbytes: AtomicU64,
    /// Successors dropped because an equal-or-cheaper node already existed.
    pub num_duplicated_states: AtomicU64,
    /// Closed states moved back to the frontier on a cheaper path.
    pub num_reopened_states: AtomicU64,
    /// Nodes goal-tested so far.
    pub num_goal_checks: AtomicU64,
    /// Size of CLOSED at the last update.
    pub size_of_closed: AtomicU64,
    /// Size of OPEN at the last update.
    pub size_of_open: AtomicU64,

    operators: Vec<Box<dyn Operator<S, C>>>,
    operator_stats: Vec<OperatorStats>,

    compute_cost_h: CostFn<S, C>,
    is_goal_state: GoalFn<S, C>,

    snapshot: Mutex<Option<(Arc<Node<S>>, C)>>,
    error_message: Mutex<Option<String>>,
    done: Mutex<bool>,
    done_cond: Condvar,
}

impl<S, C: Clone> Status<S, C> {
    /// Create a status around the two search-defining functions.
    pub fn new(compute_cost_h: CostFn<S, C>, is_goal_state: GoalFn<S, C>) -> Self {
        Self {
            finished: AtomicBool::new(false),
            has_goal_state: AtomicBool::new(false),
            aborted_by_caller: AtomicBool::new(false),
            aborted_by_memguard: AtomicBool::new(false),
            runtime_in_millis: AtomicU64::new(0),
            branching_factor_min: AtomicU64::new(u64::MAX),
            branching_factor_max: AtomicU64::new(0),
            init_memory_in_kbytes: AtomicU64::new(0),
            used_memory_in_kbytes: AtomicU64::new(0),
            free_memory_in_kbytes: AtomicU64::new(0),
            num_duplicated_states: AtomicU64::new(0),
            num_reopened_states: AtomicU64::new(0),
            num_goal_checks: AtomicU64::new(0),
            size_of_closed: AtomicU64::new(0),
            size_of_open: AtomicU64::new(0),
            operators: Vec::new(),
            operator_stats: Vec::new(),
            compute_cost_h,
            is_goal_state,
            snapshot: Mutex::new(None),
            error_message: Mutex::new(None),
            done: Mutex::new(false),
            done_cond: Condvar::new(),
        }
    }

    /// Install the operator set; resets the per-operator statistics.
    pub fn set_operators(&mut self, operators: Vec<Box<dyn Operator<S, C>>>) {
        self.operator_stats = operators.iter().map(|_| OperatorStats::default()).collect();
        self.operators = operators;
    }

    /// The installed operators.
    pub fn operators(&self) -> &[Box<dyn Operator<S, C>>] {
        &self.operators
    }

    /// Per-operator usage statistics, index-aligned with the operators.
    pub fn operator_stats(&self) -> &[OperatorStats] {
        &self.operator_stats
    }

    /// Evaluate the heuristic for a node.
    pub fn compute_cost_h(&self, node: &Node<S>, context: &C) -> f64 {
        (self.compute_cost_h)(node, context)
    }

    /// Test whether a node is a goal.
    pub fn is_goal_state(&self, node: &Node<S>, context: &C) -> bool {
        (self.is_goal_state)(node, context)
    }

    /// Refresh the mutex-guarded snapshot of the current node and context.
    pub fn set_current(&self, node: &Arc<Node<S>>, context: &C) {
        *self.snapshot.lock().unwrap() = Some((Arc::clone(node), context.clone()));
    }

    /// The last published node and context snapshot.
    pub fn current(&self) -> Option<(Arc<Node<S>>, C)> {
        self.snapshot.lock().unwrap().clone()
    }

    /// Total successor states generated across all operators.
    pub fn num_generated_states(&self) -> u64 {
        self.operator_stats
            .iter()
            .map(|stats| stats.num_generated_states.load(Ordering::Relaxed))
            .sum()
    }

    /// Total operator applications across all operators.
    pub fn num_operator_applications(&self) -> u64 {
        self.operator_stats
            .iter()
            .map(|stats| stats.num_applications.load(Ordering::Relaxed))
            .sum()
    }

    /// Record a branching factor observation.
    pub fn record_branching(&self, num_branches: u64) {
        self.branching_factor_min
            .fetch_min(num_branches, Ordering::Relaxed);
        self.branching_factor_max
            .fetch_max(num_branches, Ordering::Relaxed);
    }

    /// Sample process and system memory into the counters.
    pub fn record_memory_usage(&self) {
        self.used_memory_in_kbytes
            .store(memory::used_memory_kb().unwrap_or(0), Ordering::Relaxed);
        self.free_memory_in_kbytes.store(
            memory::free_memory_kb().unwrap_or(u64::MAX),
            Ordering::Relaxed,
        );
    }

    /// Record the runtime since `t0`.
    pub fn record_runtime(&self, t0: Instant) {
        self.runtime_in_millis
            .store(t0.elapsed().as_millis() as u64, Ordering::Relaxed);
    }

    /// The error that ended the search, if any.
    pub fn error_message(&self) -> Option<String> {
        self.error_message.lock().unwrap().clone()
    }

    /// Record the error that ended the search.
    pub fn set_error_message(&self, message: String) {
        *self.error_message.lock().unwrap() = Some(message);
    }

    /// Wake everyone blocked on [`wait_for_completion`](Self::wait_for_completion).
    pub fn notify_finished(&self) {
        let mut done = self.done.lock().unwrap();
        *done = true;
        self.done_cond.notify_all();
    }

    /// Block until the search has finished.
    pub fn wait_for_completion(&self) {
        let mut done = self.done.lock().unwrap();
        while !*done {
            done = self.done_cond.wait(done).unwrap();
        }
    }
}

//! The obfuscation facade: wires states, context, heuristic and operators
//! into one search run.

use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::debug;
use veil_core::{GenerateFlags, NgramProfile, Seed};
use veil_search::{astar_search, memory, Node, Operator, Options, Status};

use crate::context::{goal_js_distance, Context};
use crate::goal::is_goal_state;
use crate::heuristic::{compute_cost_h, js_distance};
use crate::ops::{
    CharacterFlip, LexicalReplacement, NgramRemoval, PunctuationMap, WordRemoval, WordReplacement,
};
use crate::ops::phrase::PhraseService;
use crate::services::OperatorServices;
use crate::state::{State, StateMeta};

/// Configuration for one obfuscation run.
pub struct ObfuscatorConfig {
    /// Seed for all randomized decisions; a fresh run gets a random one.
    pub seed: Seed,
    /// Synonym dictionary file (tab-separated).
    pub synonym_dictionary: PathBuf,
    /// Hypernym dictionary file (tab-separated).
    pub hypernym_dictionary: PathBuf,
    /// Optional phrase-frequency backend enabling the word-level operators.
    pub phrase_service: Option<Arc<dyn PhraseService>>,
    /// Strip POS annotations from the input before profiling.
    pub strip_pos_annotations: bool,
    /// Override the goal distance instead of deriving it from input length.
    pub goal_js_distance: Option<f64>,
    /// Goal checks between progress callbacks.
    pub status_update_interval: u64,
    /// Free-memory floor below which the search aborts.
    pub free_memory_limit_in_mbytes: u64,
}

impl Default for ObfuscatorConfig {
    fn default() -> Self {
        Self {
            seed: Seed::generate(),
            synonym_dictionary: PathBuf::from("assets/synonym-dictionary.tsv"),
            hypernym_dictionary: PathBuf::from("assets/hypernym-dictionary.tsv"),
            phrase_service: None,
            strip_pos_annotations: false,
            goal_js_distance: None,
            status_update_interval: 500,
            free_memory_limit_in_mbytes: 2000,
        }
    }
}

impl ObfuscatorConfig {
    /// Create a config with a specific seed.
    pub fn with_seed(seed: Seed) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }
}

/// Snapshot delivered to the progress callback.
#[derive(Debug, Clone)]
pub struct Progress {
    /// Text of the node under expansion.
    pub text: String,
    /// Its divergence from the target profile.
    pub jsd: f64,
    /// Its Jensen-Shannon distance from the target profile.
    pub js_distance: f64,
    /// The distance the run is driving toward.
    pub goal_js_distance: f64,
    /// Edits between the root and this node.
    pub depth: usize,
    /// Accumulated cost from the root.
    pub cost_g: f32,
    /// Estimated remaining cost.
    pub cost_h: f32,
    /// Total estimated cost.
    pub cost_f: f32,
    /// Frontier size.
    pub open: u64,
    /// Expanded-set size.
    pub closed: u64,
    /// Duplicate successors seen so far.
    pub duplicated: u64,
    /// Closed states reopened so far.
    pub reopened: u64,
    /// Nodes goal-tested so far.
    pub goal_checks: u64,
    /// Wall-clock runtime so far.
    pub runtime_in_millis: u64,
    /// Process memory at the last sample.
    pub used_memory_in_kbytes: u64,
    /// This snapshot carries a new best divergence (or the goal state);
    /// stream its text to the output sink.
    pub improved: bool,
    /// The goal distance has been reached.
    pub reached_goal: bool,
}

/// Result of one obfuscation run.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// A goal state was reached.
    pub has_goal_state: bool,
    /// The memory guard ended the search.
    pub aborted_by_memguard: bool,
    /// The caller ended the search.
    pub aborted_by_caller: bool,
    /// Error that ended the search, if any.
    pub error_message: Option<String>,
    /// Text of the last expanded node, i.e. the goal state when one was
    /// reached.
    pub best_text: String,
    /// Divergence of that text from the target.
    pub jsd: f64,
    /// Jensen-Shannon distance of that text from the target.
    pub js_distance: f64,
    /// The goal distance of the run.
    pub goal_js_distance: f64,
    /// Nodes goal-tested over the whole run.
    pub num_goal_checks: u64,
}

/// Drives an A* search over candidate rewrites of one input text.
pub struct Obfuscator {
    config: ObfuscatorConfig,
}

impl Obfuscator {
    /// Create an obfuscator from a config.
    pub fn new(config: ObfuscatorConfig) -> Self {
        Self { config }
    }

    /// Rewrite `input` until its profile diverges from `target` by the goal
    /// distance, streaming progress through `on_progress`.
    ///
    /// The callback fires on the calling thread at the configured interval
    /// and once more when the search ends; snapshots flagged `improved`
    /// carry a new best rewrite. Search-level failures (memory guard, an
    /// operator panic) end the run gracefully and are reported in the
    /// [`Outcome`], not as errors; `Err` is reserved for inputs the search
    /// cannot start from.
    pub fn obfuscate(
        &self,
        input: &str,
        target: Arc<NgramProfile>,
        mut on_progress: impl FnMut(&Progress),
    ) -> veil_core::Result<Outcome> {
        let config = &self.config;
        let goal = config
            .goal_js_distance
            .unwrap_or_else(|| goal_js_distance(input.len()));

        let flags = GenerateFlags {
            skip_normalization: false,
            strip_pos_annotations: config.strip_pos_annotations,
        };
        let root_state = State::from_text(StateMeta::default(), input.to_string(), flags)?;

        let context = Context::new(target);
        context.update_meta(|meta| {
            meta.original_text_length = Some(input.len());
            meta.goal_js_dist = Some(goal);
        });

        let services = Arc::new(OperatorServices::new(config.seed.clone()));
        let mut operators: Vec<Box<dyn Operator<State, Context>>> = vec![
            Box::new(NgramRemoval::new(Arc::clone(&services))),
            Box::new(CharacterFlip::new(Arc::clone(&services))),
            Box::new(PunctuationMap::new(Arc::clone(&services))),
            Box::new(LexicalReplacement::synonyms(
                Arc::clone(&services),
                config.synonym_dictionary.clone(),
            )),
            Box::new(LexicalReplacement::hypernyms(
                Arc::clone(&services),
                config.hypernym_dictionary.clone(),
            )),
        ];
        if let Some(backend) = &config.phrase_service {
            operators.push(Box::new(WordReplacement::new(
                Arc::clone(&services),
                Arc::clone(backend),
            )));
            operators.push(Box::new(WordRemoval::new(
                Arc::clone(&services),
                Arc::clone(backend),
            )));
        }

        let mut status = Status::new(Box::new(compute_cost_h), Box::new(is_goal_state));
        status
            .init_memory_in_kbytes
            .store(memory::used_memory_kb().unwrap_or(0), Ordering::Relaxed);
        status.set_operators(operators);
        let status = Arc::new(status);
        status.set_current(&Arc::new(Node::root(root_state)), &context);

        let options = Options {
            status_update_interval: config.status_update_interval,
            free_memory_limit_in_mbytes: config.free_memory_limit_in_mbytes,
        };

        let mut best_jsd = 0.0f64;
        let mut emit = |status: &Status<State, Context>| {
            let Some((node, context)) = status.current() else {
                return;
            };
            let state = node.state();
            let jsd = state.meta().jsd.unwrap_or(0.0);
            let reached_goal = status.has_goal_state.load(Ordering::Relaxed);
            let improved = reached_goal || jsd > best_jsd;
            if jsd > best_jsd {
                best_jsd = jsd;
            }

            let progress = Progress {
                text: state.text().string(),
                jsd,
                js_distance: js_distance(jsd),
                goal_js_distance: context.meta().goal_js_dist.unwrap_or(goal),
                depth: node.depth(),
                cost_g: node.cost_g(),
                cost_h: node.cost_h(),
                cost_f: node.cost_f(),
                open: status.size_of_open.load(Ordering::Relaxed),
                closed: status.size_of_closed.load(Ordering::Relaxed),
                duplicated: status.num_duplicated_states.load(Ordering::Relaxed),
                reopened: status.num_reopened_states.load(Ordering::Relaxed),
                goal_checks: status.num_goal_checks.load(Ordering::Relaxed),
                runtime_in_millis: status.runtime_in_millis.load(Ordering::Relaxed),
                used_memory_in_kbytes: status.used_memory_in_kbytes.load(Ordering::Relaxed),
                improved,
                reached_goal,
            };
            debug!(
                depth = progress.depth,
                jsd = progress.jsd,
                js_distance = progress.js_distance,
                open = progress.open,
                closed = progress.closed,
                "search progress"
            );
            on_progress(&progress);
        };

        astar_search(&status, &mut emit, options);
        emit(&status);

        let (final_node, _) = status
            .current()
            .expect("search always leaves a final snapshot");
        let final_state = final_node.state();
        let jsd = final_state.meta().jsd.unwrap_or(0.0);

        Ok(Outcome {
            has_goal_state: status.has_goal_state.load(Ordering::Relaxed),
            aborted_by_memguard: status.aborted_by_memguard.load(Ordering::Relaxed),
            aborted_by_caller: status.aborted_by_caller.load(Ordering::Relaxed),
            error_message: status.error_message(),
            best_text: final_state.text().string(),
            jsd,
            js_distance: js_distance(jsd),
            goal_js_distance: goal,
            num_goal_checks: status.num_goal_checks.load(Ordering::Relaxed),
        })
    }
}

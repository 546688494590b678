//! The search context shared by all states of one run.

use std::sync::{Arc, Mutex};

use veil_core::NgramProfile;

/// Mutable context-wide scratch data, initialized on the first heuristic
/// evaluation. Driver thread only.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextMeta {
    /// Byte length of the unmodified input text.
    pub original_text_length: Option<usize>,
    /// Divergence of the unmodified input against the target, the baseline
    /// the distance travelled is measured from.
    pub original_jsd: Option<f64>,
    /// Goal Jensen-Shannon distance the search is driving toward.
    pub goal_js_dist: Option<f64>,
}

/// Global search context: the target profile plus shared goal parameters.
#[derive(Clone)]
pub struct Context {
    /// The profile the rewrite should diverge toward; read-only during the
    /// search and shared without locking.
    pub target_profile: Arc<NgramProfile>,
    meta: Arc<Mutex<ContextMeta>>,
}

impl Context {
    /// Create a context around a target profile.
    pub fn new(target_profile: Arc<NgramProfile>) -> Self {
        Self {
            target_profile,
            meta: Arc::new(Mutex::new(ContextMeta::default())),
        }
    }

    /// Snapshot of the shared scratch data.
    pub fn meta(&self) -> ContextMeta {
        *self.meta.lock().unwrap()
    }

    /// Mutate the shared scratch data. Driver thread only.
    pub fn update_meta(&self, f: impl FnOnce(&mut ContextMeta)) {
        f(&mut self.meta.lock().unwrap());
    }
}

/// Goal Jensen-Shannon distance as a function of input length.
///
/// The constants were fitted on the Gutenberg training corpus at the 0.7
/// obfuscation level: longer texts pin their author's fingerprint down more
/// firmly, so the required distance shrinks logarithmically with length.
pub fn goal_js_distance(text_len: usize) -> f64 {
    -0.10437 * (text_len as f64).log2() + 2.0831
}

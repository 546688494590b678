//! Search states over candidate rewrites.

use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use veil_core::{DiffString, GenerateFlags, NgramProfile};
use veil_search::{SearchState, StateKey};

/// Mutable per-state scratch data the heuristic writes into.
///
/// The cell is shared between a node and the status snapshots referencing it.
/// Only the driver thread writes it; worker threads never touch state meta.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateMeta {
    /// Jensen-Shannon divergence of this state against the target profile.
    pub jsd: Option<f64>,
}

/// One candidate rewrite: its text as a diff against the original, the
/// n-gram profile of that text, and the heuristic's scratch cell.
///
/// Equality and hashing go through the text, so two states produced by
/// different edit paths collapse once their texts agree.
#[derive(Clone)]
pub struct State {
    text: DiffString,
    profile: Arc<NgramProfile>,
    meta: Arc<Mutex<StateMeta>>,
}

impl State {
    /// Build a root state from raw input text.
    ///
    /// The text is normalized in place while its profile is generated, so the
    /// state's text is the normalized form.
    pub fn from_text(
        meta: StateMeta,
        mut text: String,
        flags: GenerateFlags,
    ) -> veil_core::Result<Self> {
        let profile = NgramProfile::generate_from_string(&mut text, flags)?;
        Ok(Self {
            text: DiffString::from(text),
            profile: Arc::new(profile),
            meta: Arc::new(Mutex::new(meta)),
        })
    }

    /// Build a successor state from an edited text and its pre-computed
    /// profile. `meta` is a snapshot of the parent's scratch data; the new
    /// state gets its own cell.
    pub fn with_profile(meta: StateMeta, text: DiffString, profile: Arc<NgramProfile>) -> Self {
        Self {
            text,
            profile,
            meta: Arc::new(Mutex::new(meta)),
        }
    }

    /// The state's text.
    pub fn text(&self) -> &DiffString {
        &self.text
    }

    /// The n-gram profile of the state's text.
    pub fn profile(&self) -> &Arc<NgramProfile> {
        &self.profile
    }

    /// Snapshot of the scratch data.
    pub fn meta(&self) -> StateMeta {
        *self.meta.lock().unwrap()
    }

    /// Record the state's divergence. Driver thread only.
    pub fn set_jsd(&self, jsd: f64) {
        self.meta.lock().unwrap().jsd = Some(jsd);
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl SearchState for State {
    fn key(&self) -> StateKey {
        self.text.hash_value()
    }
}

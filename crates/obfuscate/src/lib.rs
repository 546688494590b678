//! Author-style text obfuscation.
//!
//! The engine rewrites an input text through semantics-preserving edit
//! operators until its character n-gram distribution has diverged from a
//! target profile by a goal Jensen-Shannon distance, steering an A* search
//! by how much each candidate edit advances the divergence per unit of cost.

pub mod context;
pub mod goal;
pub mod heuristic;
pub mod obfuscator;
pub mod ops;
pub mod services;
pub mod state;

pub use context::{goal_js_distance, Context, ContextMeta};
pub use obfuscator::{Obfuscator, ObfuscatorConfig, Outcome, Progress};
pub use ops::phrase::{Phrase, PhraseService};
pub use services::OperatorServices;
pub use state::{State, StateMeta};

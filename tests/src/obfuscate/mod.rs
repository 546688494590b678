mod heuristic;
mod operators;

use std::sync::Arc;

use veil_core::{GenerateFlags, NgramProfile, Seed};
use veil_obfuscate::{Context, OperatorServices, State, StateMeta};

pub const TEST_SEED: &str = "0x1111111111111111111111111111111111111111111111111111111111111111";

/// A state over the raw (unnormalized) text.
pub fn state_of(text: &str) -> State {
    State::from_text(
        StateMeta::default(),
        text.to_string(),
        GenerateFlags {
            skip_normalization: true,
            ..Default::default()
        },
    )
    .unwrap()
}

/// A profile of the raw (unnormalized) text.
pub fn profile_of(text: &str) -> NgramProfile {
    let mut text = text.to_string();
    NgramProfile::generate_from_string(
        &mut text,
        GenerateFlags {
            skip_normalization: true,
            ..Default::default()
        },
    )
    .unwrap()
}

/// A context whose target is the profile of `text`.
pub fn context_of(text: &str) -> Context {
    Context::new(Arc::new(profile_of(text)))
}

/// Operator services with a fixed seed.
pub fn services() -> Arc<OperatorServices> {
    Arc::new(OperatorServices::new(Seed::from_hex(TEST_SEED).unwrap()))
}

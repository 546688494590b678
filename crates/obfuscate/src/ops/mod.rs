//! Edit operators and the shared machinery they are built on.
//!
//! Every operator follows the same policy: rank the state's n-grams by how
//! much removing them would push the distributions apart, pick focus points
//! on the top-ranked ones, generate successors at each focus point, and cap
//! the result set. The policy lives in [`framework`]; the operator modules
//! contribute only the per-focus-point edit.

pub mod dictionary;
pub mod flip;
pub mod framework;
pub mod lexical;
pub mod phrase;
pub mod punct;
pub mod removal;
pub mod words;

pub use flip::CharacterFlip;
pub use lexical::LexicalReplacement;
pub use phrase::{WordRemoval, WordReplacement};
pub use punct::PunctuationMap;
pub use removal::NgramRemoval;

//! A string that stores its edit history instead of its full current text.
//!
//! Search states share one immutable source string and differ only in their
//! edit logs, which keeps per-state memory bounded by the number of edits
//! rather than the text length. The materialized text is reconstructed on
//! demand by replaying the log; [`DiffString::apply`] trades that read cost
//! back for memory once the log grows long.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use md5::{Digest, Md5};

/// A single recorded string edit.
///
/// Positions refer to the text as it stands when the edit is applied, after
/// all earlier edits in the log. No bounds checks are performed; callers must
/// supply valid positions on character boundaries.
#[derive(Debug, Clone)]
pub struct Edit {
    /// Byte offset the edit starts at.
    pub pos: u32,
    /// Number of bytes to delete from `pos`.
    pub delete: u8,
    /// Replacement inserted at `pos`.
    pub insert: String,
}

impl Edit {
    /// Create a new edit record.
    pub fn new(pos: u32, delete: u8, insert: impl Into<String>) -> Self {
        Self {
            pos,
            delete,
            insert: insert.into(),
        }
    }
}

/// Immutable source string plus an append-only edit log.
///
/// Two diff-strings are equal iff their materialized texts are equal; the
/// hash is an MD5 digest of the materialized text, kept current on every
/// edit.
#[derive(Debug, Clone)]
pub struct DiffString {
    source: Arc<String>,
    edits: Vec<Edit>,
    hash: [u8; 16],
}

fn content_hash(text: &str) -> [u8; 16] {
    Md5::digest(text.as_bytes()).into()
}

impl DiffString {
    /// Wrap an existing shared source string.
    pub fn new(source: Arc<String>) -> Self {
        let hash = content_hash(&source);
        Self {
            source,
            edits: Vec::new(),
            hash,
        }
    }

    /// MD5 digest of the current materialized text.
    pub fn hash_value(&self) -> [u8; 16] {
        self.hash
    }

    /// Reconstruct the current text by replaying the edit log on the source.
    pub fn string(&self) -> String {
        let mut text = String::clone(&self.source);
        for edit in &self.edits {
            let start = edit.pos as usize;
            text.replace_range(start..start + edit.delete as usize, &edit.insert);
        }
        text
    }

    /// The shared, unedited source string.
    pub fn source(&self) -> &Arc<String> {
        &self.source
    }

    /// Number of edits in the log.
    pub fn log_size(&self) -> usize {
        self.edits.len()
    }

    /// Drop all edits and replace the source string.
    pub fn reset(&mut self, source: Arc<String>) {
        self.hash = content_hash(&source);
        self.source = source;
        self.edits.clear();
    }

    /// Append an edit, rehashing from a fresh materialization.
    ///
    /// This materializes the full text to compute the new hash; prefer
    /// [`edit_with_text`](Self::edit_with_text) when the edited text is
    /// already at hand.
    pub fn edit(&mut self, edit: Edit) {
        self.edits.push(edit);
        self.hash = content_hash(&self.string());
    }

    /// Append an edit, rehashing from the caller-supplied edited text.
    pub fn edit_with_text(&mut self, edit: Edit, text: &str) {
        self.edits.push(edit);
        self.hash = content_hash(text);
    }

    /// Materialize the current text into a new source and clear the log.
    pub fn apply(&mut self) {
        self.source = Arc::new(self.string());
        self.edits.clear();
        self.edits.shrink_to_fit();
    }
}

impl From<String> for DiffString {
    fn from(text: String) -> Self {
        Self::new(Arc::new(text))
    }
}

impl From<&str> for DiffString {
    fn from(text: &str) -> Self {
        Self::new(Arc::new(text.to_string()))
    }
}

impl PartialEq for DiffString {
    fn eq(&self, other: &Self) -> bool {
        self.string() == other.string()
    }
}

impl Eq for DiffString {}

impl Hash for DiffString {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(&self.hash);
    }
}

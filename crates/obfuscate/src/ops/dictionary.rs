//! Word-to-alternatives dictionaries.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::services::OperatorServices;

/// Lowercased word mapped to its replacement candidates.
pub type Dictionary = HashMap<String, Vec<String>>;

/// Load a dictionary file, memoized by path.
///
/// One entry per line, fields separated by `separator`: the key word
/// followed by its alternatives. Keys are lowercased; lines with fewer than
/// two fields are skipped. A file that cannot be read yields `None` and a
/// warning; the failure is not cached.
pub fn load_dictionary(
    services: &OperatorServices,
    path: &Path,
    separator: char,
) -> Option<Arc<Dictionary>> {
    if let Some(cached) = services.cached_dictionary(path) {
        return Some(cached);
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) => {
            warn!("could not open dictionary '{}': {error}", path.display());
            return None;
        }
    };

    let mut dictionary = Dictionary::new();
    for line in contents.lines() {
        let mut fields = line.split(separator);
        let Some(key) = fields.next() else {
            continue;
        };
        let alternatives: Vec<String> = fields.map(str::to_string).collect();
        if alternatives.is_empty() {
            continue;
        }
        dictionary.insert(key.to_lowercase(), alternatives);
    }

    let dictionary = Arc::new(dictionary);
    services.store_dictionary(path.to_path_buf(), Arc::clone(&dictionary));
    Some(dictionary)
}

//! Shared operator working data.
//!
//! The operators share a handful of caches: the per-state focus-point
//! selection, memoized word-bounds windows, loaded dictionaries and phrase
//! query results. Rather than living in process-wide singletons, they are
//! bundled into one service container handed to every operator at
//! construction time, which keeps the engine embeddable and the locking
//! visible. Each cache has its own mutex; operators running in parallel on
//! the worker pool contend only briefly per lookup.

use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use lru::LruCache;
use rand::rngs::StdRng;
use veil_core::Seed;
use veil_search::StateKey;

use crate::ops::dictionary::Dictionary;
use crate::ops::framework::CachedSelection;
use crate::ops::phrase::Phrase;
use crate::ops::words::WordBoundsPair;

/// Capacity of the per-state focus-point selection cache.
const SELECTION_CACHE_CAPACITY: usize = 200;

/// Capacity of the word-bounds memo.
const BOUNDS_CACHE_CAPACITY: usize = 500;

/// Capacity of the phrase-query cache.
const PHRASE_CACHE_CAPACITY: usize = 1000;

/// Cache key for a word-bounds lookup: the text's address, the focus offset
/// and the window extents. The address pins the entry to one materialized
/// text, mirroring the selection cache's lifetime.
pub type BoundsKey = (usize, usize, usize, usize);

/// Shared, mutex-guarded working data for the operator set.
pub struct OperatorServices {
    seed: Seed,
    selections: Mutex<LruCache<StateKey, CachedSelection>>,
    bounds: Mutex<LruCache<BoundsKey, WordBoundsPair>>,
    dictionaries: Mutex<HashMap<PathBuf, Arc<Dictionary>>>,
    phrases: Mutex<LruCache<(String, u32), Arc<Vec<Phrase>>>>,
}

impl OperatorServices {
    /// Create a fresh service container around a seed.
    pub fn new(seed: Seed) -> Self {
        Self {
            seed,
            selections: Mutex::new(LruCache::new(
                NonZeroUsize::new(SELECTION_CACHE_CAPACITY).unwrap(),
            )),
            bounds: Mutex::new(LruCache::new(
                NonZeroUsize::new(BOUNDS_CACHE_CAPACITY).unwrap(),
            )),
            dictionaries: Mutex::new(HashMap::new()),
            phrases: Mutex::new(LruCache::new(
                NonZeroUsize::new(PHRASE_CACHE_CAPACITY).unwrap(),
            )),
        }
    }

    /// The seed all randomized decisions derive from.
    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    /// A deterministic RNG scoped to a state plus a purpose tag.
    pub fn rng_for(&self, key: &StateKey, tag: &[u8]) -> StdRng {
        let mut context = Vec::with_capacity(key.len() + tag.len());
        context.extend_from_slice(key);
        context.extend_from_slice(tag);
        self.seed.derive_rng(&context)
    }

    /// Cached focus-point selection for a state.
    pub fn cached_selection(&self, key: &StateKey) -> Option<CachedSelection> {
        self.selections.lock().unwrap().get(key).cloned()
    }

    /// Store a focus-point selection for a state.
    pub fn store_selection(&self, key: StateKey, selection: CachedSelection) {
        self.selections.lock().unwrap().put(key, selection);
    }

    /// Memoized word bounds for a focus window.
    pub fn cached_bounds(&self, key: &BoundsKey) -> Option<WordBoundsPair> {
        self.bounds.lock().unwrap().get(key).cloned()
    }

    /// Memoize word bounds for a focus window.
    pub fn store_bounds(&self, key: BoundsKey, bounds: WordBoundsPair) {
        self.bounds.lock().unwrap().put(key, bounds);
    }

    /// A previously loaded dictionary, if any.
    pub fn cached_dictionary(&self, path: &Path) -> Option<Arc<Dictionary>> {
        self.dictionaries.lock().unwrap().get(path).cloned()
    }

    /// Remember a loaded dictionary by its path.
    pub fn store_dictionary(&self, path: PathBuf, dictionary: Arc<Dictionary>) {
        self.dictionaries.lock().unwrap().insert(path, dictionary);
    }

    /// Cached phrase-service response for a query.
    pub fn cached_phrases(&self, query: &str, max_results: u32) -> Option<Arc<Vec<Phrase>>> {
        self.phrases
            .lock()
            .unwrap()
            .get(&(query.to_string(), max_results))
            .cloned()
    }

    /// Cache a phrase-service response.
    pub fn store_phrases(&self, query: String, max_results: u32, phrases: Arc<Vec<Phrase>>) {
        self.phrases
            .lock()
            .unwrap()
            .put((query, max_results), phrases);
    }
}

//! Character n-gram profiles with incremental updates.
//!
//! A profile is an ordered multiset of fixed-order byte n-grams. It is split
//! into a shared *base* map and a small *pending* map of absolute-count
//! overrides so that a successor state in the search can be derived from its
//! parent by touching only the handful of n-grams an edit affects. The base
//! map is behind an [`Arc`]; cloning a profile shares it, and [`apply`]
//! rebuilds a private copy before folding the pending overrides in, so earlier
//! clones keep their snapshot.
//!
//! [`apply`]: NgramProfile::apply

use std::collections::BTreeMap;
use std::fs;
use std::io::BufWriter;
use std::iter::Peekable;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::normalize;
use crate::result::{Error, Result};

/// N-gram order: the byte window size used to profile text.
pub const ORDER: usize = 3;

/// A fixed-order byte n-gram, packed little-endian into an integer.
///
/// Packing makes n-grams cheap to hash, compare and order. Newline bytes are
/// folded to spaces before packing so that line breaks and spaces profile
/// identically.
pub type Ngram = u32;

/// A signed occurrence-count change for a single n-gram.
pub type NgramDelta = (Ngram, i64);

/// Fold the pending map into the base once it grows past this many entries.
const APPLY_THRESHOLD: usize = 150;

/// Bit-flag style options for profile generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateFlags {
    /// Skip text normalization altogether.
    pub skip_normalization: bool,
    /// Strip part-of-speech annotations from the text first.
    pub strip_pos_annotations: bool,
}

/// Pack an `ORDER`-byte window into an [`Ngram`], folding newlines to spaces.
pub fn ngram_from_window(window: &[u8]) -> Ngram {
    debug_assert_eq!(window.len(), ORDER);
    let mut buf = [0u8; 4];
    for (slot, &byte) in buf.iter_mut().zip(window) {
        *slot = if byte == b'\n' { b' ' } else { byte };
    }
    Ngram::from_le_bytes(buf)
}

/// Unpack an [`Ngram`] back into its `ORDER` bytes.
pub fn ngram_bytes(ngram: Ngram) -> [u8; ORDER] {
    let raw = ngram.to_le_bytes();
    let mut out = [0u8; ORDER];
    out.copy_from_slice(&raw[..ORDER]);
    out
}

/// Decompose a byte range into its n-grams.
///
/// Returns an empty vector if the range is shorter than [`ORDER`].
pub fn ngrams_from_range(range: &[u8]) -> Vec<Ngram> {
    range.windows(ORDER).map(ngram_from_window).collect()
}

/// Serialized form of a profile: the total plus the folded base map.
#[derive(Serialize, Deserialize)]
struct ProfileFile {
    n: u64,
    ngrams: BTreeMap<Ngram, u64>,
}

/// An n-gram occurrence profile.
///
/// Cloning is shallow: the base map is shared, the pending map is copied, and
/// the clone may be mutated independently thereafter.
#[derive(Debug, Clone, Default)]
pub struct NgramProfile {
    n: u64,
    size: u64,
    base: Arc<BTreeMap<Ngram, u64>>,
    pending: BTreeMap<Ngram, u64>,
    recent: Vec<NgramDelta>,
}

impl NgramProfile {
    /// Create an empty profile.
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a profile from a string, normalizing it in place first.
    ///
    /// Fails if the (normalized) text is shorter than [`ORDER`].
    pub fn generate_from_string(text: &mut String, flags: GenerateFlags) -> Result<Self> {
        if flags.strip_pos_annotations {
            normalize::strip_pos_annotations(text);
        }
        if !flags.skip_normalization {
            normalize::normalize_text(text);
        }

        let bytes = text.as_bytes();
        if bytes.len() < ORDER {
            return Err(Error::TextTooShort {
                len: bytes.len(),
                order: ORDER,
            });
        }

        let mut base = BTreeMap::new();
        let mut n = 0u64;
        for window in bytes.windows(ORDER) {
            *base.entry(ngram_from_window(window)).or_insert(0) += 1;
            n += 1;
        }

        Ok(Self {
            n,
            size: base.len() as u64,
            base: Arc::new(base),
            pending: BTreeMap::new(),
            recent: Vec::new(),
        })
    }

    /// Generate a profile from the concatenated contents of the given files.
    pub fn generate_from_files<P: AsRef<Path>>(paths: &[P], flags: GenerateFlags) -> Result<Self> {
        let mut full_text = String::new();
        for path in paths {
            let path = path.as_ref();
            let text = fs::read_to_string(path).map_err(|source| Error::FileRead {
                path: path.display().to_string(),
                source,
            })?;
            full_text.push_str(&text);
        }
        debug!(
            files = paths.len(),
            bytes = full_text.len(),
            "generating n-gram profile"
        );
        Self::generate_from_string(&mut full_text, flags)
    }

    /// Total number of n-gram occurrences in this profile.
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Number of unique n-grams with a non-zero effective count.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Absolute occurrence count for `ngram`; the pending override wins over
    /// the base value, zero means absent.
    pub fn freq(&self, ngram: Ngram) -> u64 {
        if let Some(&count) = self.pending.get(&ngram) {
            return count;
        }
        self.base.get(&ngram).copied().unwrap_or(0)
    }

    /// Normalized occurrence frequency for `ngram`.
    pub fn norm_freq(&self, ngram: Ngram) -> f32 {
        self.freq(ngram) as f32 / self.n as f32
    }

    /// Apply a series of signed count changes.
    ///
    /// N-grams not yet pending are first seeded from the base so the pending
    /// value stays an absolute count. The total and unique-count are
    /// maintained incrementally; once the pending map grows past the fold
    /// threshold it is applied automatically.
    pub fn update(&mut self, deltas: &[NgramDelta]) {
        self.recent.clear();

        for &(ngram, delta) in deltas {
            let seeded = self.base.get(&ngram).copied().unwrap_or(0);
            let entry = self.pending.entry(ngram).or_insert(seeded);
            let before = *entry;
            let after = before
                .checked_add_signed(delta)
                .expect("n-gram count went negative");
            *entry = after;

            if before == 0 && after > 0 {
                self.size += 1;
            } else if before > 0 && after == 0 {
                assert!(self.size > 0, "unique n-gram count went negative");
                self.size -= 1;
            }

            self.n = self
                .n
                .checked_add_signed(delta)
                .expect("n-gram total went negative");
            self.recent.push((ngram, delta));
        }

        if self.pending.len() > APPLY_THRESHOLD {
            self.apply();
        }
    }

    /// Update the profile from an edited window of its underlying text.
    ///
    /// `old` is the affected window of the unedited text, `new` the same
    /// window after the edit; old n-grams are decremented, new ones
    /// incremented.
    pub fn update_from_ranges(&mut self, old: &[u8], new: &[u8]) {
        let mut deltas = Vec::with_capacity(old.len() + new.len());
        deltas.extend(ngrams_from_range(old).into_iter().map(|g| (g, -1i64)));
        deltas.extend(ngrams_from_range(new).into_iter().map(|g| (g, 1i64)));
        self.update(&deltas);
    }

    /// Fold the pending overrides into a fresh base map and clear them.
    ///
    /// The previous base map is cloned before mutation, so profiles sharing
    /// it keep their snapshot.
    pub fn apply(&mut self) {
        let mut base = BTreeMap::clone(&self.base);
        for (ngram, count) in std::mem::take(&mut self.pending) {
            if count == 0 {
                base.remove(&ngram);
            } else {
                base.insert(ngram, count);
            }
        }
        self.base = Arc::new(base);
    }

    /// Number of pending overrides not yet folded into the base.
    pub fn log_size(&self) -> usize {
        self.pending.len()
    }

    /// The deltas applied by the most recent [`update`](Self::update) call.
    pub fn recent_updates(&self) -> &[NgramDelta] {
        &self.recent
    }

    /// Forget the recent-updates log.
    pub fn clear_recent_updates(&mut self) {
        self.recent.clear();
    }

    /// Serialize the profile (total plus folded base map) to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut copy = self.clone();
        copy.apply();

        let file = fs::File::create(path).map_err(|source| Error::FileWrite {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::to_writer(
            BufWriter::new(file),
            &ProfileFile {
                n: copy.n,
                ngrams: BTreeMap::clone(&copy.base),
            },
        )
        .map_err(Error::ProfileEncode)
    }

    /// Load a profile serialized with [`save`](Self::save).
    ///
    /// Iterating a loaded profile yields exactly the pairs of the saved one.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        let file: ProfileFile =
            serde_json::from_str(&text).map_err(|source| Error::ProfileParse {
                path: path.display().to_string(),
                source,
            })?;

        Ok(Self {
            n: file.n,
            size: file.ngrams.len() as u64,
            base: Arc::new(file.ngrams),
            pending: BTreeMap::new(),
            recent: Vec::new(),
        })
    }

    /// Merged iteration over base and pending in ascending n-gram order.
    ///
    /// Pending overrides win over base values; entries with an effective
    /// count of zero are skipped.
    pub fn iter(&self) -> ProfileIter<'_> {
        ProfileIter {
            base: self.base.iter().peekable(),
            pending: self.pending.iter().peekable(),
        }
    }
}

/// Ordered merged iterator over a profile's base and pending maps.
pub struct ProfileIter<'a> {
    base: Peekable<std::collections::btree_map::Iter<'a, Ngram, u64>>,
    pending: Peekable<std::collections::btree_map::Iter<'a, Ngram, u64>>,
}

impl Iterator for ProfileIter<'_> {
    type Item = (Ngram, u64);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match (self.base.peek().copied(), self.pending.peek().copied()) {
                (None, None) => return None,
                (Some((&ngram, &count)), None) => {
                    self.base.next();
                    return Some((ngram, count));
                }
                (None, Some((&ngram, &count))) => {
                    self.pending.next();
                    if count == 0 {
                        continue;
                    }
                    return Some((ngram, count));
                }
                (Some((&base_key, &base_count)), Some((&pend_key, &pend_count))) => {
                    if base_key < pend_key {
                        self.base.next();
                        return Some((base_key, base_count));
                    }
                    if pend_key < base_key {
                        self.pending.next();
                        if pend_count == 0 {
                            continue;
                        }
                        return Some((pend_key, pend_count));
                    }
                    // Same key: the pending value overrides the base.
                    self.base.next();
                    self.pending.next();
                    if pend_count == 0 {
                        continue;
                    }
                    return Some((pend_key, pend_count));
                }
            }
        }
    }
}

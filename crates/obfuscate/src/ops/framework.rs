//! The shared operator policy: n-gram ranking, focus-point selection,
//! successor capping and regression-filtered successor construction.

use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;

use rand::seq::SliceRandom;
use veil_core::profile::{ngram_bytes, Ngram, NgramProfile};
use veil_core::{Edit, ORDER};
use veil_search::SearchState;

use crate::context::Context;
use crate::services::OperatorServices;
use crate::state::State;

/// Number of top-ranked n-grams an operator works on.
pub const MAX_NGRAM_RANK: usize = 10;

/// Number of occurrences kept per selected n-gram.
pub const MAX_OCCURRENCES: usize = 2;

/// Cap on the successors one operator application may return.
pub const MAX_SUCCESSORS: usize = 6;

/// Compact a diff-string once its edit log grows past this many entries.
const COMPACT_THRESHOLD: usize = 150;

/// A position in the current text where an operator attempts an edit,
/// chosen to overlap a high-pressure n-gram.
pub struct FocusPoint {
    /// Byte offset of the n-gram of interest.
    pub offset: usize,
    /// The materialized text the offset refers to.
    pub text: Arc<String>,
}

/// An n-gram with its divergence pressure.
struct NgramRank {
    ngram: Ngram,
    rank: f32,
}

impl PartialEq for NgramRank {
    fn eq(&self, other: &Self) -> bool {
        self.rank == other.rank && self.ngram == other.ngram
    }
}

impl Eq for NgramRank {}

impl Ord for NgramRank {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank
            .total_cmp(&other.rank)
            .then_with(|| self.ngram.cmp(&other.ngram))
    }
}

impl PartialOrd for NgramRank {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Cached focus-point selection for one state: the n-gram positions worth
/// editing and the materialized text they index into. Shared across all
/// operators expanding the same state.
#[derive(Clone)]
pub struct CachedSelection {
    /// Byte offsets of selected n-gram occurrences, best-ranked first.
    pub positions: Arc<Vec<usize>>,
    /// The state's materialized text.
    pub text: Arc<String>,
}

/// Rank the source profile's n-grams by divergence pressure.
///
/// The pressure of an n-gram is the ratio of its target frequency to its
/// source frequency: the higher it is, the more an occurrence removed from
/// the source pushes the two distributions apart. N-grams occurring less
/// than twice, n-grams the target never uses, and n-grams whose reduction
/// would make the texts more similar (pressure below one) are discarded.
fn rank_ngrams(source: &NgramProfile, target: &NgramProfile) -> BinaryHeap<NgramRank> {
    let n = source.n() as f64;
    let mut ranked = BinaryHeap::new();

    for (ngram, count) in source.iter() {
        if count < 2 {
            continue;
        }

        let norm_q = count as f64 / n;
        let norm_p = target.norm_freq(ngram) as f64;
        if norm_p == 0.0 {
            continue;
        }

        let rank = (norm_p / norm_q) as f32;
        if rank < 1.0 {
            continue;
        }

        ranked.push(NgramRank { ngram, rank });
    }

    ranked
}

/// Select focus-point positions for a state, or fetch the cached selection.
///
/// The top [`MAX_NGRAM_RANK`] n-grams are located in the materialized text;
/// each one's occurrence list is shuffled and capped at [`MAX_OCCURRENCES`].
/// The shuffle RNG derives from the run seed and the state key, so a run is
/// reproducible end to end.
pub fn focus_points(
    state: &State,
    context: &Context,
    services: &OperatorServices,
) -> Option<CachedSelection> {
    let key = state.key();
    if let Some(cached) = services.cached_selection(&key) {
        return Some(cached);
    }

    let mut ranked = rank_ngrams(state.profile(), &context.target_profile);
    if ranked.is_empty() {
        return None;
    }

    let text = Arc::new(state.text().string());
    let bytes = text.as_bytes();
    let mut rng = services.rng_for(&key, b"focus");

    let mut positions = Vec::new();
    for _ in 0..MAX_NGRAM_RANK {
        let Some(ranked_ngram) = ranked.pop() else {
            break;
        };
        let pattern = ngram_bytes(ranked_ngram.ngram);

        let mut occurrences: Vec<usize> = bytes
            .windows(ORDER)
            .enumerate()
            .filter(|(_, window)| *window == pattern)
            .map(|(offset, _)| offset)
            .collect();
        occurrences.shuffle(&mut rng);
        occurrences.truncate(MAX_OCCURRENCES);
        positions.extend(occurrences);
    }

    let selection = CachedSelection {
        positions: Arc::new(positions),
        text,
    };
    services.store_selection(key, selection.clone());
    Some(selection)
}

/// Run the shared operator policy around a per-focus-point edit function.
pub fn expand(
    state: &State,
    context: &Context,
    services: &OperatorServices,
    mut apply_at: impl FnMut(&FocusPoint) -> Vec<State>,
) -> HashSet<State> {
    let Some(selection) = focus_points(state, context, services) else {
        return HashSet::new();
    };

    let mut successors = Vec::new();
    for &offset in selection.positions.iter() {
        let focus = FocusPoint {
            offset,
            text: Arc::clone(&selection.text),
        };
        successors.extend(apply_at(&focus));
    }

    if successors.len() > MAX_SUCCESSORS {
        let mut rng = services.rng_for(&state.key(), b"cap");
        successors.shuffle(&mut rng);
        successors.truncate(MAX_SUCCESSORS);
    }

    successors.into_iter().collect()
}

/// Snap a byte position down to the nearest character boundary.
fn snap_down(text: &str, mut pos: usize) -> usize {
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Snap a byte position up to the nearest character boundary.
fn snap_up(text: &str, mut pos: usize) -> usize {
    while !text.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}

/// Build a successor state for one edit, or reject the edit.
///
/// Replaces `[edit_start, edit_end)` of the focus text with `replacement`
/// and checks the edited neighborhood (edit range widened by one n-gram
/// order on both sides) for the focus n-gram: an edit whose neighborhood
/// still contains it has not made progress and is rejected. Edits that would
/// split a multi-byte character are rejected the same way.
///
/// On acceptance the parent's profile is shallow-cloned and updated from the
/// widened window alone, and the widened edit is appended to a copy of the
/// parent's diff-string; the profile is never regenerated from scratch.
pub fn update_successor(
    state: &State,
    focus: &FocusPoint,
    edit_start: usize,
    edit_end: usize,
    replacement: &str,
) -> Option<State> {
    let text = focus.text.as_str();
    let bytes = text.as_bytes();
    let orig_ngram = &bytes[focus.offset..focus.offset + ORDER];

    let mut edited = Vec::with_capacity(bytes.len() + replacement.len() - (edit_end - edit_start));
    edited.extend_from_slice(&bytes[..edit_start]);
    edited.extend_from_slice(replacement.as_bytes());
    edited.extend_from_slice(&bytes[edit_end..]);
    let edited = String::from_utf8(edited).ok()?;

    // Widen the edit by one n-gram order each way, on character boundaries.
    // Prefix and suffix bytes outside the edit are shared by both texts, so
    // equal extensions keep the two windows aligned.
    let old_begin = snap_down(text, edit_start.saturating_sub(ORDER));
    let old_end = snap_up(text, (edit_end + ORDER).min(bytes.len()));
    let suffix_extension = old_end - edit_end;
    let new_end = edit_start + replacement.len() + suffix_extension;

    let new_window = &edited.as_bytes()[old_begin..new_end];
    if new_window.windows(ORDER).any(|window| window == orig_ngram) {
        return None;
    }

    let mut profile = NgramProfile::clone(state.profile());
    profile.update_from_ranges(&bytes[old_begin..old_end], new_window);

    debug_assert!(old_end - old_begin <= u8::MAX as usize);
    let mut diff = state.text().clone();
    diff.edit_with_text(
        Edit::new(
            old_begin as u32,
            (old_end - old_begin) as u8,
            &edited[old_begin..new_end],
        ),
        &edited,
    );
    if diff.log_size() > COMPACT_THRESHOLD {
        diff.apply();
    }

    Some(State::with_profile(state.meta(), diff, Arc::new(profile)))
}

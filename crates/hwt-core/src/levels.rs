//! Decomposition level bookkeeping
//!
//! A signal of length `N` supports `L = log2(N)` Haar levels, and only when
//! `2^L == N` exactly. Every transform validates its length through here
//! before touching a buffer.

use crate::{HwtError, HwtResult};

/// Number of Haar levels for a signal of `len` samples, if `len` is a power of two
pub fn decomposition_levels(len: usize) -> Option<u32> {
    if len.is_power_of_two() {
        Some(len.trailing_zeros())
    } else {
        None
    }
}

/// Like [`decomposition_levels`] but reports a dimension error
pub fn require_levels(len: usize) -> HwtResult<u32> {
    decomposition_levels(len).ok_or(HwtError::NotPowerOfTwo { len })
}

/// Levels one dispatch can collapse given a program's maximum group size
///
/// A group of `G` threads owns `2G` samples and can therefore run
/// `log2(G) + 1` levels before it needs data from another group.
pub fn levels_per_dispatch(max_group_size: usize) -> u32 {
    if max_group_size == 0 {
        0
    } else {
        max_group_size.ilog2() + 1
    }
}

//! Ordering-priority sequence.
//!
//! `term(n) = floor((n + 1) / 2) * floor((n + 2) / 2)` for `n >= 1`, which
//! yields `1, 2, 4, 6, 9, 12, 16, 20, 25, ...`. The terms grow roughly
//! quadratically, so their inverses shrink fast enough that no sum of later
//! inverted terms outbids an earlier one.

/// The `n`-th term of the sequence, 1-indexed.
pub fn term(n: u64) -> u64 {
    debug_assert!(n >= 1, "sequence is 1-indexed");
    ((n + 1) / 2) * ((n + 2) / 2)
}

/// The first `count` terms.
pub fn terms(count: usize) -> impl Iterator<Item = u64> {
    (1..=count as u64).map(term)
}

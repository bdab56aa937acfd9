//! Debug-assertion macros for the bounded queue's invariants.
//!
//! Mirrors the testable properties enumerated for the queue: each macro here
//! is a zero-cost (in release builds) runtime check for one invariant, tagged
//! `INV-*` so a panicking assertion names exactly which property broke.

/// `0 <= count <= capacity` at all times.
///
/// Used in: `put`/`get` after mutating `items`.
macro_rules! debug_assert_bounded_count {
    ($count:expr, $capacity:expr) => {
        debug_assert!(
            $count <= $capacity,
            "INV-Q-01 violated: count {} exceeds capacity {}",
            $count,
            $capacity
        )
    };
}

/// Once `finished` is observed true, it never flips back to false.
///
/// Used in: `signal_finished`.
macro_rules! debug_assert_finished_monotonic {
    ($was:expr, $now:expr) => {
        debug_assert!(
            $now || !$was,
            "INV-Q-02 violated: finished flipped from true back to false"
        )
    };
}

/// `wait_finished` only returns once `finished && count == 0`.
///
/// Used in: `wait_finished`, right before returning.
macro_rules! debug_assert_drained {
    ($finished:expr, $count:expr) => {
        debug_assert!(
            $finished && $count == 0,
            "INV-Q-03 violated: wait_finished returned with finished={} count={}",
            $finished,
            $count
        )
    };
}

pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_drained;
pub(crate) use debug_assert_finished_monotonic;

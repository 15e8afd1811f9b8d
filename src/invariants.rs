//! Debug assertion macros for the queue's data-model invariants.
//!
//! Active only under `#[cfg(debug_assertions)]` (or the `strict-binding`
//! feature, for the context checks), so there is zero overhead in release
//! builds.

// =============================================================================
// INV-CNT-01: Bounded availability
// =============================================================================

/// Assert that used capacity never exceeds total capacity.
///
/// **Invariant**: `0 <= write_count - read_count <= capacity`
macro_rules! debug_assert_bounded_count {
    ($used:expr, $capacity:expr) => {
        debug_assert!(
            $used <= $capacity,
            "INV-CNT-01 violated: {} bytes in flight exceeds capacity {}",
            $used,
            $capacity
        )
    };
}

// =============================================================================
// INV-CNT-02: Monotonic counters
// =============================================================================

/// Assert that a counter only increases.
macro_rules! debug_assert_monotonic {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new >= $old,
            "INV-CNT-02 violated: {} decreased from {} to {}",
            $name,
            $old,
            $new
        )
    };
}

// =============================================================================
// INV-CNT-03: Read count never passes write count
// =============================================================================

/// Assert that the read side never advances past what has been published.
macro_rules! debug_assert_read_not_past_write {
    ($new_read:expr, $write:expr) => {
        debug_assert!(
            $new_read <= $write,
            "INV-CNT-03 violated: advancing read_count {} beyond write_count {}",
            $new_read,
            $write
        )
    };
}

// =============================================================================
// INV-CTX-01: Bound-context discipline
// =============================================================================

/// Assert that the calling thread matches an already-bound context.
///
/// Callers gate invocation on `cfg(any(debug_assertions, feature =
/// "strict-binding"))`, so this uses a real `assert!` rather than
/// `debug_assert!`: under `--release --features strict-binding` with
/// `debug_assertions` off, `debug_assert!` would silently compile away and
/// the feature would stop doing anything.
macro_rules! debug_assert_bound_context {
    ($side:literal, $bound:expr, $current:expr) => {
        assert!(
            $bound == $current,
            "INV-CTX-01 violated: {} accessed from a thread other than the one it was bound to",
            $side
        )
    };
}

pub(crate) use debug_assert_bound_context;
pub(crate) use debug_assert_bounded_count;
pub(crate) use debug_assert_monotonic;
pub(crate) use debug_assert_read_not_past_write;

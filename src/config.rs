use std::alloc::Layout;

/// Default storage alignment used when the caller does not specify one.
///
/// Stands in for C's `max_align_t`: the alignment most allocators guarantee
/// for any built-in type without being asked.
pub const DEFAULT_ALIGNMENT: usize = 16;

/// Cache-line size used to separate `write_count` from `read_count`.
///
/// A build-time parameter, not a runtime [`FifoConfig`] field: widen it with
/// the `wide-cache-line` feature for CPUs whose prefetcher pulls in adjacent
/// 64-byte lines.
#[cfg(not(feature = "wide-cache-line"))]
pub const CACHE_LINE_SIZE: usize = 64;
#[cfg(feature = "wide-cache-line")]
pub const CACHE_LINE_SIZE: usize = 128;

/// Allocation hook signature, substituting for the C library's
/// `SPSC_FIFO_ALLOC` macro.
///
/// # Safety
///
/// The returned pointer must be valid for `layout`, or null on failure.
pub type AllocHook = unsafe fn(Layout) -> *mut u8;

/// Deallocation hook signature, substituting for `SPSC_FIFO_FREE`.
///
/// # Safety
///
/// `ptr` must have been produced by the paired [`AllocHook`] with the same
/// `layout`.
pub type DeallocHook = unsafe fn(*mut u8, Layout);

/// Assertion hook signature, substituting for `SPSC_FIFO_ASSERT`.
///
/// Called with a human-readable message on contract violation instead of
/// panicking, when configured.
pub type AssertHook = fn(&str);

/// Build-time configuration for a [`crate::Fifo`].
///
/// Mirrors the options the C header exposes as preprocessor macros:
/// allocator hooks, assertion hook, and whether to pay for metrics
/// collection. Cache-line size and thread-safety debugging are true
/// compile-time choices (Cargo features), not fields here.
#[derive(Debug, Clone, Copy)]
pub struct FifoConfig {
    /// Storage buffer alignment. Must be a power of two.
    pub alignment: usize,
    /// Whether to maintain the atomic byte/event counters in [`crate::Metrics`].
    pub enable_metrics: bool,
    /// Custom allocation hook. `None` uses `std::alloc::alloc`.
    pub alloc_hook: Option<AllocHook>,
    /// Custom deallocation hook. `None` uses `std::alloc::dealloc`.
    pub dealloc_hook: Option<DeallocHook>,
    /// Custom assertion hook. `None` panics on contract violation.
    pub assert_hook: Option<AssertHook>,
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_ALIGNMENT,
            enable_metrics: false,
            alloc_hook: None,
            dealloc_hook: None,
            assert_hook: None,
        }
    }
}

impl FifoConfig {
    /// Creates a configuration with metrics collection enabled.
    pub fn with_metrics() -> Self {
        Self {
            enable_metrics: true,
            ..Self::default()
        }
    }

    /// Sets the storage alignment.
    pub fn with_alignment(mut self, alignment: usize) -> Self {
        self.alignment = alignment;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_alignment_is_power_of_two() {
        assert!(DEFAULT_ALIGNMENT.is_power_of_two());
    }

    #[test]
    fn with_metrics_enables_flag() {
        let cfg = FifoConfig::with_metrics();
        assert!(cfg.enable_metrics);
        assert_eq!(cfg.alignment, DEFAULT_ALIGNMENT);
    }
}

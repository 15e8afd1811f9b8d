use crate::config::FifoConfig;
use crate::error::FifoError;
use crate::handles::{Consumer, Producer};
use crate::invariants::{debug_assert_bounded_count, debug_assert_monotonic, debug_assert_read_not_past_write};
#[cfg(any(debug_assertions, feature = "strict-binding"))]
use crate::invariants::debug_assert_bound_context;
use crate::config::CACHE_LINE_SIZE;
use crate::metrics::Metrics;
use std::alloc::{self, Layout};
use std::cell::UnsafeCell;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// `write_count` and `read_count` are unbounded u64 byte counters, not wrapped
// storage indices — the storage index is only computed as `count & mask`
// when a slot is actually touched. At any realistic throughput, wrapping a
// u64 byte counter is not reachable in the lifetime of a process.
//
// Producer (write path):
//   1. Load `read_count` with Acquire — synchronizes with the consumer's
//      Release store, so free slots vacated by the consumer are visible.
//   2. Load `write_count` with Relaxed — only the producer writes it.
//   3. Copy bytes into storage (no ordering needed; guarded by the protocol).
//   4. Store `write_count` with Release — publishes the bytes to the consumer.
//
// Consumer (read path):
//   1. Load `write_count` with Acquire — synchronizes with the producer's
//      Release store, so the bytes about to be read are visible.
//   2. Load `read_count` with Relaxed — only the consumer writes it.
//   3. Copy bytes out of storage.
//   4. Store `read_count` with Release — publishes freed slots to the producer.
// =============================================================================

/// Shared core of a single-producer single-consumer byte queue.
///
/// Reached only through the [`Producer`] and [`Consumer`] handles returned
/// by [`Fifo::build`]; there is no public constructor for this type.
pub(crate) struct FifoCore {
    capacity: usize,
    mask: usize,
    write_count: CacheAligned<AtomicU64>,
    read_count: CacheAligned<AtomicU64>,
    storage: NonNull<u8>,
    layout: Layout,
    config: FifoConfig,
    metrics: Metrics,
    producer_ctx: UnsafeCell<Option<ThreadId>>,
    consumer_ctx: UnsafeCell<Option<ThreadId>>,
}

// SAFETY: `storage` is a raw allocation accessed only through the disjoint
// [read_count, write_count) / free-slot partition enforced by the
// acquire/release protocol on the two counters. `producer_ctx` is written
// only by producer call paths — either `Producer::bind`'s explicit rebind
// or `check_bound_context`'s implicit bind-on-first-use, both of which only
// ever run on the thread that currently owns the `Producer` handle —
// and read only from producer call paths; symmetrically for
// `consumer_ctx`. Both are single-writer, matching the same pattern
// lock-free SPSC ring implementations use for producer/consumer-local
// cached state.
unsafe impl Send for FifoCore {}
unsafe impl Sync for FifoCore {}

impl FifoCore {
    #[inline]
    fn storage_ptr(&self) -> *mut u8 {
        self.storage.as_ptr()
    }

    fn assert_producer_context(&self) {
        #[cfg(any(debug_assertions, feature = "strict-binding"))]
        self.check_bound_context(&self.producer_ctx, "producer");
    }

    fn assert_consumer_context(&self) {
        #[cfg(any(debug_assertions, feature = "strict-binding"))]
        self.check_bound_context(&self.consumer_ctx, "consumer");
    }

    /// Binds `ctx` to the calling thread if it is not yet bound ("implicitly
    /// on first use"); otherwise asserts the calling thread matches what it
    /// was already bound to.
    #[cfg(any(debug_assertions, feature = "strict-binding"))]
    fn check_bound_context(&self, ctx: &UnsafeCell<Option<ThreadId>>, side: &str) {
        let current = thread::current().id();
        // SAFETY: only the producer's own call paths touch `producer_ctx`
        // (symmetrically for `consumer_ctx` and the consumer), so this
        // read-then-maybe-write is single-writer, matching the Send/Sync
        // justification above.
        let bound = unsafe { *ctx.get() };
        match bound {
            None => unsafe { *ctx.get() = Some(current) },
            Some(bound) if bound != current => {
                if let Some(hook) = self.config.assert_hook {
                    hook("queue handle accessed from a thread other than the one it was bound to");
                } else {
                    debug_assert_bound_context!(side, bound, current);
                }
            }
            Some(_) => {}
        }
    }

    pub(crate) fn bind_producer(&self) {
        #[cfg(any(debug_assertions, feature = "strict-binding"))]
        unsafe {
            *self.producer_ctx.get() = Some(thread::current().id());
        }
    }

    pub(crate) fn bind_consumer(&self) {
        #[cfg(any(debug_assertions, feature = "strict-binding"))]
        unsafe {
            *self.consumer_ctx.get() = Some(thread::current().id());
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn metrics(&self) -> crate::metrics::MetricsSnapshot {
        self.metrics.snapshot()
    }

    // -------------------------------------------------------------------
    // Producer-side operations
    // -------------------------------------------------------------------

    pub(crate) fn write_avail(&self) -> usize {
        self.assert_producer_context();
        let read_count = self.read_count.load(Ordering::Acquire);
        let write_count = self.write_count.load(Ordering::Relaxed);
        self.capacity - write_count.wrapping_sub(read_count) as usize
    }

    pub(crate) fn is_full(&self) -> bool {
        self.write_avail() == 0
    }

    pub(crate) fn write(&self, src: &[u8]) -> usize {
        self.assert_producer_context();
        let read_count = self.read_count.load(Ordering::Acquire);
        let write_count = self.write_count.load(Ordering::Relaxed);
        let avail = self.capacity - write_count.wrapping_sub(read_count) as usize;
        let len = src.len().min(avail);
        if len == 0 {
            if self.config.enable_metrics {
                self.metrics.record_full();
            }
            return 0;
        }

        self.copy_in(write_count, &src[..len]);

        debug_assert_bounded_count!(len, self.capacity);
        let new_write_count = write_count.wrapping_add(len as u64);
        debug_assert_monotonic!("write_count", write_count, new_write_count);
        self.write_count.store(new_write_count, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_bytes_written(len as u64);
        }
        len
    }

    pub(crate) fn write_all(&self, src: &[u8]) -> bool {
        self.assert_producer_context();
        let len = src.len();
        let read_count = self.read_count.load(Ordering::Acquire);
        let write_count = self.write_count.load(Ordering::Relaxed);
        let avail = self.capacity - write_count.wrapping_sub(read_count) as usize;
        if len == 0 || len > avail {
            if self.config.enable_metrics && len > avail {
                self.metrics.record_full();
            }
            return false;
        }

        self.copy_in(write_count, src);

        let new_write_count = write_count.wrapping_add(len as u64);
        debug_assert_monotonic!("write_count", write_count, new_write_count);
        self.write_count.store(new_write_count, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_bytes_written(len as u64);
        }
        true
    }

    fn copy_in(&self, write_count: u64, src: &[u8]) {
        let idx = (write_count as usize) & self.mask;
        let first = src.len().min(self.capacity - idx);
        // SAFETY: idx is within [0, capacity). The slots [write_count,
        // write_count + src.len()) are free (checked by the caller against
        // write_avail), so only the producer touches them until this
        // function's Release store publishes them.
        unsafe {
            let base = self.storage_ptr();
            std::ptr::copy_nonoverlapping(src.as_ptr(), base.add(idx), first);
            if first < src.len() {
                std::ptr::copy_nonoverlapping(src[first..].as_ptr(), base, src.len() - first);
            }
        }
    }

    // -------------------------------------------------------------------
    // Consumer-side operations
    // -------------------------------------------------------------------

    pub(crate) fn read_avail(&self) -> usize {
        self.assert_consumer_context();
        let write_count = self.write_count.load(Ordering::Acquire);
        let read_count = self.read_count.load(Ordering::Relaxed);
        write_count.wrapping_sub(read_count) as usize
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.read_avail() == 0
    }

    pub(crate) fn read(&self, dst: &mut [u8]) -> usize {
        self.assert_consumer_context();
        let write_count = self.write_count.load(Ordering::Acquire);
        let read_count = self.read_count.load(Ordering::Relaxed);
        let avail = write_count.wrapping_sub(read_count) as usize;
        let len = dst.len().min(avail);
        if len == 0 {
            if self.config.enable_metrics {
                self.metrics.record_empty();
            }
            return 0;
        }

        self.copy_out(read_count, &mut dst[..len]);

        let new_read_count = read_count.wrapping_add(len as u64);
        debug_assert_read_not_past_write!(new_read_count, write_count);
        debug_assert_monotonic!("read_count", read_count, new_read_count);
        self.read_count.store(new_read_count, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_bytes_read(len as u64);
        }
        len
    }

    pub(crate) fn read_all(&self, dst: &mut [u8]) -> bool {
        self.assert_consumer_context();
        let len = dst.len();
        let write_count = self.write_count.load(Ordering::Acquire);
        let read_count = self.read_count.load(Ordering::Relaxed);
        let avail = write_count.wrapping_sub(read_count) as usize;
        if len == 0 || len > avail {
            if self.config.enable_metrics && len > avail {
                self.metrics.record_empty();
            }
            return false;
        }

        self.copy_out(read_count, dst);

        let new_read_count = read_count.wrapping_add(len as u64);
        debug_assert_read_not_past_write!(new_read_count, write_count);
        self.read_count.store(new_read_count, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_bytes_read(len as u64);
        }
        true
    }

    pub(crate) fn peek(&self, dst: &mut [u8]) -> usize {
        self.assert_consumer_context();
        let write_count = self.write_count.load(Ordering::Acquire);
        let read_count = self.read_count.load(Ordering::Relaxed);
        let avail = write_count.wrapping_sub(read_count) as usize;
        let len = dst.len().min(avail);
        if len == 0 {
            return 0;
        }
        self.copy_out(read_count, &mut dst[..len]);
        len
    }

    pub(crate) fn peek_all(&self, dst: &mut [u8]) -> bool {
        self.assert_consumer_context();
        let len = dst.len();
        let write_count = self.write_count.load(Ordering::Acquire);
        let read_count = self.read_count.load(Ordering::Relaxed);
        let avail = write_count.wrapping_sub(read_count) as usize;
        if len == 0 || len > avail {
            return false;
        }
        self.copy_out(read_count, dst);
        true
    }

    pub(crate) fn skip(&self, amount: usize) -> usize {
        self.assert_consumer_context();
        let write_count = self.write_count.load(Ordering::Acquire);
        let read_count = self.read_count.load(Ordering::Relaxed);
        let avail = write_count.wrapping_sub(read_count) as usize;
        let amount = amount.min(avail);
        if amount == 0 {
            return 0;
        }

        let new_read_count = read_count.wrapping_add(amount as u64);
        debug_assert_read_not_past_write!(new_read_count, write_count);
        self.read_count.store(new_read_count, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_bytes_read(amount as u64);
        }
        amount
    }

    pub(crate) fn skip_all(&self, amount: usize) -> bool {
        self.assert_consumer_context();
        let write_count = self.write_count.load(Ordering::Acquire);
        let read_count = self.read_count.load(Ordering::Relaxed);
        let avail = write_count.wrapping_sub(read_count) as usize;
        if amount == 0 || amount > avail {
            return false;
        }

        let new_read_count = read_count.wrapping_add(amount as u64);
        debug_assert_read_not_past_write!(new_read_count, write_count);
        self.read_count.store(new_read_count, Ordering::Release);

        if self.config.enable_metrics {
            self.metrics.add_bytes_read(amount as u64);
        }
        true
    }

    fn copy_out(&self, read_count: u64, dst: &mut [u8]) {
        let idx = (read_count as usize) & self.mask;
        let first = dst.len().min(self.capacity - idx);
        // SAFETY: idx is within [0, capacity). The slots [read_count,
        // read_count + dst.len()) were published by the producer's Release
        // store and observed by this function's Acquire load above.
        unsafe {
            let base = self.storage_ptr();
            std::ptr::copy_nonoverlapping(base.add(idx), dst.as_mut_ptr(), first);
            if first < dst.len() {
                std::ptr::copy_nonoverlapping(base, dst[first..].as_mut_ptr(), dst.len() - first);
            }
        }
    }

    pub(crate) fn reset(&self) {
        self.write_count.store(0, Ordering::Relaxed);
        self.read_count.store(0, Ordering::Relaxed);
    }
}

impl Drop for FifoCore {
    fn drop(&mut self) {
        // SAFETY: `storage`/`layout` were produced together either by
        // `config.alloc_hook` or `std::alloc::alloc`, and are released
        // exactly once here, when the last handle referencing this core
        // (Producer or Consumer, via Arc) is dropped.
        unsafe {
            if let Some(hook) = self.config.dealloc_hook {
                hook(self.storage.as_ptr(), self.layout);
            } else {
                alloc::dealloc(self.storage.as_ptr(), self.layout);
            }
        }
    }
}

/// Entry point for constructing a queue.
///
/// There is no standalone `Fifo` value: construction directly returns the
/// split [`Producer`]/[`Consumer`] handles (Design Notes, "Split ownership
/// as two handles"), so single-producer/single-consumer misuse across
/// those two roles is a type distinction rather than a runtime discipline.
pub struct Fifo;

impl Fifo {
    /// Allocates a queue with at least `min_capacity` bytes of storage.
    ///
    /// `min_capacity` is rounded up to the next power of two (left
    /// unchanged if it already is one). `config.alignment` must be a power
    /// of two or this returns [`FifoError::InvalidArgument`]; allocation
    /// failure returns [`FifoError::OutOfMemory`].
    pub fn build(min_capacity: usize, config: FifoConfig) -> Result<(Producer, Consumer), FifoError> {
        let alignment = config.alignment;
        if !alignment.is_power_of_two() {
            return Err(FifoError::InvalidArgument(alignment));
        }

        let capacity = min_capacity.max(1).next_power_of_two();
        let layout = Layout::from_size_align(capacity, alignment)
            .map_err(|_| FifoError::InvalidArgument(alignment))?;

        // SAFETY: `layout` has non-zero size (capacity >= 1) and a valid
        // power-of-two alignment, checked above.
        let ptr = unsafe {
            if let Some(hook) = config.alloc_hook {
                hook(layout)
            } else {
                alloc::alloc(layout)
            }
        };
        let storage = NonNull::new(ptr).ok_or(FifoError::OutOfMemory {
            size: capacity,
            align: alignment,
        })?;

        let core = Arc::new(FifoCore {
            capacity,
            mask: capacity - 1,
            write_count: CacheAligned::new(AtomicU64::new(0)),
            read_count: CacheAligned::new(AtomicU64::new(0)),
            storage,
            layout,
            config,
            metrics: Metrics::new(),
            producer_ctx: UnsafeCell::new(None),
            consumer_ctx: UnsafeCell::new(None),
        });

        Ok((Producer::new(Arc::clone(&core)), Consumer::new(core)))
    }

    /// Resets both counters to zero without reallocating.
    ///
    /// Takes both handles by value and hands them back, so a caller cannot
    /// call this while a producer or consumer operation could still be
    /// mid-flight on another thread (spec: "not safe to call while either
    /// side is operating").
    pub fn reset(producer: Producer, consumer: Consumer) -> (Producer, Consumer) {
        producer.core().reset();
        (producer, consumer)
    }
}

/// Wrapper that pads `T` out to [`CACHE_LINE_SIZE`] bytes, so
/// `write_count` and `read_count` never share a cache line with each
/// other or with anything else in [`FifoCore`].
#[cfg_attr(not(feature = "wide-cache-line"), repr(align(64)))]
#[cfg_attr(feature = "wide-cache-line", repr(align(128)))]
struct CacheAligned<T> {
    value: T,
}

impl<T> CacheAligned<T> {
    const fn new(value: T) -> Self {
        // A future CACHE_LINE_SIZE value not mirrored by the repr(align)
        // attributes above would silently stop padding; this keeps them honest.
        const _: () = assert!(CACHE_LINE_SIZE == 64 || CACHE_LINE_SIZE == 128);
        Self { value }
    }
}

impl<T> std::ops::Deref for CacheAligned<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FifoConfig;

    #[test]
    fn rounds_capacity_up_to_power_of_two() {
        let (producer, _consumer) = Fifo::build(5, FifoConfig::default()).unwrap();
        assert_eq!(producer.capacity(), 8);
    }

    #[test]
    fn exact_power_of_two_is_unchanged() {
        let (producer, _consumer) = Fifo::build(16, FifoConfig::default()).unwrap();
        assert_eq!(producer.capacity(), 16);
    }

    #[test]
    fn rejects_non_power_of_two_alignment() {
        let config = FifoConfig::default().with_alignment(3);
        let err = Fifo::build(16, config).unwrap_err();
        assert!(matches!(err, FifoError::InvalidArgument(3)));
    }

    #[test]
    fn basic_round_trip() {
        let (producer, consumer) = Fifo::build(8, FifoConfig::default()).unwrap();
        assert!(producer.write_all(b"ABCD"));
        assert_eq!(consumer.read_avail(), 4);
        let mut dst = [0u8; 4];
        assert!(consumer.read_all(&mut dst));
        assert_eq!(&dst, b"ABCD");
        assert!(consumer.is_empty());
    }

    #[test]
    fn wrap_around_preserves_byte_order() {
        let (producer, consumer) = Fifo::build(4, FifoConfig::default()).unwrap();
        assert!(producer.write_all(b"AB"));
        let mut tmp = [0u8; 2];
        assert!(consumer.read_all(&mut tmp));
        assert_eq!(&tmp, b"AB");

        assert!(producer.write_all(b"CDEF"));
        let mut dst = [0u8; 4];
        assert!(consumer.read_all(&mut dst));
        assert_eq!(&dst, b"CDEF");
    }

    #[test]
    fn reset_returns_to_empty() {
        let (producer, consumer) = Fifo::build(8, FifoConfig::default()).unwrap();
        producer.write_all(b"AB");
        let (producer, consumer) = Fifo::reset(producer, consumer);
        assert!(consumer.is_empty());
        assert_eq!(producer.write_avail(), 8);
    }
}

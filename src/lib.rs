//! spsc-fifo-rs - Lock-Free Single-Producer Single-Consumer Byte Queue
//!
//! A byte-oriented ring buffer for exactly one producing thread and one
//! consuming thread to exchange a stream of bytes through a shared
//! fixed-capacity circular storage, with no internal locking and no
//! internal blocking.
//!
//! # Key properties
//!
//! - Power-of-two capacity, rounded up from the requested minimum.
//! - Two monotonic `u64` byte counters (`write_count`, `read_count`),
//!   cache-line separated, coordinated with acquire/release ordering.
//! - Best-effort (`write`/`read`/`skip`) and all-or-nothing
//!   (`write_all`/`read_all`/`skip_all`) operation families, plus
//!   non-destructive `peek`/`peek_all`.
//! - Split ownership: construction returns a [`Producer`] and a
//!   [`Consumer`] handle, each exposing only its side's operations.
//! - Never spins, sleeps, or blocks; callers own their own backoff
//!   strategy (see [`Backoff`]).
//!
//! # Example
//!
//! ```
//! use spsc_fifo_rs::{Fifo, FifoConfig};
//!
//! let (producer, consumer) = Fifo::build(64, FifoConfig::default()).unwrap();
//!
//! assert!(producer.write_all(b"hello"));
//! assert_eq!(consumer.read_avail(), 5);
//!
//! let mut buf = [0u8; 5];
//! assert!(consumer.read_all(&mut buf));
//! assert_eq!(&buf, b"hello");
//! assert!(consumer.is_empty());
//! ```

mod backoff;
mod config;
mod error;
mod handles;
mod invariants;
mod metrics;
mod record;
mod ring;

pub use backoff::Backoff;
pub use config::{AllocHook, AssertHook, DeallocHook, FifoConfig, CACHE_LINE_SIZE, DEFAULT_ALIGNMENT};
pub use error::FifoError;
pub use handles::{Consumer, Producer};
pub use metrics::{Metrics, MetricsSnapshot};
pub use ring::Fifo;

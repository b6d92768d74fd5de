//! Loghive - Pipeline
//!
//! The concurrent core of the collector: a bounded multi-producer /
//! single-consumer ring buffer, the consumer thread that drains it, and the
//! batch accumulator with its periodic flush timer.
//!
//! # Architecture
//!
//! ```text
//! [HTTP realtime] ──┐
//!                   ├──> RingBuffer ──> consumer thread ──> RecordSink (per record)
//! [bulk import] ────┘        (MPSC,                    └──> BatchAccumulator (policy)
//!                      blocking backpressure)                    │ threshold / 10s timer
//!                                                                v
//!                                                          RecordSink (batch)
//! ```
//!
//! # Key Design
//!
//! - **Blocking backpressure**: producers wait on a full buffer, records are
//!   never dropped.
//! - **Single consumer**: enforced at the type level; `RingConsumer` is not
//!   clonable and `pop` takes `&mut self`.
//! - **Sequence-ordered slots**: each slot carries an atomic sequence stamp,
//!   publish is a single release store.
//! - **Cooperative shutdown**: the [`Shutdown`] primitive interrupts timed
//!   waits (flush timer, import backoff) deterministically.

mod batch;
mod consumer;
mod dispatch;
mod error;
mod ring;
mod shutdown;

pub use batch::{BatchAccumulator, FlushTimer};
pub use consumer::Consumer;
pub use dispatch::{Dispatch, DispatchError, RecordSink};
pub use error::{PipelineError, Result};
pub use ring::{ring, RingConsumer, RingProducer};
pub use shutdown::Shutdown;

/// Default ring buffer capacity (power of two, sized to absorb bursts)
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

/// Batch accumulator flush threshold
pub const BATCH_FLUSH_THRESHOLD: usize = 5;

/// Batch accumulator flush period
pub const BATCH_FLUSH_INTERVAL: std::time::Duration = std::time::Duration::from_secs(10);

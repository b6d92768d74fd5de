//! Bounded MPSC ring buffer with blocking backpressure
//!
//! Pre-allocated slots cycle through free -> writing -> published -> free,
//! driven by a monotonically increasing claim sequence. Producers claim a
//! slot with a CAS, copy the record in, then publish it with a single
//! release store; the consumer observes slots strictly in sequence order.
//!
//! Producers block (never drop) while the buffer is full. The consumer
//! blocks while the buffer is empty. Both waits use one condvar gate so the
//! hot path stays lock-free.

use std::cell::UnsafeCell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::error::{PipelineError, Result};

/// Create a bounded ring buffer with the given capacity
///
/// The producer handle is cheap to clone and can be shared across any number
/// of threads; the consumer handle is unique, enforcing the single-consumer
/// contract at the type level.
///
/// # Panics
///
/// Panics if `capacity` is zero or not a power of two.
pub fn ring<T: Send>(capacity: usize) -> (RingProducer<T>, RingConsumer<T>) {
    assert!(
        capacity >= 2 && capacity.is_power_of_two(),
        "ring capacity must be a power of two, got {capacity}"
    );

    let slots = (0..capacity)
        .map(|seq| Slot {
            sequence: AtomicUsize::new(seq),
            value: UnsafeCell::new(None),
        })
        .collect::<Vec<_>>()
        .into_boxed_slice();

    let shared = Arc::new(Shared {
        slots,
        mask: capacity - 1,
        claim: AtomicUsize::new(0),
        closed: AtomicBool::new(false),
        gate: Mutex::new(()),
        not_full: Condvar::new(),
        not_empty: Condvar::new(),
    });

    (
        RingProducer {
            shared: Arc::clone(&shared),
        },
        RingConsumer { shared, next: 0 },
    )
}

/// One pre-allocated storage cell
///
/// `sequence` encodes the slot state for the current lap:
/// - `sequence == pos`      : free, claimable by the producer at `pos`
/// - `sequence == pos + 1`  : published, readable by the consumer at `pos`
/// - anything else          : owned by another lap
struct Slot<T> {
    sequence: AtomicUsize,
    value: UnsafeCell<Option<T>>,
}

struct Shared<T> {
    slots: Box<[Slot<T>]>,
    mask: usize,

    /// Next sequence number handed to producers
    claim: AtomicUsize,

    closed: AtomicBool,

    /// Guards only the condvar waits, never the slot data
    gate: Mutex<()>,
    not_full: Condvar,
    not_empty: Condvar,
}

// Slots are only ever accessed by the claiming producer (between claim and
// publish) or by the single consumer (after publish), so sharing the raw
// cells across threads is sound for Send payloads.
unsafe impl<T: Send> Send for Shared<T> {}
unsafe impl<T: Send> Sync for Shared<T> {}

impl<T> Shared<T> {
    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        let _gate = self.gate.lock();
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }
}

/// Producer handle for the ring buffer
pub struct RingProducer<T: Send> {
    shared: Arc<Shared<T>>,
}

impl<T: Send> Clone for RingProducer<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send> RingProducer<T> {
    /// Enqueue one record, blocking while the buffer is full
    ///
    /// Calls from a single thread are observed by the consumer in call
    /// order; across threads only claim order is guaranteed. Returns
    /// [`PipelineError::Closed`] once the buffer has been closed.
    pub fn push(&self, value: T) -> Result<()> {
        let shared = &*self.shared;
        let mut pos = shared.claim.load(Ordering::Relaxed);

        loop {
            if shared.closed.load(Ordering::Acquire) {
                return Err(PipelineError::Closed);
            }

            let slot = &shared.slots[pos & shared.mask];
            let seq = slot.sequence.load(Ordering::Acquire);
            let dist = seq.wrapping_sub(pos) as isize;

            if dist == 0 {
                // Slot is free for this lap: try to claim it.
                match shared.claim.compare_exchange_weak(
                    pos,
                    pos.wrapping_add(1),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => {
                        // Claim granted: copy the record into the slot, then
                        // publish unconditionally so the sequence can never
                        // stall on this slot.
                        unsafe {
                            *slot.value.get() = Some(value);
                        }
                        slot.sequence
                            .store(pos.wrapping_add(1), Ordering::Release);

                        let _gate = shared.gate.lock();
                        shared.not_empty.notify_one();
                        return Ok(());
                    }
                    Err(actual) => pos = actual,
                }
            } else if dist < 0 {
                // Buffer full: wait for the consumer to free a slot. The
                // re-check under the gate avoids a missed wakeup.
                let mut gate = shared.gate.lock();
                let seq = slot.sequence.load(Ordering::Acquire);
                if (seq.wrapping_sub(pos) as isize) < 0
                    && !shared.closed.load(Ordering::Acquire)
                {
                    shared.not_full.wait(&mut gate);
                }
                drop(gate);
                pos = shared.claim.load(Ordering::Relaxed);
            } else {
                // Another producer claimed this slot first; catch up.
                pos = shared.claim.load(Ordering::Relaxed);
            }
        }
    }

    /// Close the buffer, waking all blocked producers and the consumer
    ///
    /// Records already published remain drainable by the consumer.
    pub fn close(&self) {
        self.shared.close();
    }

    /// Check whether the buffer has been closed
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Fixed slot capacity of the buffer
    pub fn capacity(&self) -> usize {
        self.shared.slots.len()
    }
}

/// Consumer handle for the ring buffer (exactly one exists per ring)
pub struct RingConsumer<T: Send> {
    shared: Arc<Shared<T>>,
    /// Next sequence number to read; owned by the single consumer
    next: usize,
}

impl<T: Send> RingConsumer<T> {
    /// Dequeue the next record in strict sequence order
    ///
    /// Blocks while the buffer is empty. Returns `None` once the buffer is
    /// closed and fully drained.
    pub fn pop(&mut self) -> Option<T> {
        let shared = &*self.shared;

        loop {
            let pos = self.next;
            let slot = &shared.slots[pos & shared.mask];
            let seq = slot.sequence.load(Ordering::Acquire);

            if seq == pos.wrapping_add(1) {
                let value = unsafe { (*slot.value.get()).take() };
                // Free the slot for the producer one lap ahead.
                slot.sequence
                    .store(pos.wrapping_add(shared.slots.len()), Ordering::Release);
                self.next = pos.wrapping_add(1);

                let _gate = shared.gate.lock();
                shared.not_full.notify_all();
                drop(_gate);

                match value {
                    Some(v) => return Some(v),
                    // Unreachable: publish always stores a value.
                    None => continue,
                }
            }

            if shared.closed.load(Ordering::Acquire) {
                if shared.claim.load(Ordering::Acquire) == pos {
                    // Closed and every claimed slot has been drained.
                    return None;
                }
                // A producer claimed this slot but has not published yet;
                // the publish is imminent, so spin rather than park.
                std::hint::spin_loop();
                continue;
            }

            let mut gate = shared.gate.lock();
            let seq = slot.sequence.load(Ordering::Acquire);
            if seq != pos.wrapping_add(1) && !shared.closed.load(Ordering::Acquire) {
                shared.not_empty.wait(&mut gate);
            }
        }
    }

    /// Fixed slot capacity of the buffer
    pub fn capacity(&self) -> usize {
        self.shared.slots.len()
    }
}

impl<T: Send> Drop for RingConsumer<T> {
    fn drop(&mut self) {
        // Without a consumer, blocked producers could never make progress.
        self.shared.close();
    }
}

#[cfg(test)]
#[path = "ring_test.rs"]
mod ring_test;

//! Cooperative shutdown signal
//!
//! A condvar-backed flag that timed waits (flush timer, import backoff) can
//! block on. Triggering interrupts every wait deterministically, so
//! background threads stop without arbitrary sleeps.

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

/// Shared shutdown signal
#[derive(Default)]
pub struct Shutdown {
    triggered: Mutex<bool>,
    cond: Condvar,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal shutdown, waking every pending `wait_for`
    pub fn trigger(&self) {
        let mut triggered = self.triggered.lock();
        *triggered = true;
        self.cond.notify_all();
    }

    /// Check the flag without blocking
    pub fn is_triggered(&self) -> bool {
        *self.triggered.lock()
    }

    /// Block for up to `timeout`, returning early on shutdown
    ///
    /// Returns `true` if shutdown was triggered, `false` if the full
    /// timeout elapsed.
    pub fn wait_for(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut triggered = self.triggered.lock();
        while !*triggered {
            if self.cond.wait_until(&mut triggered, deadline).timed_out() {
                return *triggered;
            }
        }
        true
    }
}

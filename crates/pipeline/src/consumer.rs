//! The buffer-draining consumer thread
//!
//! Exactly one consumer drains the ring buffer, processing records strictly
//! in sequence order and handing each to the configured dispatch target.

use std::io;
use std::thread::{self, JoinHandle};

use loghive_protocol::LogEntry;

use crate::dispatch::Dispatch;
use crate::ring::RingConsumer;

/// Handle to the consumer thread
pub struct Consumer {
    handle: Option<JoinHandle<u64>>,
}

impl Consumer {
    /// Spawn the consumer thread draining `receiver` into `dispatch`
    pub fn spawn(mut receiver: RingConsumer<LogEntry>, dispatch: Dispatch) -> io::Result<Self> {
        let handle = thread::Builder::new()
            .name("log-consumer".into())
            .spawn(move || {
                let mut consumed = 0u64;
                while let Some(entry) = receiver.pop() {
                    dispatch.handle(entry);
                    consumed += 1;
                }
                tracing::info!(records = consumed, "consumer drained, exiting");
                consumed
            })?;

        Ok(Self {
            handle: Some(handle),
        })
    }

    /// Wait for the consumer to drain and exit; returns records consumed
    ///
    /// The ring buffer must be closed first, otherwise this blocks until
    /// it is.
    pub fn join(mut self) -> u64 {
        self.handle
            .take()
            .and_then(|h| h.join().ok())
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "consumer_test.rs"]
mod consumer_test;

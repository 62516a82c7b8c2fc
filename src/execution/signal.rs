//! Cooperative cancellation signal.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag polled by the driver and by row-wise batches.
///
/// Cancellation is cooperative: setting the signal stops admission of new batches
/// and lets in-flight work wind down at its next check. It never interrupts running
/// work and never rolls back committed results.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination. Idempotent.
    pub fn set(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Non-blocking "should I stop" check.
    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

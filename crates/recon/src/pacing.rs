//! Fixed-interval throttling between target calls.
//!
//! Purely time-based: one constant delay between write chunks, another
//! between pages. No token bucket, no adaptive backoff.

use std::thread;
use std::time::Duration;

use crate::config::PacingConfig;

/// Sleep seam so tests can observe pauses without waiting.
pub trait Clock {
    fn sleep(&self, delay: Duration);
}

/// Blocks the current thread.
pub struct ThreadClock;

impl Clock for ThreadClock {
    fn sleep(&self, delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

pub struct Pacer<'a> {
    batch_delay: Duration,
    page_delay: Duration,
    clock: &'a dyn Clock,
}

impl<'a> Pacer<'a> {
    pub fn new(config: &PacingConfig, clock: &'a dyn Clock) -> Self {
        Self {
            batch_delay: config.batch_delay(),
            page_delay: config.page_delay(),
            clock,
        }
    }

    pub fn delay_between_batches(&self) {
        self.clock.sleep(self.batch_delay);
    }

    pub fn delay_between_pages(&self) {
        self.clock.sleep(self.page_delay);
    }
}

//! Time source and blocking delay

use std::thread;
use std::time::{Duration, Instant};

/// Monotonic time and thread suspension.
///
/// `delay_ms` is how blocking drive primitives suspend the single thread
/// of control; nothing else runs until it returns.
pub trait Clock: Send {
    /// Microseconds since an arbitrary fixed origin
    fn now_micros(&self) -> u64;

    /// Block the calling thread for `ms` milliseconds
    fn delay_ms(&mut self, ms: u32);
}

/// Wall-clock implementation backed by `std::time`.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_micros(&self) -> u64 {
        self.origin.elapsed().as_micros() as u64
    }

    fn delay_ms(&mut self, ms: u32) {
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms as u64));
        }
    }
}

//! Session clock.
//!
//! The reducer only ever sees plain millisecond timestamps. This clock is
//! where those timestamps come from at runtime: milliseconds elapsed since
//! the clock was created, read from tokio's monotonic `Instant` so that
//! paused-time tests control it.

use std::time::Duration;
use tokio::time::Instant;

/// Monotonic millisecond clock anchored at creation.
#[derive(Clone, Copy, Debug)]
pub struct SessionClock {
    origin: Instant,
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionClock {
    /// Start a clock at the current instant.
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }

    /// Milliseconds since the clock started.
    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    /// Convert a session timestamp back into an `Instant`.
    pub fn instant_at(&self, ms: u64) -> Instant {
        self.origin + Duration::from_millis(ms)
    }
}

//! Clock implementations.
//!
//! [`SystemClock`] reads the host monotonic clock and really sleeps.
//! [`ManualClock`] is a software clock for tests: sleeping just advances
//! virtual time, so timer behaviour can be checked without wall-clock delays.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rtsim_hal::Clock;

/// Host monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Virtual clock advanced by hand or by `sleep`.
///
/// Clones share the same time line.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    /// Offset from `base` in nanoseconds.
    offset_ns: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock frozen at the current host instant.
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Advance virtual time.
    pub fn advance(&self, duration: Duration) {
        let ns = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        let _ = self
            .offset_ns
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |offset| {
                Some(offset.saturating_add(ns))
            });
    }

    /// Virtual time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_ns.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advance() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now() - t0, Duration::from_millis(250));
    }

    #[test]
    fn test_manual_clock_sleep_is_advance() {
        let clock = ManualClock::new();
        clock.sleep(Duration::from_secs(2));
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance(Duration::from_millis(5));
        assert_eq!(clock.elapsed(), Duration::from_millis(5));
    }

    #[test]
    fn test_manual_clock_saturates() {
        let clock = ManualClock::new();
        clock.advance(Duration::MAX);
        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.elapsed(), Duration::from_nanos(u64::MAX));
    }

    #[test]
    fn test_system_clock_sleeps() {
        let clock = SystemClock;
        let start = clock.now();
        clock.sleep(Duration::from_millis(5));
        assert!(clock.now() - start >= Duration::from_millis(5));
    }
}

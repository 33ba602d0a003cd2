//! rtsim Hardware Abstraction Layer (HAL) traits.
//!
//! This crate defines traits that abstract away the platform time source, so
//! the simulator can run against the host clock or a virtual one.

use std::time::{Duration, Instant};

/// Trait for a monotonic time source.
pub trait Clock: Send + Sync {
    /// Returns the current monotonic instant.
    fn now(&self) -> Instant;
    /// Blocks the caller for `duration`.
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

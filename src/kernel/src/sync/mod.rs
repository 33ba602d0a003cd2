//! Synchronization primitives as bookkeeping banks.
//!
//! Neither primitive ever suspends the caller. Contention is reported as an
//! error and the caller decides whether to poll again.
//!
//! # Primitives
//!
//! - [`SemaphoreBank`]: named, unbounded counting semaphores
//! - [`MutexBank`]: named binary mutexes without ownership
//!
//! # Example
//!
//! ```
//! use rtsim_kernel::sync::{MutexBank, SemaphoreBank};
//!
//! let mut sems = SemaphoreBank::default();
//! sems.create("uart", 1).unwrap();
//! sems.acquire("uart").unwrap();
//! assert!(sems.acquire("uart").is_err());
//! sems.release("uart").unwrap();
//!
//! let mut mutexes = MutexBank::default();
//! mutexes.create("bus").unwrap();
//! mutexes.lock("bus").unwrap();
//! mutexes.unlock("bus").unwrap();
//! ```

mod mutex;
mod semaphore;

pub use mutex::{BinaryMutex, MutexBank};
pub use semaphore::{Semaphore, SemaphoreBank, DEFAULT_INITIAL_COUNT};

//! rtsim kernel
//!
//! An in-memory model of RTOS primitives for test harnesses: tasks,
//! counting semaphores, binary mutexes and one-shot/periodic timers. Nothing
//! is scheduled and nothing blocks except waiting on a timer; the kernel only
//! keeps and checks the bookkeeping a real RTOS would expose.
//!
//! # Architecture
//!
//! The kernel is structured into the following modules:
//! - `registry`: name-keyed map shared by every bank
//! - `task`, `sync`, `timer`: the banks
//! - `clock`: host and virtual implementations of [`rtsim_hal::Clock`]
//! - `fs`: file store behind the file keywords
//! - `library`, `shared`: single-owner and thread-safe front ends
//! - `terminal`: keyword dispatch and the script runner
//! - `config`, `console`: TOML configuration and the console logger

#![warn(missing_docs)]

pub mod clock;
pub mod config;
pub mod console;
pub mod fs;
pub mod library;
pub mod registry;
pub mod shared;
pub mod sync;
pub mod task;
pub mod terminal;
pub mod timer;

pub use clock::{ManualClock, SystemClock};
pub use config::Config;
pub use library::RtosLibrary;
pub use registry::CreatePolicy;
pub use rtsim_common::{EntityKind, ErrorClass, Result, SimError};
pub use rtsim_hal::Clock;
pub use shared::SharedLibrary;
pub use timer::{RearmPolicy, TimerKind};

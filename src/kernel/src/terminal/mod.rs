//! Keyword front end.
//!
//! # Architecture
//!
//! - `commands`: keyword names and arguments to typed library calls
//! - `shell`: script runner built on top of `commands`

pub mod commands;
pub mod shell;

pub use commands::Keyword;
pub use shell::{Failure, ScriptReport, ScriptRunner, TestOutcome};

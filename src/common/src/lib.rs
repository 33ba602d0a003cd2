//! Shared types for the rtsim workspace.
//!
//! Everything here is plain data: the error vocabulary used by every bank in
//! `rtsim-kernel`, and the entity kinds those errors refer to.

#![warn(missing_docs)]

pub mod error;

pub use error::{EntityKind, ErrorClass, Result, SimError};

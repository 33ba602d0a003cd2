//! File store traits and types.
//!
//! The file keywords are thin wrappers: [`HostFs`] forwards to the host file
//! system under a root directory, [`RamFs`] keeps everything in memory.

use rtsim_common::{Result, SimError};
use serde::Deserialize;
use std::path::PathBuf;

pub mod hostfs;
pub mod ramfs;

pub use hostfs::HostFs;
pub use ramfs::RamFs;

/// Trait for a flat, path-keyed file store.
pub trait FileStore: Send {
    /// Create an empty file, truncating any existing content.
    fn create(&self, path: &str) -> Result<()>;

    /// Remove a file.
    fn delete(&self, path: &str) -> Result<()>;

    /// Replace an existing file's content.
    fn write(&self, path: &str, content: &str) -> Result<()>;

    /// Read a file's content.
    fn read(&self, path: &str) -> Result<String>;

    /// Whether the file exists.
    fn exists(&self, path: &str) -> bool;

    /// Fail unless the file exists.
    fn assert_exists(&self, path: &str) -> Result<()> {
        if !self.exists(path) {
            return Err(SimError::PreconditionFailed(format!(
                "File '{}' does not exist.",
                path
            )));
        }
        log::debug!("Verified that file '{}' exists.", path);
        Ok(())
    }

    /// Fail if the file exists.
    fn assert_not_exists(&self, path: &str) -> Result<()> {
        if self.exists(path) {
            return Err(SimError::PreconditionFailed(format!(
                "File '{}' should not exist.",
                path
            )));
        }
        log::debug!("Verified that file '{}' does not exist.", path);
        Ok(())
    }
}

/// Which [`FileStore`] backs the file keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FsBackend {
    /// Host file system.
    #[default]
    Host,
    /// In-memory store.
    Ram,
}

/// Build the store selected by `backend`.
pub fn open_store(backend: FsBackend, root: PathBuf) -> Box<dyn FileStore> {
    match backend {
        FsBackend::Host => Box::new(HostFs::new(root)),
        FsBackend::Ram => Box::new(RamFs::new()),
    }
}

//! RAM file store implementation.

use super::FileStore;
use rtsim_common::{EntityKind, Result, SimError};
use spin::Mutex;
use std::collections::BTreeMap;

/// A simple in-memory file store.
pub struct RamFs {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl RamFs {
    /// Create a new empty RAM file store.
    pub fn new() -> Self {
        Self {
            files: Mutex::new(BTreeMap::new()),
        }
    }

    /// Add a file with content, replacing any existing one.
    pub fn add_file(&self, path: &str, content: &[u8]) {
        self.files.lock().insert(String::from(path), content.to_vec());
    }
}

impl Default for RamFs {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore for RamFs {
    fn create(&self, path: &str) -> Result<()> {
        self.files.lock().insert(String::from(path), Vec::new());
        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        self.files
            .lock()
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| SimError::not_found(EntityKind::File, path))
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        let mut files = self.files.lock();
        let file = files
            .get_mut(path)
            .ok_or_else(|| SimError::not_found(EntityKind::File, path))?;
        *file = content.as_bytes().to_vec();
        Ok(())
    }

    fn read(&self, path: &str) -> Result<String> {
        let files = self.files.lock();
        let content = files
            .get(path)
            .ok_or_else(|| SimError::not_found(EntityKind::File, path))?;
        String::from_utf8(content.clone()).map_err(|e| SimError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    fn exists(&self, path: &str) -> bool {
        self.files.lock().contains_key(path)
    }
}

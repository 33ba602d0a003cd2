//! Host file store rooted at a directory.

use super::FileStore;
use rtsim_common::{EntityKind, Result, SimError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File store that forwards to the host file system.
///
/// Relative paths resolve under `root`; absolute paths are used as given.
pub struct HostFs {
    root: PathBuf,
}

impl HostFs {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn io_error(path: &str, err: io::Error) -> SimError {
        if err.kind() == io::ErrorKind::NotFound {
            SimError::not_found(EntityKind::File, path)
        } else {
            SimError::Io {
                path: path.to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl FileStore for HostFs {
    fn create(&self, path: &str) -> Result<()> {
        fs::File::create(self.resolve(path))
            .map(|_| ())
            .map_err(|e| Self::io_error(path, e))
    }

    fn delete(&self, path: &str) -> Result<()> {
        fs::remove_file(self.resolve(path)).map_err(|e| Self::io_error(path, e))
    }

    fn write(&self, path: &str, content: &str) -> Result<()> {
        let full = self.resolve(path);
        if !full.exists() {
            return Err(SimError::not_found(EntityKind::File, path));
        }
        fs::write(full, content).map_err(|e| Self::io_error(path, e))
    }

    fn read(&self, path: &str) -> Result<String> {
        fs::read_to_string(self.resolve(path)).map_err(|e| Self::io_error(path, e))
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtsim_common::ErrorClass;

    #[test]
    fn test_host_round_trip() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let fs = HostFs::new(tmp.path());

        fs.create("TestFile.txt").unwrap();
        assert!(tmp.path().join("TestFile.txt").exists());
        fs.write("TestFile.txt", "Hello, RTOS!").unwrap();
        assert_eq!(fs.read("TestFile.txt").unwrap(), "Hello, RTOS!");

        fs.delete("TestFile.txt").unwrap();
        assert!(!fs.exists("TestFile.txt"));
    }

    #[test]
    fn test_host_missing_file_is_not_found() {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let fs = HostFs::new(tmp.path());

        assert_eq!(fs.delete("nope").unwrap_err().class(), ErrorClass::NotFound);
        assert_eq!(fs.read("nope").unwrap_err().class(), ErrorClass::NotFound);
        assert_eq!(
            fs.write("nope", "x").unwrap_err().class(),
            ErrorClass::NotFound
        );
        assert!(!tmp.path().join("nope").exists());
    }
}

//! Binary mutexes.
//!
//! No ownership is tracked: whoever calls `unlock` releases the lock.

use rtsim_common::{EntityKind, Result, SimError};

use crate::registry::{CreatePolicy, Registry};

/// A two-state lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinaryMutex {
    /// Lock state: false = unlocked, true = locked.
    locked: bool,
}

impl BinaryMutex {
    /// Create a new unlocked mutex.
    pub fn new() -> Self {
        Self { locked: false }
    }

    /// Whether the mutex is held.
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Attempt to take the lock.
    ///
    /// Returns `true` if the lock was taken, `false` if it was already held.
    pub fn try_lock(&mut self) -> bool {
        if self.locked {
            return false;
        }
        self.locked = true;
        true
    }

    /// Attempt to release the lock.
    ///
    /// Returns `true` if the lock was released, `false` if it was not held.
    pub fn try_unlock(&mut self) -> bool {
        if !self.locked {
            return false;
        }
        self.locked = false;
        true
    }
}

/// Bank of named binary mutexes.
#[derive(Debug, Clone)]
pub struct MutexBank {
    mutexes: Registry<BinaryMutex>,
}

impl Default for MutexBank {
    fn default() -> Self {
        Self::new(CreatePolicy::default())
    }
}

impl MutexBank {
    /// Create an empty bank.
    pub fn new(policy: CreatePolicy) -> Self {
        Self {
            mutexes: Registry::new(EntityKind::Mutex, policy),
        }
    }

    /// Create (or replace) an unlocked mutex.
    pub fn create(&mut self, name: &str) -> Result<()> {
        self.mutexes.insert(name, BinaryMutex::new())?;
        log::info!("Mutex '{}' created.", name);
        Ok(())
    }

    /// Delete a mutex.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.mutexes.remove(name)?;
        log::info!("Mutex '{}' deleted.", name);
        Ok(())
    }

    /// Lock, failing with `AlreadyLocked` if held.
    pub fn lock(&mut self, name: &str) -> Result<()> {
        if !self.mutexes.get_mut(name)?.try_lock() {
            return Err(SimError::AlreadyLocked {
                name: name.to_string(),
            });
        }
        log::info!("Mutex '{}' locked.", name);
        Ok(())
    }

    /// Unlock, failing with `AlreadyUnlocked` if not held.
    pub fn unlock(&mut self, name: &str) -> Result<()> {
        if !self.mutexes.get_mut(name)?.try_unlock() {
            return Err(SimError::AlreadyUnlocked {
                name: name.to_string(),
            });
        }
        log::info!("Mutex '{}' unlocked.", name);
        Ok(())
    }

    /// Fail unless locked.
    pub fn assert_locked(&self, name: &str) -> Result<()> {
        if !self.mutexes.get(name)?.is_locked() {
            return Err(SimError::PreconditionFailed(format!(
                "Mutex '{}' is not locked.",
                name
            )));
        }
        log::debug!("Verified that mutex '{}' is locked.", name);
        Ok(())
    }

    /// Fail if locked.
    pub fn assert_unlocked(&self, name: &str) -> Result<()> {
        if self.mutexes.get(name)?.is_locked() {
            return Err(SimError::PreconditionFailed(format!(
                "Mutex '{}' is locked.",
                name
            )));
        }
        log::debug!("Verified that mutex '{}' is unlocked.", name);
        Ok(())
    }

    /// Whether the named mutex is held.
    pub fn is_locked(&self, name: &str) -> Result<bool> {
        Ok(self.mutexes.get(name)?.is_locked())
    }
}

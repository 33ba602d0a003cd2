//! Counting semaphores.

use rtsim_common::{EntityKind, Result, SimError};

use crate::registry::{CreatePolicy, Registry};

/// Count assigned when the caller gives none.
pub const DEFAULT_INITIAL_COUNT: i64 = 1;

/// A counting semaphore.
///
/// Acquiring needs a positive count and decrements it. Releasing always
/// increments, so the count can climb past its initial value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Semaphore {
    count: i64,
}

impl Semaphore {
    /// Create a semaphore with the given initial count.
    pub fn new(count: i64) -> Self {
        Self { count }
    }

    /// Current count.
    pub fn count(&self) -> i64 {
        self.count
    }

    /// True when an acquire would succeed.
    pub fn is_available(&self) -> bool {
        self.count > 0
    }

    /// Take one unit if any is available.
    ///
    /// Returns `true` if a unit was taken, `false` if none available.
    pub fn try_acquire(&mut self) -> bool {
        if self.count > 0 {
            self.count -= 1;
            true
        } else {
            false
        }
    }

    /// Return one unit.
    pub fn release(&mut self) {
        self.count = self.count.saturating_add(1);
    }
}

/// Bank of named counting semaphores.
#[derive(Debug, Clone)]
pub struct SemaphoreBank {
    semaphores: Registry<Semaphore>,
}

impl Default for SemaphoreBank {
    fn default() -> Self {
        Self::new(CreatePolicy::default())
    }
}

impl SemaphoreBank {
    /// Create an empty bank.
    pub fn new(policy: CreatePolicy) -> Self {
        Self {
            semaphores: Registry::new(EntityKind::Semaphore, policy),
        }
    }

    /// Create (or replace) a semaphore.
    pub fn create(&mut self, name: &str, initial_count: i64) -> Result<()> {
        self.semaphores.insert(name, Semaphore::new(initial_count))?;
        log::info!("Semaphore '{}' created with count {}.", name, initial_count);
        Ok(())
    }

    /// Delete a semaphore.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.semaphores.remove(name)?;
        log::info!("Semaphore '{}' deleted.", name);
        Ok(())
    }

    /// Decrement the count, failing with `Unavailable` if it is not positive.
    pub fn acquire(&mut self, name: &str) -> Result<()> {
        if !self.semaphores.get_mut(name)?.try_acquire() {
            return Err(SimError::Unavailable {
                name: name.to_string(),
            });
        }
        log::info!("Semaphore '{}' acquired.", name);
        Ok(())
    }

    /// Increment the count.
    pub fn release(&mut self, name: &str) -> Result<()> {
        self.semaphores.get_mut(name)?.release();
        log::info!("Semaphore '{}' released.", name);
        Ok(())
    }

    /// Fail unless the count is positive.
    pub fn assert_available(&self, name: &str) -> Result<()> {
        if !self.semaphores.get(name)?.is_available() {
            return Err(SimError::PreconditionFailed(format!(
                "Semaphore '{}' is not available.",
                name
            )));
        }
        log::debug!("Verified that semaphore '{}' is available.", name);
        Ok(())
    }

    /// Fail if the count is positive.
    pub fn assert_unavailable(&self, name: &str) -> Result<()> {
        if self.semaphores.get(name)?.is_available() {
            return Err(SimError::PreconditionFailed(format!(
                "Semaphore '{}' is available.",
                name
            )));
        }
        log::debug!("Verified that semaphore '{}' is unavailable.", name);
        Ok(())
    }

    /// Current count of a semaphore.
    pub fn count(&self, name: &str) -> Result<i64> {
        Ok(self.semaphores.get(name)?.count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtsim_common::ErrorClass;

    #[test]
    fn test_semaphore_try_acquire() {
        let mut sem = Semaphore::new(2);

        // Should succeed twice
        assert!(sem.try_acquire());
        assert!(sem.try_acquire());

        // Third should fail
        assert!(!sem.try_acquire());
        assert_eq!(sem.count(), 0);
    }

    #[test]
    fn test_semaphore_release_is_unbounded() {
        let mut sem = Semaphore::new(1);
        sem.release();
        sem.release();
        sem.release();
        assert_eq!(sem.count(), 4);
    }

    #[test]
    fn test_bank_exhausts_after_n_acquires() {
        for n in 1..=5 {
            let mut bank = SemaphoreBank::default();
            bank.create("s", n).unwrap();
            for _ in 0..n {
                bank.acquire("s").unwrap();
            }
            assert_eq!(
                bank.acquire("s"),
                Err(SimError::Unavailable { name: "s".into() })
            );
            bank.assert_unavailable("s").unwrap();

            bank.release("s").unwrap();
            bank.assert_available("s").unwrap();
            bank.acquire("s").unwrap();
            assert!(bank.acquire("s").is_err());
        }
    }

    #[test]
    fn test_failed_acquire_leaves_count() {
        let mut bank = SemaphoreBank::default();
        bank.create("s", 0).unwrap();
        assert!(bank.acquire("s").is_err());
        assert_eq!(bank.count("s").unwrap(), 0);
    }

    #[test]
    fn test_negative_initial_count_is_unavailable() {
        let mut bank = SemaphoreBank::default();
        bank.create("s", -1).unwrap();
        bank.assert_unavailable("s").unwrap();
        bank.release("s").unwrap();
        bank.assert_unavailable("s").unwrap();
        bank.release("s").unwrap();
        bank.assert_available("s").unwrap();
    }

    #[test]
    fn test_assertions_on_missing() {
        let mut bank = SemaphoreBank::default();
        bank.create("s", DEFAULT_INITIAL_COUNT).unwrap();
        bank.delete("s").unwrap();

        for err in [
            bank.acquire("s").unwrap_err(),
            bank.release("s").unwrap_err(),
            bank.assert_available("s").unwrap_err(),
            bank.assert_unavailable("s").unwrap_err(),
            bank.delete("s").unwrap_err(),
        ] {
            assert_eq!(err.class(), ErrorClass::NotFound);
        }
    }

    #[test]
    fn test_availability_mismatch_is_precondition_failure() {
        let mut bank = SemaphoreBank::default();
        bank.create("s", 1).unwrap();
        assert_eq!(
            bank.assert_unavailable("s").unwrap_err().class(),
            ErrorClass::PreconditionFailed
        );
    }
}

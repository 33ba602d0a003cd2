//! The keyword library: every bank behind one owned state object.
//!
//! Methods are named after the keywords a test harness calls. Each one
//! touches exactly one bank and either succeeds or returns an error with the
//! bank unchanged.

use rtsim_common::Result;
use rtsim_hal::Clock;

use crate::clock::SystemClock;
use crate::config::{Config, Defaults};
use crate::fs::{self, FileStore};
use crate::sync::{MutexBank, SemaphoreBank};
use crate::task::{Priority, TaskRegistry};
use crate::timer::{TimerKind, TimerService};

/// Owned simulator state.
pub struct RtosLibrary<C: Clock = SystemClock> {
    defaults: Defaults,
    tasks: TaskRegistry,
    semaphores: SemaphoreBank,
    mutexes: MutexBank,
    timers: TimerService<C>,
    files: Box<dyn FileStore>,
}

impl RtosLibrary<SystemClock> {
    /// Library with the default configuration on the host clock.
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    /// Library for `config` on the host clock.
    pub fn from_config(config: &Config) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for RtosLibrary<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RtosLibrary<C> {
    /// Library for `config` on the given clock.
    pub fn with_clock(config: &Config, clock: C) -> Self {
        let files = fs::open_store(config.fs.backend, config.fs.root.clone());
        Self::with_parts(config, clock, files)
    }

    /// Library for `config` with an explicit clock and file store.
    pub fn with_parts(config: &Config, clock: C, files: Box<dyn FileStore>) -> Self {
        let policy = config.registry.create_policy;
        Self {
            defaults: config.defaults.clone(),
            tasks: TaskRegistry::new(policy),
            semaphores: SemaphoreBank::new(policy),
            mutexes: MutexBank::new(policy),
            timers: TimerService::new(clock, policy, config.timer.rearm),
            files,
        }
    }

    /// Defaults for optional keyword arguments.
    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    /// Task bank.
    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    /// Semaphore bank.
    pub fn semaphores(&self) -> &SemaphoreBank {
        &self.semaphores
    }

    /// Mutex bank.
    pub fn mutexes(&self) -> &MutexBank {
        &self.mutexes
    }

    /// Timer bank.
    pub fn timers(&self) -> &TimerService<C> {
        &self.timers
    }

    /// File store.
    pub fn files(&self) -> &dyn FileStore {
        self.files.as_ref()
    }

    // Tasks

    /// Create (or replace) a task.
    pub fn create_task(&mut self, name: &str, priority: Priority) -> Result<()> {
        self.tasks.create(name, priority)
    }

    /// Delete a task.
    pub fn delete_task(&mut self, name: &str) -> Result<()> {
        self.tasks.delete(name)
    }

    /// Fail unless the task exists.
    pub fn task_should_exist(&self, name: &str) -> Result<()> {
        self.tasks.assert_exists(name)
    }

    /// Fail if the task exists.
    pub fn task_should_not_exist(&self, name: &str) -> Result<()> {
        self.tasks.assert_not_exists(name)
    }

    /// Overwrite a task's priority.
    pub fn change_task_priority(&mut self, name: &str, new_priority: Priority) -> Result<()> {
        self.tasks.change_priority(name, new_priority)
    }

    /// Fail unless the task has `expected` priority.
    pub fn task_priority_should_be(&self, name: &str, expected: Priority) -> Result<()> {
        self.tasks.assert_priority(name, expected)
    }

    // Semaphores

    /// Create (or replace) a semaphore.
    pub fn create_semaphore(&mut self, name: &str, initial_count: i64) -> Result<()> {
        self.semaphores.create(name, initial_count)
    }

    /// Delete a semaphore.
    pub fn delete_semaphore(&mut self, name: &str) -> Result<()> {
        self.semaphores.delete(name)
    }

    /// Take one unit or fail with `Unavailable`.
    pub fn acquire_semaphore(&mut self, name: &str) -> Result<()> {
        self.semaphores.acquire(name)
    }

    /// Return one unit.
    pub fn release_semaphore(&mut self, name: &str) -> Result<()> {
        self.semaphores.release(name)
    }

    /// Fail unless the count is positive.
    pub fn semaphore_should_be_available(&self, name: &str) -> Result<()> {
        self.semaphores.assert_available(name)
    }

    /// Fail if the count is positive.
    pub fn semaphore_should_be_unavailable(&self, name: &str) -> Result<()> {
        self.semaphores.assert_unavailable(name)
    }

    // Mutexes

    /// Create (or replace) an unlocked mutex.
    pub fn create_mutex(&mut self, name: &str) -> Result<()> {
        self.mutexes.create(name)
    }

    /// Delete a mutex.
    pub fn delete_mutex(&mut self, name: &str) -> Result<()> {
        self.mutexes.delete(name)
    }

    /// Lock or fail with `AlreadyLocked`.
    pub fn lock_mutex(&mut self, name: &str) -> Result<()> {
        self.mutexes.lock(name)
    }

    /// Unlock or fail with `AlreadyUnlocked`.
    pub fn unlock_mutex(&mut self, name: &str) -> Result<()> {
        self.mutexes.unlock(name)
    }

    /// Fail unless locked.
    pub fn mutex_should_be_locked(&self, name: &str) -> Result<()> {
        self.mutexes.assert_locked(name)
    }

    /// Fail if locked.
    pub fn mutex_should_be_unlocked(&self, name: &str) -> Result<()> {
        self.mutexes.assert_unlocked(name)
    }

    // Timers

    /// Create (or replace) an idle timer.
    pub fn create_timer(&mut self, name: &str, timeout: &str, kind: TimerKind) -> Result<()> {
        self.timers.create(name, timeout, kind)
    }

    /// Delete a timer.
    pub fn delete_timer(&mut self, name: &str) -> Result<()> {
        self.timers.delete(name)
    }

    /// Start a timer from now.
    pub fn start_timer(&mut self, name: &str) -> Result<()> {
        self.timers.start(name)
    }

    /// Block until the timer fires.
    pub fn wait_for_timer(&mut self, name: &str) -> Result<()> {
        self.timers.wait(name)
    }

    /// Fail unless the timer fired since its last start.
    pub fn timer_should_have_triggered(&self, name: &str) -> Result<()> {
        self.timers.assert_triggered(name)
    }

    /// Fail unless the timer fired exactly `expected` times since its last start.
    pub fn timer_trigger_count_should_be(&self, name: &str, expected: u64) -> Result<()> {
        self.timers.assert_trigger_count(name, expected)
    }

    /// Stop a timer.
    pub fn stop_timer(&mut self, name: &str) -> Result<()> {
        self.timers.stop(name)
    }

    // Files

    /// Create an empty file.
    pub fn create_file(&mut self, path: &str) -> Result<()> {
        self.files.create(path)?;
        log::info!("File '{}' created.", path);
        Ok(())
    }

    /// Delete a file.
    pub fn delete_file(&mut self, path: &str) -> Result<()> {
        self.files.delete(path)?;
        log::info!("File '{}' deleted.", path);
        Ok(())
    }

    /// Replace a file's content.
    pub fn write_to_file(&mut self, path: &str, content: &str) -> Result<()> {
        self.files.write(path, content)?;
        log::info!("Written to file '{}'.", path);
        Ok(())
    }

    /// Read a file's content.
    pub fn read_from_file(&self, path: &str) -> Result<String> {
        let content = self.files.read(path)?;
        log::info!("Read from file '{}'.", path);
        Ok(content)
    }

    /// Fail unless the file exists.
    pub fn file_should_exist(&self, path: &str) -> Result<()> {
        self.files.assert_exists(path)
    }

    /// Fail if the file exists.
    pub fn file_should_not_exist(&self, path: &str) -> Result<()> {
        self.files.assert_not_exists(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::fs::RamFs;
    use crate::registry::CreatePolicy;
    use rtsim_common::ErrorClass;

    fn library() -> RtosLibrary<ManualClock> {
        RtosLibrary::with_parts(&Config::default(), ManualClock::new(), Box::new(RamFs::new()))
    }

    #[test]
    fn test_banks_are_independent() {
        let mut lib = library();
        lib.create_task("x", 1).unwrap();
        lib.create_semaphore("x", 1).unwrap();
        lib.create_mutex("x").unwrap();
        lib.create_timer("x", "1s", TimerKind::OneShot).unwrap();

        lib.delete_mutex("x").unwrap();
        lib.task_should_exist("x").unwrap();
        lib.semaphore_should_be_available("x").unwrap();
        assert_eq!(lib.lock_mutex("x").unwrap_err().class(), ErrorClass::NotFound);
        lib.start_timer("x").unwrap();
    }

    #[test]
    fn test_file_keywords() {
        let mut lib = library();
        lib.file_should_not_exist("TestFile.txt").unwrap();
        lib.create_file("TestFile.txt").unwrap();
        lib.file_should_exist("TestFile.txt").unwrap();
        lib.write_to_file("TestFile.txt", "Hello, RTOS!").unwrap();
        assert_eq!(lib.read_from_file("TestFile.txt").unwrap(), "Hello, RTOS!");
        lib.delete_file("TestFile.txt").unwrap();
        assert_eq!(
            lib.file_should_exist("TestFile.txt").unwrap_err().class(),
            ErrorClass::PreconditionFailed
        );
    }

    #[test]
    fn test_reject_policy_applies_to_every_bank() {
        let mut config = Config::default();
        config.registry.create_policy = CreatePolicy::Reject;
        let mut lib = RtosLibrary::with_parts(&config, ManualClock::new(), Box::new(RamFs::new()));

        lib.create_task("a", 1).unwrap();
        lib.create_semaphore("a", 1).unwrap();
        lib.create_mutex("a").unwrap();
        lib.create_timer("a", "5ms", TimerKind::Periodic).unwrap();

        for err in [
            lib.create_task("a", 2).unwrap_err(),
            lib.create_semaphore("a", 2).unwrap_err(),
            lib.create_mutex("a").unwrap_err(),
            lib.create_timer("a", "5ms", TimerKind::OneShot).unwrap_err(),
        ] {
            assert_eq!(err.class(), ErrorClass::AlreadyExists);
        }
    }

    #[test]
    fn test_defaults_come_from_config() {
        let mut config = Config::default();
        config.defaults.task_priority = 9;
        let lib = RtosLibrary::with_parts(&config, ManualClock::new(), Box::new(RamFs::new()));
        assert_eq!(lib.defaults().task_priority, 9);
        assert_eq!(lib.defaults().semaphore_count, 1);
    }
}

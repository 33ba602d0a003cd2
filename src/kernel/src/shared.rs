//! Library front end for callers on several threads.
//!
//! Each bank sits behind its own lock and every operation takes exactly one
//! of them, so callers working on different banks never contend.
//! `wait_for_timer` only holds the timer lock to read the deadline and to
//! fire; it sleeps unlocked. A timer stopped, restarted or re-created during
//! that sleep is reported as `NotStarted`, a deleted one as `NotFound`, and
//! in neither case does it fire.

use rtsim_common::Result;
use rtsim_hal::Clock;
use spin::Mutex;

use crate::clock::SystemClock;
use crate::config::Config;
use crate::fs::{self, FileStore};
use crate::sync::{MutexBank, SemaphoreBank};
use crate::task::{Priority, TaskRegistry};
use crate::timer::{TimerKind, TimerService};

/// Thread-safe simulator state.
pub struct SharedLibrary<C: Clock + Clone = SystemClock> {
    tasks: Mutex<TaskRegistry>,
    semaphores: Mutex<SemaphoreBank>,
    mutexes: Mutex<MutexBank>,
    timers: Mutex<TimerService<C>>,
    files: Mutex<Box<dyn FileStore>>,
    clock: C,
}

impl SharedLibrary<SystemClock> {
    /// Shared library for `config` on the host clock.
    pub fn from_config(config: &Config) -> Self {
        let files = fs::open_store(config.fs.backend, config.fs.root.clone());
        Self::with_parts(config, SystemClock, files)
    }
}

impl<C: Clock + Clone> SharedLibrary<C> {
    /// Shared library with an explicit clock and file store.
    pub fn with_parts(config: &Config, clock: C, files: Box<dyn FileStore>) -> Self {
        let policy = config.registry.create_policy;
        Self {
            tasks: Mutex::new(TaskRegistry::new(policy)),
            semaphores: Mutex::new(SemaphoreBank::new(policy)),
            mutexes: Mutex::new(MutexBank::new(policy)),
            timers: Mutex::new(TimerService::new(clock.clone(), policy, config.timer.rearm)),
            files: Mutex::new(files),
            clock,
        }
    }

    /// Create (or replace) a task.
    pub fn create_task(&self, name: &str, priority: Priority) -> Result<()> {
        self.tasks.lock().create(name, priority)
    }

    /// Delete a task.
    pub fn delete_task(&self, name: &str) -> Result<()> {
        self.tasks.lock().delete(name)
    }

    /// Fail unless the task exists.
    pub fn task_should_exist(&self, name: &str) -> Result<()> {
        self.tasks.lock().assert_exists(name)
    }

    /// Fail if the task exists.
    pub fn task_should_not_exist(&self, name: &str) -> Result<()> {
        self.tasks.lock().assert_not_exists(name)
    }

    /// Overwrite a task's priority.
    pub fn change_task_priority(&self, name: &str, new_priority: Priority) -> Result<()> {
        self.tasks.lock().change_priority(name, new_priority)
    }

    /// Fail unless the task has `expected` priority.
    pub fn task_priority_should_be(&self, name: &str, expected: Priority) -> Result<()> {
        self.tasks.lock().assert_priority(name, expected)
    }

    /// Create (or replace) a semaphore.
    pub fn create_semaphore(&self, name: &str, initial_count: i64) -> Result<()> {
        self.semaphores.lock().create(name, initial_count)
    }

    /// Delete a semaphore.
    pub fn delete_semaphore(&self, name: &str) -> Result<()> {
        self.semaphores.lock().delete(name)
    }

    /// Take one unit or fail with `Unavailable`.
    pub fn acquire_semaphore(&self, name: &str) -> Result<()> {
        self.semaphores.lock().acquire(name)
    }

    /// Return one unit.
    pub fn release_semaphore(&self, name: &str) -> Result<()> {
        self.semaphores.lock().release(name)
    }

    /// Fail unless the count is positive.
    pub fn semaphore_should_be_available(&self, name: &str) -> Result<()> {
        self.semaphores.lock().assert_available(name)
    }

    /// Fail if the count is positive.
    pub fn semaphore_should_be_unavailable(&self, name: &str) -> Result<()> {
        self.semaphores.lock().assert_unavailable(name)
    }

    /// Current semaphore count.
    pub fn semaphore_count(&self, name: &str) -> Result<i64> {
        self.semaphores.lock().count(name)
    }

    /// Create (or replace) an unlocked mutex.
    pub fn create_mutex(&self, name: &str) -> Result<()> {
        self.mutexes.lock().create(name)
    }

    /// Delete a mutex.
    pub fn delete_mutex(&self, name: &str) -> Result<()> {
        self.mutexes.lock().delete(name)
    }

    /// Lock or fail with `AlreadyLocked`.
    pub fn lock_mutex(&self, name: &str) -> Result<()> {
        self.mutexes.lock().lock(name)
    }

    /// Unlock or fail with `AlreadyUnlocked`.
    pub fn unlock_mutex(&self, name: &str) -> Result<()> {
        self.mutexes.lock().unlock(name)
    }

    /// Fail unless locked.
    pub fn mutex_should_be_locked(&self, name: &str) -> Result<()> {
        self.mutexes.lock().assert_locked(name)
    }

    /// Fail if locked.
    pub fn mutex_should_be_unlocked(&self, name: &str) -> Result<()> {
        self.mutexes.lock().assert_unlocked(name)
    }

    /// Create (or replace) an idle timer.
    pub fn create_timer(&self, name: &str, timeout: &str, kind: TimerKind) -> Result<()> {
        self.timers.lock().create(name, timeout, kind)
    }

    /// Delete a timer.
    pub fn delete_timer(&self, name: &str) -> Result<()> {
        self.timers.lock().delete(name)
    }

    /// Start a timer from now.
    pub fn start_timer(&self, name: &str) -> Result<()> {
        self.timers.lock().start(name)
    }

    /// Stop a timer.
    pub fn stop_timer(&self, name: &str) -> Result<()> {
        self.timers.lock().stop(name)
    }

    /// Block until the timer fires, without holding the timer bank meanwhile.
    pub fn wait_for_timer(&self, name: &str) -> Result<()> {
        let (arming, remaining) = self.timers.lock().arming(name)?;
        if !remaining.is_zero() {
            self.clock.sleep(remaining);
        }
        self.timers.lock().fire_arming(name, arming)
    }

    /// Number of firings since the timer was last started.
    pub fn timer_trigger_count(&self, name: &str) -> Result<u64> {
        self.timers.lock().trigger_count(name)
    }

    /// Fail unless the timer fired since its last start.
    pub fn timer_should_have_triggered(&self, name: &str) -> Result<()> {
        self.timers.lock().assert_triggered(name)
    }

    /// Fail unless the timer fired exactly `expected` times since its last start.
    pub fn timer_trigger_count_should_be(&self, name: &str, expected: u64) -> Result<()> {
        self.timers.lock().assert_trigger_count(name, expected)
    }

    /// Create an empty file.
    pub fn create_file(&self, path: &str) -> Result<()> {
        self.files.lock().create(path)?;
        log::info!("File '{}' created.", path);
        Ok(())
    }

    /// Delete a file.
    pub fn delete_file(&self, path: &str) -> Result<()> {
        self.files.lock().delete(path)?;
        log::info!("File '{}' deleted.", path);
        Ok(())
    }

    /// Replace a file's content.
    pub fn write_to_file(&self, path: &str, content: &str) -> Result<()> {
        self.files.lock().write(path, content)?;
        log::info!("Written to file '{}'.", path);
        Ok(())
    }

    /// Read a file's content.
    pub fn read_from_file(&self, path: &str) -> Result<String> {
        let content = self.files.lock().read(path)?;
        log::info!("Read from file '{}'.", path);
        Ok(content)
    }

    /// Fail unless the file exists.
    pub fn file_should_exist(&self, path: &str) -> Result<()> {
        self.files.lock().assert_exists(path)
    }

    /// Fail if the file exists.
    pub fn file_should_not_exist(&self, path: &str) -> Result<()> {
        self.files.lock().assert_not_exists(path)
    }
}

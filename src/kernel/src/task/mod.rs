//! Task bookkeeping.
//!
//! Tasks are records only: a name, a priority value and a state. Nothing is
//! scheduled; the registry just answers questions about what exists.

use rtsim_common::{EntityKind, Result, SimError};

use crate::registry::{CreatePolicy, Registry};

/// Priority assigned when the caller gives none.
pub const DEFAULT_PRIORITY: Priority = 5;

/// Task priority. No range is enforced.
pub type Priority = i64;

/// Task execution state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Task is ready to run.
    Ready,
}

/// A task record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Current priority.
    pub priority: Priority,
    /// Current state.
    pub state: TaskState,
}

impl Task {
    /// Create a ready task with the given priority.
    pub fn new(priority: Priority) -> Self {
        Self {
            priority,
            state: TaskState::Ready,
        }
    }
}

/// Registry of named tasks.
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    tasks: Registry<Task>,
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::new(CreatePolicy::default())
    }
}

impl TaskRegistry {
    /// Create an empty registry.
    pub fn new(policy: CreatePolicy) -> Self {
        Self {
            tasks: Registry::new(EntityKind::Task, policy),
        }
    }

    /// Create (or replace) a task.
    pub fn create(&mut self, name: &str, priority: Priority) -> Result<()> {
        self.tasks.insert(name, Task::new(priority))?;
        log::info!("Task '{}' created with priority {}.", name, priority);
        Ok(())
    }

    /// Delete a task.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.tasks.remove(name)?;
        log::info!("Task '{}' deleted.", name);
        Ok(())
    }

    /// Fail unless the task exists.
    pub fn assert_exists(&self, name: &str) -> Result<()> {
        if !self.tasks.contains(name) {
            return Err(SimError::PreconditionFailed(format!(
                "Task '{}' does not exist.",
                name
            )));
        }
        log::debug!("Verified that task '{}' exists.", name);
        Ok(())
    }

    /// Fail if the task exists.
    pub fn assert_not_exists(&self, name: &str) -> Result<()> {
        if self.tasks.contains(name) {
            return Err(SimError::PreconditionFailed(format!(
                "Task '{}' should not exist.",
                name
            )));
        }
        log::debug!("Verified that task '{}' does not exist.", name);
        Ok(())
    }

    /// Overwrite a task's priority.
    pub fn change_priority(&mut self, name: &str, new_priority: Priority) -> Result<()> {
        self.tasks.get_mut(name)?.priority = new_priority;
        log::info!("Task '{}' priority changed to {}.", name, new_priority);
        Ok(())
    }

    /// Fail unless the task's priority equals `expected`.
    pub fn assert_priority(&self, name: &str, expected: Priority) -> Result<()> {
        let actual = self.tasks.get(name)?.priority;
        if actual != expected {
            return Err(SimError::PreconditionFailed(format!(
                "Expected priority {}, but got {}.",
                expected, actual
            )));
        }
        log::debug!("Verified that task '{}' has priority {}.", name, expected);
        Ok(())
    }

    /// Look up a task record.
    pub fn get(&self, name: &str) -> Result<&Task> {
        self.tasks.get(name)
    }

    /// Number of tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// True when no tasks exist.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtsim_common::ErrorClass;

    #[test]
    fn test_create_and_check_priority() {
        let mut tasks = TaskRegistry::default();
        tasks.create("a", 1).unwrap();

        tasks.assert_exists("a").unwrap();
        tasks.assert_priority("a", 1).unwrap();
        assert_eq!(
            tasks.assert_priority("a", 2).unwrap_err().class(),
            ErrorClass::PreconditionFailed
        );
        assert_eq!(tasks.get("a").unwrap().state, TaskState::Ready);
    }

    #[test]
    fn test_change_priority_missing() {
        let mut tasks = TaskRegistry::default();
        assert_eq!(
            tasks.change_priority("missing", 3),
            Err(SimError::not_found(EntityKind::Task, "missing"))
        );
    }

    #[test]
    fn test_change_priority_has_no_range() {
        let mut tasks = TaskRegistry::default();
        tasks.create("t", DEFAULT_PRIORITY).unwrap();
        tasks.change_priority("t", -40).unwrap();
        tasks.assert_priority("t", -40).unwrap();
    }

    #[test]
    fn test_delete_then_reference() {
        let mut tasks = TaskRegistry::default();
        tasks.create("t", 2).unwrap();
        tasks.delete("t").unwrap();

        tasks.assert_not_exists("t").unwrap();
        assert_eq!(
            tasks.assert_exists("t").unwrap_err().class(),
            ErrorClass::PreconditionFailed
        );
        assert_eq!(tasks.delete("t").unwrap_err().class(), ErrorClass::NotFound);
        assert_eq!(
            tasks.assert_priority("t", 2).unwrap_err().class(),
            ErrorClass::NotFound
        );
    }

    #[test]
    fn test_recreate_overwrites_priority() {
        let mut tasks = TaskRegistry::default();
        tasks.create("t", 2).unwrap();
        tasks.create("t", 7).unwrap();
        tasks.assert_priority("t", 7).unwrap();
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn test_recreate_rejected() {
        let mut tasks = TaskRegistry::new(CreatePolicy::Reject);
        tasks.create("t", 2).unwrap();
        assert_eq!(
            tasks.create("t", 7).unwrap_err().class(),
            ErrorClass::AlreadyExists
        );
        tasks.assert_priority("t", 2).unwrap();
    }
}

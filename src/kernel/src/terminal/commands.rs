//! Keyword commands.
//!
//! Maps a keyword name plus string arguments, as a test harness would pass
//! them, onto a typed [`Keyword`], and runs it against an [`RtosLibrary`].

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use rtsim_common::{Result, SimError};
use rtsim_hal::Clock;

use crate::config::Defaults;
use crate::library::RtosLibrary;
use crate::task::Priority;
use crate::timer::TimerKind;

/// Keyword names without arguments attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Name {
    CreateTask,
    DeleteTask,
    TaskShouldExist,
    TaskShouldNotExist,
    ChangeTaskPriority,
    TaskPriorityShouldBe,
    CreateSemaphore,
    DeleteSemaphore,
    AcquireSemaphore,
    ReleaseSemaphore,
    SemaphoreShouldBeAvailable,
    SemaphoreShouldBeUnavailable,
    CreateMutex,
    DeleteMutex,
    LockMutex,
    UnlockMutex,
    MutexShouldBeLocked,
    MutexShouldBeUnlocked,
    CreateTimer,
    DeleteTimer,
    StartTimer,
    WaitForTimer,
    TimerShouldHaveTriggered,
    TimerTriggerCountShouldBe,
    StopTimer,
    CreateFile,
    DeleteFile,
    WriteToFile,
    ReadFromFile,
    FileShouldExist,
    FileShouldNotExist,
}

lazy_static! {
    /// Normalized keyword name to keyword.
    static ref KEYWORDS: BTreeMap<&'static str, Name> = {
        let mut m = BTreeMap::new();
        m.insert("createtask", Name::CreateTask);
        m.insert("deletetask", Name::DeleteTask);
        m.insert("taskshouldexist", Name::TaskShouldExist);
        m.insert("taskshouldnotexist", Name::TaskShouldNotExist);
        m.insert("changetaskpriority", Name::ChangeTaskPriority);
        m.insert("taskpriorityshouldbe", Name::TaskPriorityShouldBe);
        m.insert("createsemaphore", Name::CreateSemaphore);
        m.insert("deletesemaphore", Name::DeleteSemaphore);
        m.insert("acquiresemaphore", Name::AcquireSemaphore);
        m.insert("releasesemaphore", Name::ReleaseSemaphore);
        m.insert("semaphoreshouldbeavailable", Name::SemaphoreShouldBeAvailable);
        m.insert("semaphoreshouldbeunavailable", Name::SemaphoreShouldBeUnavailable);
        m.insert("createmutex", Name::CreateMutex);
        m.insert("deletemutex", Name::DeleteMutex);
        m.insert("lockmutex", Name::LockMutex);
        m.insert("unlockmutex", Name::UnlockMutex);
        m.insert("mutexshouldbelocked", Name::MutexShouldBeLocked);
        m.insert("mutexshouldbeunlocked", Name::MutexShouldBeUnlocked);
        m.insert("createtimer", Name::CreateTimer);
        m.insert("deletetimer", Name::DeleteTimer);
        m.insert("starttimer", Name::StartTimer);
        m.insert("waitfortimer", Name::WaitForTimer);
        m.insert("timershouldhavetriggered", Name::TimerShouldHaveTriggered);
        m.insert("timertriggercountshouldbe", Name::TimerTriggerCountShouldBe);
        m.insert("stoptimer", Name::StopTimer);
        m.insert("createfile", Name::CreateFile);
        m.insert("deletefile", Name::DeleteFile);
        m.insert("writetofile", Name::WriteToFile);
        m.insert("readfromfile", Name::ReadFromFile);
        m.insert("fileshouldexist", Name::FileShouldExist);
        m.insert("fileshouldnotexist", Name::FileShouldNotExist);
        m
    };
}

/// Normalize a keyword name: case-insensitive, spaces and underscores ignored.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != ' ' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Whether `name` is one of the library's keywords.
pub fn is_keyword(name: &str) -> bool {
    KEYWORDS.contains_key(normalize(name).as_str())
}

/// A keyword with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyword {
    /// Create (or replace) a task.
    CreateTask {
        /// Task name.
        name: String,
        /// Initial priority.
        priority: Priority,
    },
    /// Delete a task.
    DeleteTask(String),
    /// Assert a task exists.
    TaskShouldExist(String),
    /// Assert a task does not exist.
    TaskShouldNotExist(String),
    /// Change a task's priority.
    ChangeTaskPriority {
        /// Task name.
        name: String,
        /// New priority.
        priority: Priority,
    },
    /// Assert a task's priority.
    TaskPriorityShouldBe {
        /// Task name.
        name: String,
        /// Expected priority.
        expected: Priority,
    },
    /// Create (or replace) a semaphore.
    CreateSemaphore {
        /// Semaphore name.
        name: String,
        /// Initial count.
        initial_count: i64,
    },
    /// Delete a semaphore.
    DeleteSemaphore(String),
    /// Acquire a semaphore.
    AcquireSemaphore(String),
    /// Release a semaphore.
    ReleaseSemaphore(String),
    /// Assert a semaphore is available.
    SemaphoreShouldBeAvailable(String),
    /// Assert a semaphore is unavailable.
    SemaphoreShouldBeUnavailable(String),
    /// Create (or replace) a mutex.
    CreateMutex(String),
    /// Delete a mutex.
    DeleteMutex(String),
    /// Lock a mutex.
    LockMutex(String),
    /// Unlock a mutex.
    UnlockMutex(String),
    /// Assert a mutex is locked.
    MutexShouldBeLocked(String),
    /// Assert a mutex is unlocked.
    MutexShouldBeUnlocked(String),
    /// Create (or replace) a timer.
    CreateTimer {
        /// Timer name.
        name: String,
        /// Duration text, e.g. `500ms`.
        timeout: String,
        /// One-shot or periodic.
        kind: TimerKind,
    },
    /// Delete a timer.
    DeleteTimer(String),
    /// Start a timer.
    StartTimer(String),
    /// Block until a timer fires.
    WaitForTimer(String),
    /// Assert a timer fired.
    TimerShouldHaveTriggered(String),
    /// Assert how many times a timer fired.
    TimerTriggerCountShouldBe {
        /// Timer name.
        name: String,
        /// Expected count.
        expected: u64,
    },
    /// Stop a timer.
    StopTimer(String),
    /// Create an empty file.
    CreateFile(String),
    /// Delete a file.
    DeleteFile(String),
    /// Replace a file's content.
    WriteToFile {
        /// File path.
        path: String,
        /// New content.
        content: String,
    },
    /// Read a file.
    ReadFromFile(String),
    /// Assert a file exists.
    FileShouldExist(String),
    /// Assert a file does not exist.
    FileShouldNotExist(String),
}

impl Keyword {
    /// Parse a keyword from its name and arguments.
    ///
    /// Omitted optional arguments take their values from `defaults`.
    pub fn parse(keyword: &str, args: &[&str], defaults: &Defaults) -> Result<Keyword> {
        let name = *KEYWORDS
            .get(normalize(keyword).as_str())
            .ok_or_else(|| SimError::UnknownKeyword(keyword.to_string()))?;

        let arg = || single_arg(keyword, args);
        let kw = match name {
            Name::CreateTask => {
                arity(keyword, args, 1, 2)?;
                Keyword::CreateTask {
                    name: args[0].to_string(),
                    priority: match args.get(1) {
                        Some(p) => int_arg(keyword, "priority", p)?,
                        None => defaults.task_priority,
                    },
                }
            }
            Name::ChangeTaskPriority => {
                arity(keyword, args, 2, 2)?;
                Keyword::ChangeTaskPriority {
                    name: args[0].to_string(),
                    priority: int_arg(keyword, "new priority", args[1])?,
                }
            }
            Name::TaskPriorityShouldBe => {
                arity(keyword, args, 2, 2)?;
                Keyword::TaskPriorityShouldBe {
                    name: args[0].to_string(),
                    expected: int_arg(keyword, "expected priority", args[1])?,
                }
            }
            Name::CreateSemaphore => {
                arity(keyword, args, 1, 2)?;
                Keyword::CreateSemaphore {
                    name: args[0].to_string(),
                    initial_count: match args.get(1) {
                        Some(c) => int_arg(keyword, "initial count", c)?,
                        None => defaults.semaphore_count,
                    },
                }
            }
            Name::CreateTimer => {
                arity(keyword, args, 2, 3)?;
                Keyword::CreateTimer {
                    name: args[0].to_string(),
                    timeout: args[1].to_string(),
                    kind: match args.get(2) {
                        Some(k) => k.parse()?,
                        None => defaults.timer_kind,
                    },
                }
            }
            Name::TimerTriggerCountShouldBe => {
                arity(keyword, args, 2, 2)?;
                let expected = int_arg(keyword, "expected count", args[1])?;
                Keyword::TimerTriggerCountShouldBe {
                    name: args[0].to_string(),
                    expected: u64::try_from(expected).map_err(|_| {
                        SimError::InvalidArgument(format!(
                            "{}: expected count must not be negative",
                            keyword
                        ))
                    })?,
                }
            }
            Name::WriteToFile => {
                arity(keyword, args, 2, 2)?;
                Keyword::WriteToFile {
                    path: args[0].to_string(),
                    content: args[1].to_string(),
                }
            }
            Name::DeleteTask => Keyword::DeleteTask(arg()?),
            Name::TaskShouldExist => Keyword::TaskShouldExist(arg()?),
            Name::TaskShouldNotExist => Keyword::TaskShouldNotExist(arg()?),
            Name::DeleteSemaphore => Keyword::DeleteSemaphore(arg()?),
            Name::AcquireSemaphore => Keyword::AcquireSemaphore(arg()?),
            Name::ReleaseSemaphore => Keyword::ReleaseSemaphore(arg()?),
            Name::SemaphoreShouldBeAvailable => Keyword::SemaphoreShouldBeAvailable(arg()?),
            Name::SemaphoreShouldBeUnavailable => Keyword::SemaphoreShouldBeUnavailable(arg()?),
            Name::CreateMutex => Keyword::CreateMutex(arg()?),
            Name::DeleteMutex => Keyword::DeleteMutex(arg()?),
            Name::LockMutex => Keyword::LockMutex(arg()?),
            Name::UnlockMutex => Keyword::UnlockMutex(arg()?),
            Name::MutexShouldBeLocked => Keyword::MutexShouldBeLocked(arg()?),
            Name::MutexShouldBeUnlocked => Keyword::MutexShouldBeUnlocked(arg()?),
            Name::DeleteTimer => Keyword::DeleteTimer(arg()?),
            Name::StartTimer => Keyword::StartTimer(arg()?),
            Name::WaitForTimer => Keyword::WaitForTimer(arg()?),
            Name::TimerShouldHaveTriggered => Keyword::TimerShouldHaveTriggered(arg()?),
            Name::StopTimer => Keyword::StopTimer(arg()?),
            Name::CreateFile => Keyword::CreateFile(arg()?),
            Name::DeleteFile => Keyword::DeleteFile(arg()?),
            Name::ReadFromFile => Keyword::ReadFromFile(arg()?),
            Name::FileShouldExist => Keyword::FileShouldExist(arg()?),
            Name::FileShouldNotExist => Keyword::FileShouldNotExist(arg()?),
        };
        Ok(kw)
    }

    /// Run the keyword. Only `Read From File` yields a value.
    pub fn execute<C: Clock>(self, lib: &mut RtosLibrary<C>) -> Result<Option<String>> {
        match self {
            Keyword::CreateTask { name, priority } => lib.create_task(&name, priority)?,
            Keyword::DeleteTask(name) => lib.delete_task(&name)?,
            Keyword::TaskShouldExist(name) => lib.task_should_exist(&name)?,
            Keyword::TaskShouldNotExist(name) => lib.task_should_not_exist(&name)?,
            Keyword::ChangeTaskPriority { name, priority } => {
                lib.change_task_priority(&name, priority)?
            }
            Keyword::TaskPriorityShouldBe { name, expected } => {
                lib.task_priority_should_be(&name, expected)?
            }
            Keyword::CreateSemaphore {
                name,
                initial_count,
            } => lib.create_semaphore(&name, initial_count)?,
            Keyword::DeleteSemaphore(name) => lib.delete_semaphore(&name)?,
            Keyword::AcquireSemaphore(name) => lib.acquire_semaphore(&name)?,
            Keyword::ReleaseSemaphore(name) => lib.release_semaphore(&name)?,
            Keyword::SemaphoreShouldBeAvailable(name) => lib.semaphore_should_be_available(&name)?,
            Keyword::SemaphoreShouldBeUnavailable(name) => {
                lib.semaphore_should_be_unavailable(&name)?
            }
            Keyword::CreateMutex(name) => lib.create_mutex(&name)?,
            Keyword::DeleteMutex(name) => lib.delete_mutex(&name)?,
            Keyword::LockMutex(name) => lib.lock_mutex(&name)?,
            Keyword::UnlockMutex(name) => lib.unlock_mutex(&name)?,
            Keyword::MutexShouldBeLocked(name) => lib.mutex_should_be_locked(&name)?,
            Keyword::MutexShouldBeUnlocked(name) => lib.mutex_should_be_unlocked(&name)?,
            Keyword::CreateTimer {
                name,
                timeout,
                kind,
            } => lib.create_timer(&name, &timeout, kind)?,
            Keyword::DeleteTimer(name) => lib.delete_timer(&name)?,
            Keyword::StartTimer(name) => lib.start_timer(&name)?,
            Keyword::WaitForTimer(name) => lib.wait_for_timer(&name)?,
            Keyword::TimerShouldHaveTriggered(name) => lib.timer_should_have_triggered(&name)?,
            Keyword::TimerTriggerCountShouldBe { name, expected } => {
                lib.timer_trigger_count_should_be(&name, expected)?
            }
            Keyword::StopTimer(name) => lib.stop_timer(&name)?,
            Keyword::CreateFile(path) => lib.create_file(&path)?,
            Keyword::DeleteFile(path) => lib.delete_file(&path)?,
            Keyword::WriteToFile { path, content } => lib.write_to_file(&path, &content)?,
            Keyword::ReadFromFile(path) => return lib.read_from_file(&path).map(Some),
            Keyword::FileShouldExist(path) => lib.file_should_exist(&path)?,
            Keyword::FileShouldNotExist(path) => lib.file_should_not_exist(&path)?,
        }
        Ok(None)
    }
}

fn arity(keyword: &str, args: &[&str], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(SimError::InvalidArgument(format!(
            "{} expects {} arguments, got {}",
            keyword,
            expected,
            args.len()
        )));
    }
    Ok(())
}

fn single_arg(keyword: &str, args: &[&str]) -> Result<String> {
    arity(keyword, args, 1, 1)?;
    Ok(args[0].to_string())
}

fn int_arg(keyword: &str, what: &str, value: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| {
        SimError::InvalidArgument(format!(
            "{}: {} '{}' is not an integer",
            keyword, what, value
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::Config;
    use crate::fs::RamFs;
    use rtsim_common::ErrorClass;

    fn library() -> RtosLibrary<ManualClock> {
        RtosLibrary::with_parts(&Config::default(), ManualClock::new(), Box::new(RamFs::new()))
    }

    fn run(
        lib: &mut RtosLibrary<ManualClock>,
        name: &str,
        args: &[&str],
    ) -> Result<Option<String>> {
        let defaults = lib.defaults().clone();
        Keyword::parse(name, args, &defaults)?.execute(lib)
    }

    #[test]
    fn test_name_normalization() {
        let d = Defaults::default();
        let expected = Keyword::DeleteTask("a".into());
        for name in ["Delete Task", "delete_task", "DELETE TASK", "deletetask"] {
            assert_eq!(Keyword::parse(name, &["a"], &d).unwrap(), expected);
        }
        assert!(is_keyword("Wait For Timer"));
        assert!(!is_keyword("Should Be Equal"));
    }

    #[test]
    fn test_defaults_fill_optional_args() {
        let d = Defaults::default();
        assert_eq!(
            Keyword::parse("Create Task", &["t"], &d).unwrap(),
            Keyword::CreateTask {
                name: "t".into(),
                priority: 5
            }
        );
        assert_eq!(
            Keyword::parse("Create Semaphore", &["s"], &d).unwrap(),
            Keyword::CreateSemaphore {
                name: "s".into(),
                initial_count: 1
            }
        );
        assert_eq!(
            Keyword::parse("Create Timer", &["t", "1s"], &d).unwrap(),
            Keyword::CreateTimer {
                name: "t".into(),
                timeout: "1s".into(),
                kind: TimerKind::OneShot
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        let d = Defaults::default();
        let cases: [(&str, &[&str]); 6] = [
            ("Frobnicate", &["x"]),
            ("Create Task", &[]),
            ("Create Task", &["a", "high"]),
            ("Lock Mutex", &["a", "b"]),
            ("Create Timer", &["t", "1s", "sometimes"]),
            ("Timer Trigger Count Should Be", &["t", "-1"]),
        ];
        for (name, args) in cases {
            let err = Keyword::parse(name, args, &d).unwrap_err();
            assert_eq!(err.class(), ErrorClass::InvalidInput, "{} {:?}", name, args);
        }
    }

    #[test]
    fn test_single_argument_keywords() {
        let d = Defaults::default();
        for name in [
            "Delete Task",
            "Task Should Exist",
            "Task Should Not Exist",
            "Delete Semaphore",
            "Acquire Semaphore",
            "Release Semaphore",
            "Semaphore Should Be Available",
            "Semaphore Should Be Unavailable",
            "Create Mutex",
            "Delete Mutex",
            "Lock Mutex",
            "Unlock Mutex",
            "Mutex Should Be Locked",
            "Mutex Should Be Unlocked",
            "Delete Timer",
            "Start Timer",
            "Wait For Timer",
            "Timer Should Have Triggered",
            "Stop Timer",
            "Create File",
            "Delete File",
            "Read From File",
            "File Should Exist",
            "File Should Not Exist",
        ] {
            assert!(Keyword::parse(name, &["x"], &d).is_ok(), "{}", name);
            for args in [&[][..], &["x", "y"][..]] {
                let err = Keyword::parse(name, args, &d).unwrap_err();
                assert_eq!(err.class(), ErrorClass::InvalidInput, "{} {:?}", name, args);
            }
        }
        assert_eq!(
            Keyword::parse("Stop Timer", &["t"], &d).unwrap(),
            Keyword::StopTimer("t".into())
        );
    }

    #[test]
    fn test_task_keywords() {
        let mut lib = library();
        assert_eq!(
            run(&mut lib, "Change Task Priority", &["missing", "3"])
                .unwrap_err()
                .class(),
            ErrorClass::NotFound
        );
        run(&mut lib, "Create Task", &["a", "1"]).unwrap();
        run(&mut lib, "Task Priority Should Be", &["a", "1"]).unwrap();
        assert_eq!(
            run(&mut lib, "Task Priority Should Be", &["a", "2"])
                .unwrap_err()
                .class(),
            ErrorClass::PreconditionFailed
        );
    }

    #[test]
    fn test_timer_keywords() {
        let mut lib = library();
        assert_eq!(
            run(&mut lib, "Create Timer", &["x", "100xyz"])
                .unwrap_err()
                .class(),
            ErrorClass::InvalidDurationFormat
        );
        run(&mut lib, "Create Timer", &["p", "50ms", "periodic"]).unwrap();
        run(&mut lib, "Start Timer", &["p"]).unwrap();
        for _ in 0..3 {
            run(&mut lib, "Wait For Timer", &["p"]).unwrap();
        }
        run(&mut lib, "Timer Should Have Triggered", &["p"]).unwrap();
        run(&mut lib, "Timer Trigger Count Should Be", &["p", "3"]).unwrap();
        run(&mut lib, "Stop Timer", &["p"]).unwrap();
        assert!(run(&mut lib, "Wait For Timer", &["p"])
            .unwrap_err()
            .is_precondition_failure());
    }

    #[test]
    fn test_read_from_file_returns_content() {
        let mut lib = library();
        run(&mut lib, "Create File", &["f.txt"]).unwrap();
        run(&mut lib, "Write To File", &["f.txt", "Hello, RTOS!"]).unwrap();
        assert_eq!(
            run(&mut lib, "Read From File", &["f.txt"]).unwrap(),
            Some("Hello, RTOS!".to_string())
        );
        assert_eq!(run(&mut lib, "Delete File", &["f.txt"]).unwrap(), None);
    }
}

//! System-wide error types for rtsim.

use core::fmt;

/// Kinds of named entities tracked by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityKind {
    /// A task record.
    Task,
    /// A counting semaphore.
    Semaphore,
    /// A binary mutex.
    Mutex,
    /// A one-shot or periodic timer.
    Timer,
    /// A file in the file store.
    File,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Task => write!(f, "Task"),
            EntityKind::Semaphore => write!(f, "Semaphore"),
            EntityKind::Mutex => write!(f, "Mutex"),
            EntityKind::Timer => write!(f, "Timer"),
            EntityKind::File => write!(f, "File"),
        }
    }
}

/// Coarse classification of a [`SimError`].
///
/// Contention outcomes (`Unavailable`, `AlreadyLocked`, `AlreadyUnlocked`,
/// `NotStarted`) are all reported as [`ErrorClass::PreconditionFailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorClass {
    /// The operation named an entity that does not exist.
    NotFound,
    /// A create was rejected because the name is taken.
    AlreadyExists,
    /// The entity's state did not match what the operation required.
    PreconditionFailed,
    /// Malformed timer duration text.
    InvalidDurationFormat,
    /// Malformed keyword invocation (unknown name, bad arguments).
    InvalidInput,
    /// Host I/O failure in the file store.
    Io,
}

/// Error returned by every simulator operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimError {
    /// No entity of this kind has the given name.
    NotFound {
        /// Kind of entity looked up.
        kind: EntityKind,
        /// Name that was looked up.
        name: String,
    },
    /// Create refused because the name is already registered.
    AlreadyExists {
        /// Kind of entity being created.
        kind: EntityKind,
        /// Name that is taken.
        name: String,
    },
    /// An assertion-style check failed.
    PreconditionFailed(String),
    /// Semaphore count is not positive.
    Unavailable {
        /// Semaphore name.
        name: String,
    },
    /// Mutex is already locked.
    AlreadyLocked {
        /// Mutex name.
        name: String,
    },
    /// Mutex is already unlocked.
    AlreadyUnlocked {
        /// Mutex name.
        name: String,
    },
    /// Timer has no start instant.
    NotStarted {
        /// Timer name.
        name: String,
    },
    /// Duration text did not match `<number><ms|s>`.
    InvalidDurationFormat(String),
    /// Keyword arguments could not be interpreted.
    InvalidArgument(String),
    /// No keyword with this name.
    UnknownKeyword(String),
    /// Host file operation failed.
    Io {
        /// Path involved.
        path: String,
        /// Host error message.
        message: String,
    },
}

impl SimError {
    /// Shorthand for a [`SimError::NotFound`].
    pub fn not_found(kind: EntityKind, name: &str) -> Self {
        SimError::NotFound {
            kind,
            name: name.to_string(),
        }
    }

    /// Shorthand for a [`SimError::AlreadyExists`].
    pub fn already_exists(kind: EntityKind, name: &str) -> Self {
        SimError::AlreadyExists {
            kind,
            name: name.to_string(),
        }
    }

    /// Which of the broad error classes this error falls into.
    pub fn class(&self) -> ErrorClass {
        match self {
            SimError::NotFound { .. } => ErrorClass::NotFound,
            SimError::AlreadyExists { .. } => ErrorClass::AlreadyExists,
            SimError::PreconditionFailed(_)
            | SimError::Unavailable { .. }
            | SimError::AlreadyLocked { .. }
            | SimError::AlreadyUnlocked { .. }
            | SimError::NotStarted { .. } => ErrorClass::PreconditionFailed,
            SimError::InvalidDurationFormat(_) => ErrorClass::InvalidDurationFormat,
            SimError::InvalidArgument(_) | SimError::UnknownKeyword(_) => ErrorClass::InvalidInput,
            SimError::Io { .. } => ErrorClass::Io,
        }
    }

    /// True for every error of class [`ErrorClass::PreconditionFailed`].
    pub fn is_precondition_failure(&self) -> bool {
        self.class() == ErrorClass::PreconditionFailed
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::NotFound { kind, name } => write!(f, "{} '{}' does not exist.", kind, name),
            SimError::AlreadyExists { kind, name } => {
                write!(f, "{} '{}' already exists.", kind, name)
            }
            SimError::PreconditionFailed(msg) => write!(f, "{}", msg),
            SimError::Unavailable { name } => write!(f, "Semaphore '{}' is not available.", name),
            SimError::AlreadyLocked { name } => write!(f, "Mutex '{}' is already locked.", name),
            SimError::AlreadyUnlocked { name } => {
                write!(f, "Mutex '{}' is already unlocked.", name)
            }
            SimError::NotStarted { name } => write!(f, "Timer '{}' has not been started.", name),
            SimError::InvalidDurationFormat(text) => write!(f, "Invalid time format: {}", text),
            SimError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            SimError::UnknownKeyword(name) => write!(f, "No keyword with name '{}' found.", name),
            SimError::Io { path, message } => write!(f, "I/O error on '{}': {}", path, message),
        }
    }
}

impl std::error::Error for SimError {}

/// Result alias used throughout rtsim.
pub type Result<T> = core::result::Result<T, SimError>;

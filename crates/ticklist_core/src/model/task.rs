//! Task domain model.
//!
//! # Responsibility
//! - Define the single task record shared by store, persistence and FFI.
//! - Generate stable, monotonically increasing task identifiers.
//!
//! # Invariants
//! - `id` is unique per task and never reused, even for creations landing in
//!   the same millisecond.
//! - `text` must survive `validate()` before a task is persisted.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

/// Last identifier value handed out by `TaskId::generate`.
///
/// Guards monotonicity when two creations fall into the same millisecond.
static LAST_ISSUED_MS: Lazy<Mutex<i64>> = Lazy::new(|| Mutex::new(0));

/// Stable identifier for one task.
///
/// Stored and serialized as a string: the decimal epoch-millisecond value at
/// creation time, bumped past the previously issued id when the clock has not
/// advanced (or has moved backwards).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    /// Issues a fresh identifier from the process-wide monotonic source.
    pub fn generate() -> Self {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as i64)
            .unwrap_or(0);

        let mut last = LAST_ISSUED_MS
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let issued = if now_ms > *last { now_ms } else { *last + 1 };
        *last = issued;

        Self(issued.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TaskId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Validation failure for task field contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Task text is empty or whitespace-only.
    EmptyText,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "task text must not be empty or whitespace-only"),
        }
    }
}

impl Error for TaskValidationError {}

/// One to-do item.
///
/// Kept deliberately flat: identity, label, completion flag. The collection
/// holding tasks preserves insertion order and is the unit of persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Stable id assigned at creation, never reassigned.
    pub id: TaskId,
    /// User-supplied label. Stored as given; validation checks the trimmed
    /// form.
    pub text: String,
    /// Completion flag, `false` at creation.
    pub completed: bool,
}

impl Task {
    /// Creates a task with a freshly generated id and `completed = false`.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_id(TaskId::generate(), text)
    }

    /// Creates a task with a caller-provided id.
    ///
    /// Used when identity already exists, e.g. when rebuilding state from a
    /// persisted payload in tests.
    pub fn with_id(id: TaskId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            completed: false,
        }
    }

    /// Checks field-level invariants.
    ///
    /// # Errors
    /// - `TaskValidationError::EmptyText` when `text` trims to nothing.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        Ok(())
    }

    /// Flips the completion flag in place.
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }
}

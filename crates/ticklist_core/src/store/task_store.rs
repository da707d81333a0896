//! Task store: in-memory collection with write-through persistence.
//!
//! # Responsibility
//! - Apply add/edit/toggle/delete mutations against the in-memory collection.
//! - Mirror every mutation to the persistence adapter as a full-collection
//!   overwrite under one fixed key.
//!
//! # Invariants
//! - The in-memory collection is the visible source of truth; a failed write
//!   is returned to the caller but never rolls back the mutation.
//! - Empty or whitespace-only input to add/commit is a silent no-op, not an
//!   error.
//! - Mutations match tasks by id via linear scan; absent ids are no-ops.

use crate::model::task::{Task, TaskId, TaskValidationError};
use crate::storage::kv::{KvError, KvStore};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Fixed persistence key for the serialized task collection.
pub const TASKS_KEY: &str = "tasks";

pub type StoreResult<T> = Result<T, StoreError>;

/// Task store error taxonomy.
#[derive(Debug)]
pub enum StoreError {
    /// The in-memory collection could not be serialized for a write.
    Serialization(serde_json::Error),
    /// The persisted payload is malformed; fatal to the load operation.
    Deserialization(serde_json::Error),
    /// A persisted task violates field invariants.
    Validation(TaskValidationError),
    /// The persistence adapter failed; in-memory state stands regardless.
    Storage(KvError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Serialization(err) => write!(f, "failed to serialize task collection: {err}"),
            Self::Deserialization(err) => {
                write!(f, "malformed persisted task collection: {err}")
            }
            Self::Validation(err) => write!(f, "invalid persisted task: {err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Serialization(err) | Self::Deserialization(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<KvError> for StoreError {
    fn from(value: KvError) -> Self {
        Self::Storage(value)
    }
}

/// Pending-edit state: the active target and its working text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    /// Id of the task being edited.
    pub task_id: TaskId,
    /// Working copy of the task text, seeded from the task on `begin_edit`.
    pub buffer: String,
}

/// Owns the authoritative in-memory task collection and all mutation logic.
///
/// Generic over the persistence adapter so tests can substitute in-memory or
/// failing storage.
pub struct TaskStore<S: KvStore> {
    kv: S,
    tasks: Vec<Task>,
    edit: Option<PendingEdit>,
}

impl<S: KvStore> TaskStore<S> {
    /// Creates a store with an empty collection. Call `load` to restore
    /// persisted state.
    pub fn new(kv: S) -> Self {
        Self {
            kv,
            tasks: Vec::new(),
            edit: None,
        }
    }

    /// Restores the collection from the persistence adapter.
    ///
    /// An absent payload initializes an empty collection. A malformed payload
    /// or an invalid persisted task fails the load outright; no partial
    /// recovery is attempted.
    pub fn load(&mut self) -> StoreResult<()> {
        let tasks = match self.kv.read(TASKS_KEY)? {
            Some(payload) => {
                let tasks: Vec<Task> =
                    serde_json::from_str(&payload).map_err(StoreError::Deserialization)?;
                for task in &tasks {
                    task.validate()?;
                }
                tasks
            }
            None => Vec::new(),
        };

        info!(
            "event=tasks_load module=store status=ok count={}",
            tasks.len()
        );
        self.tasks = tasks;
        self.edit = None;
        Ok(())
    }

    /// Current collection in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Current pending-edit state, if any.
    pub fn pending_edit(&self) -> Option<&PendingEdit> {
        self.edit.as_ref()
    }

    /// Appends a new task built from `raw_text` and persists the collection.
    ///
    /// Whitespace-only input is silently ignored and returns `Ok(None)`. The
    /// stored text is the raw input, not the trimmed form.
    pub fn add(&mut self, raw_text: &str) -> StoreResult<Option<TaskId>> {
        if raw_text.trim().is_empty() {
            debug!("event=task_add module=store status=rejected reason=empty_text");
            return Ok(None);
        }

        let task = Task::new(raw_text);
        let id = task.id.clone();
        self.tasks.push(task);
        self.persist()?;

        info!("event=task_add module=store status=ok task_id={id}");
        Ok(Some(id))
    }

    /// Starts editing the task with `id`.
    ///
    /// Seeds the pending-edit buffer from the task's current text. Returns
    /// `false` without touching state when the id is absent. Does not mutate
    /// the collection.
    pub fn begin_edit(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.tasks.iter().find(|task| task.id == *id) else {
            debug!("event=task_edit module=store status=rejected reason=not_found task_id={id}");
            return false;
        };

        self.edit = Some(PendingEdit {
            task_id: task.id.clone(),
            buffer: task.text.clone(),
        });
        true
    }

    /// Replaces the active edit target's text and persists the collection.
    ///
    /// Returns `Ok(false)` without clearing the edit state when the trimmed
    /// input is empty or no edit is active. When the target task no longer
    /// exists the stale edit state is cleared and `Ok(false)` returned.
    /// `id` and `completed` of the edited task are preserved.
    pub fn commit_edit(&mut self, raw_text: &str) -> StoreResult<bool> {
        if raw_text.trim().is_empty() {
            debug!("event=task_commit_edit module=store status=rejected reason=empty_text");
            return Ok(false);
        }

        let Some(edit) = self.edit.as_ref() else {
            debug!("event=task_commit_edit module=store status=rejected reason=no_active_edit");
            return Ok(false);
        };
        let target_id = edit.task_id.clone();

        let Some(task) = self.tasks.iter_mut().find(|task| task.id == target_id) else {
            // Target was deleted while the edit was open; drop the stale edit.
            warn!(
                "event=task_commit_edit module=store status=rejected reason=target_gone task_id={target_id}"
            );
            self.edit = None;
            return Ok(false);
        };

        task.text = raw_text.to_string();
        self.edit = None;
        self.persist()?;

        info!("event=task_commit_edit module=store status=ok task_id={target_id}");
        Ok(true)
    }

    /// Clears pending-edit state without mutating the collection.
    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Flips `completed` on the matching task and persists the collection.
    ///
    /// Returns `Ok(false)` when the id is absent.
    pub fn toggle_completion(&mut self, id: &TaskId) -> StoreResult<bool> {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == *id) else {
            debug!("event=task_toggle module=store status=rejected reason=not_found task_id={id}");
            return Ok(false);
        };

        task.toggle();
        let completed = task.completed;
        self.persist()?;

        info!("event=task_toggle module=store status=ok task_id={id} completed={completed}");
        Ok(true)
    }

    /// Removes the matching task and persists the collection.
    ///
    /// Returns `Ok(false)` when the id is absent, so deleting the same id
    /// twice is a no-op on the second call. A pending edit targeting the
    /// deleted task is pruned. Removal is unconditional and immediate; any
    /// fade-out animation sequencing belongs to the presentation layer.
    pub fn delete(&mut self, id: &TaskId) -> StoreResult<bool> {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != *id);
        if self.tasks.len() == before {
            debug!("event=task_delete module=store status=rejected reason=not_found task_id={id}");
            return Ok(false);
        }

        if self
            .edit
            .as_ref()
            .is_some_and(|edit| edit.task_id == *id)
        {
            self.edit = None;
        }

        self.persist()?;

        info!("event=task_delete module=store status=ok task_id={id}");
        Ok(true)
    }

    /// Serializes the full collection and overwrites the persisted value.
    ///
    /// The in-memory mutation preceding this call is never rolled back on
    /// failure; the error is surfaced so callers can tell state diverged.
    fn persist(&self) -> StoreResult<()> {
        let payload = serde_json::to_string(&self.tasks).map_err(StoreError::Serialization)?;

        if let Err(err) = self.kv.write(TASKS_KEY, &payload) {
            warn!(
                "event=tasks_persist module=store status=error count={} error={}",
                self.tasks.len(),
                err
            );
            return Err(err.into());
        }

        Ok(())
    }
}

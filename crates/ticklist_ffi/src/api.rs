//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the presentation intents (add/edit/toggle/delete and list reads)
//!   to Dart via FRB.
//! - Keep error semantics simple for UI integration.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Mutations report whether they applied; storage failures travel in the
//!   response message instead of being swallowed.

use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use ticklist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, open_task_store,
    ping as ping_inner, SqliteKvStore, TaskId, TaskStore,
};

const DB_FILE_NAME: &str = "ticklist.sqlite3";

struct AppState {
    db_dir: PathBuf,
    store: Mutex<TaskStore<SqliteKvStore>>,
}

static APP_STATE: OnceLock<AppState> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on
///   failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One task as rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    /// Stable task id in string form.
    pub id: String,
    /// User-visible label.
    pub text: String,
    /// Completion flag.
    pub completed: bool,
}

/// Generic action response envelope for mutation intents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    /// Whether the mutation applied. `false` covers both silent no-ops
    /// (empty input, unknown id) and failures; `message` tells them apart.
    pub ok: bool,
    /// Id of the created task for `add_task`, `None` otherwise.
    pub task_id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

/// Response envelope for the ordered task-list read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListResponse {
    /// Tasks in insertion order.
    pub items: Vec<TaskItem>,
    /// Human-readable response message for diagnostics.
    pub message: String,
}

/// Response envelope for the pending-edit read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditStateResponse {
    /// Active edit target id, `None` when idle.
    pub active_task_id: Option<String>,
    /// Current edit buffer, empty when idle.
    pub buffer: String,
}

/// Opens (or creates) the task database under `db_dir` and restores the
/// persisted collection into the process-wide store.
///
/// # FFI contract
/// - Sync call; performs file-system and SQLite setup work.
/// - Idempotent for the same `db_dir`; a different directory is rejected.
/// - Never panics; failures are reported through the response envelope.
#[flutter_rust_bridge::frb(sync)]
pub fn init_tasks(db_dir: String) -> TaskActionResponse {
    let dir = PathBuf::from(db_dir);

    if let Some(state) = APP_STATE.get() {
        if state.db_dir == dir {
            return ok_response(None, "task store already initialized");
        }
        return failure(format!(
            "task store already initialized at `{}`; refusing to switch to `{}`",
            state.db_dir.display(),
            dir.display()
        ));
    }

    if let Err(err) = std::fs::create_dir_all(&dir) {
        return failure(format!(
            "failed to create data directory `{}`: {err}",
            dir.display()
        ));
    }

    let store = match open_task_store(dir.join(DB_FILE_NAME)) {
        Ok(store) => store,
        Err(err) => return failure(format!("failed to initialize task store: {err}")),
    };

    let state = AppState {
        db_dir: dir,
        store: Mutex::new(store),
    };
    if APP_STATE.set(state).is_err() {
        // Lost an init race; the winning configuration is authoritative.
        return ok_response(None, "task store already initialized");
    }

    ok_response(None, "task store initialized")
}

/// Returns the current task collection in insertion order.
///
/// # FFI contract
/// - Sync call, non-blocking beyond store lock acquisition.
/// - Never panics; returns an empty list with a message before `init_tasks`.
#[flutter_rust_bridge::frb(sync)]
pub fn list_tasks() -> TaskListResponse {
    let Some(store) = lock_store() else {
        return TaskListResponse {
            items: Vec::new(),
            message: "task store not initialized".to_string(),
        };
    };

    let items = store
        .tasks()
        .iter()
        .map(|task| TaskItem {
            id: task.id.to_string(),
            text: task.text.clone(),
            completed: task.completed,
        })
        .collect();

    TaskListResponse {
        items,
        message: String::new(),
    }
}

/// Returns the current pending-edit state for rendering.
///
/// # FFI contract
/// - Sync call; never panics. Reports idle state before `init_tasks`.
#[flutter_rust_bridge::frb(sync)]
pub fn edit_state() -> EditStateResponse {
    let Some(store) = lock_store() else {
        return EditStateResponse {
            active_task_id: None,
            buffer: String::new(),
        };
    };

    match store.pending_edit() {
        Some(edit) => EditStateResponse {
            active_task_id: Some(edit.task_id.to_string()),
            buffer: edit.buffer.clone(),
        },
        None => EditStateResponse {
            active_task_id: None,
            buffer: String::new(),
        },
    }
}

/// Appends a new task. Whitespace-only input is a silent no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn add_task(text: String) -> TaskActionResponse {
    with_store(|store| match store.add(&text) {
        Ok(Some(id)) => ok_response(Some(id.to_string()), ""),
        Ok(None) => rejected("empty task text ignored"),
        Err(err) => failure(err.to_string()),
    })
}

/// Starts editing the task with `task_id`, seeding the edit buffer.
#[flutter_rust_bridge::frb(sync)]
pub fn begin_edit(task_id: String) -> TaskActionResponse {
    with_store(|store| {
        if store.begin_edit(&TaskId::from(task_id)) {
            ok_response(None, "")
        } else {
            rejected("task not found")
        }
    })
}

/// Commits the active edit with the replacement text.
#[flutter_rust_bridge::frb(sync)]
pub fn commit_edit(text: String) -> TaskActionResponse {
    with_store(|store| match store.commit_edit(&text) {
        Ok(true) => ok_response(None, ""),
        Ok(false) => rejected("edit not applied"),
        Err(err) => failure(err.to_string()),
    })
}

/// Abandons the active edit without touching the collection.
#[flutter_rust_bridge::frb(sync)]
pub fn cancel_edit() -> TaskActionResponse {
    with_store(|store| {
        store.cancel_edit();
        ok_response(None, "")
    })
}

/// Flips the completion flag on the task with `task_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn toggle_task(task_id: String) -> TaskActionResponse {
    with_store(|store| match store.toggle_completion(&TaskId::from(task_id)) {
        Ok(true) => ok_response(None, ""),
        Ok(false) => rejected("task not found"),
        Err(err) => failure(err.to_string()),
    })
}

/// Deletes the task with `task_id`. Deleting an unknown id is a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn delete_task(task_id: String) -> TaskActionResponse {
    with_store(|store| match store.delete(&TaskId::from(task_id)) {
        Ok(true) => ok_response(None, ""),
        Ok(false) => rejected("task not found"),
        Err(err) => failure(err.to_string()),
    })
}

fn lock_store() -> Option<MutexGuard<'static, TaskStore<SqliteKvStore>>> {
    let state = APP_STATE.get()?;
    // A poisoned lock means a panic mid-mutation; the in-memory collection
    // is still the visible source of truth, so keep serving it.
    Some(
        state
            .store
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()),
    )
}

fn with_store(
    apply: impl FnOnce(&mut TaskStore<SqliteKvStore>) -> TaskActionResponse,
) -> TaskActionResponse {
    match lock_store() {
        Some(mut store) => apply(&mut store),
        None => {
            warn!("event=ffi_call module=ffi status=rejected reason=store_uninitialized");
            failure("task store not initialized; call init_tasks first".to_string())
        }
    }
}

fn ok_response(task_id: Option<String>, message: &str) -> TaskActionResponse {
    TaskActionResponse {
        ok: true,
        task_id,
        message: message.to_string(),
    }
}

fn rejected(message: &str) -> TaskActionResponse {
    TaskActionResponse {
        ok: false,
        task_id: None,
        message: message.to_string(),
    }
}

fn failure(message: String) -> TaskActionResponse {
    TaskActionResponse {
        ok: false,
        task_id: None,
        message,
    }
}

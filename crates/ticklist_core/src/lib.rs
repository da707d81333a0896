//! Core domain logic for Ticklist.
//! This crate is the single source of truth for business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{Task, TaskId, TaskValidationError};
pub use storage::kv::{KvError, KvResult, KvStore, SqliteKvStore};
pub use store::task_store::{PendingEdit, StoreError, StoreResult, TaskStore, TASKS_KEY};

use std::path::Path;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Opens the on-disk store at `path` and restores the persisted collection.
///
/// Convenience for FFI/CLI callers so they never touch connection types.
///
/// # Errors
/// - `StoreError::Storage` when the database cannot be opened.
/// - `StoreError::Deserialization` / `StoreError::Validation` when the
///   persisted payload is unusable.
pub fn open_task_store(path: impl AsRef<Path>) -> StoreResult<TaskStore<SqliteKvStore>> {
    let conn = db::open_db(path).map_err(KvError::Unavailable)?;
    let mut store = TaskStore::new(SqliteKvStore::new(conn));
    store.load()?;
    Ok(store)
}

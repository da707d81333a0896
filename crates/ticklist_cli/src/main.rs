//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `ticklist_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

use ticklist_core::db::open_db_in_memory;
use ticklist_core::{SqliteKvStore, TaskStore};

fn main() {
    println!("ticklist_core ping={}", ticklist_core::ping());
    println!("ticklist_core version={}", ticklist_core::core_version());

    // Round-trip one task through an in-memory store to exercise the full
    // mutation and persistence path without touching the file system.
    let smoke = || -> ticklist_core::StoreResult<usize> {
        let conn = open_db_in_memory().map_err(ticklist_core::KvError::Unavailable)?;
        let mut store = TaskStore::new(SqliteKvStore::new(conn));
        store.load()?;
        store.add("smoke task")?;
        Ok(store.tasks().len())
    };

    match smoke() {
        Ok(count) => println!("ticklist_core smoke_tasks={count}"),
        Err(err) => println!("ticklist_core smoke_error={err}"),
    }
}

//! Key-value persistence contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide durable get/set of serialized payloads under fixed keys.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `read` distinguishes "never written" (`Ok(None)`) from storage failure.
//! - `write` overwrites any prior value for the key.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type KvResult<T> = Result<T, KvError>;

/// Persistence adapter error.
#[derive(Debug)]
pub enum KvError {
    /// The underlying storage could not be accessed.
    Unavailable(DbError),
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(err) => write!(f, "storage unavailable: {err}"),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) => Some(err),
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Unavailable(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Unavailable(DbError::Sqlite(value))
    }
}

/// Durable key-value storage of serialized payloads.
pub trait KvStore {
    /// Returns the stored value, or `None` when the key was never written.
    fn read(&self, key: &str) -> KvResult<Option<String>>;

    /// Stores `value` under `key`, overwriting any prior value.
    fn write(&self, key: &str, value: &str) -> KvResult<()>;
}

/// SQLite-backed key-value store over the `kv_store` table.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Wraps a bootstrapped connection (see `db::open_db`).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl KvStore for SqliteKvStore {
    fn read(&self, key: &str) -> KvResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    fn write(&self, key: &str, value: &str) -> KvResult<()> {
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;

        Ok(())
    }
}

//! Persistence adapter layer.
//!
//! # Responsibility
//! - Define the key-value storage contract used by the task store.
//! - Isolate SQLite details from store/business orchestration.
//!
//! # Invariants
//! - A write is a full overwrite of the value under its key.
//! - Storage failures surface as `KvError::Unavailable`; the adapter never
//!   retries on its own.

pub mod kv;

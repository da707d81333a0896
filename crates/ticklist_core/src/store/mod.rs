//! Authoritative task-collection state and mutation logic.
//!
//! # Responsibility
//! - Own the in-memory task collection and the pending-edit state.
//! - Write every mutation through the persistence adapter.
//!
//! # Invariants
//! - Task ids in the collection are pairwise distinct.
//! - Insertion order is preserved across toggle and edit.

pub mod task_store;

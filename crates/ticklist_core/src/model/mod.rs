//! Domain model for the to-do list.
//!
//! # Responsibility
//! - Define the canonical task record and its identity scheme.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId` that is never reassigned.
//! - Persisted task text is never empty or whitespace-only.

pub mod task;

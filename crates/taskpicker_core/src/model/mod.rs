//! Task domain model.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep creation-boundary validation next to the record it protects.
//!
//! # Invariants
//! - Every task is identified by a store-assigned `TaskId`.
//! - Tasks are never physically deleted.

pub mod task;

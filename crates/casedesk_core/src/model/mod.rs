//! Domain models for the CaseDesk data-access layer.
//!
//! # Responsibility
//! - Define the canonical persisted shape of an epic and its read models.
//! - Define the audit-log entry recorded for mutating actions.
//!
//! # Invariants
//! - Every persisted record is identified by a stable UUID.
//! - Read models carry the `assign_case` association already expanded.

pub mod audit;
pub mod epic;

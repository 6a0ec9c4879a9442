//! Audit-log domain model.
//!
//! # Responsibility
//! - Define the append-only record written for mutating entity actions.
//!
//! # Invariants
//! - Entries are never updated or deleted once appended.
//! - `values` is `None` for delete actions.

use crate::model::epic::UserId;
use serde::{Deserialize, Serialize};

/// Kind of mutating action recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
}

/// One audit entry to append.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Entity type name, e.g. `epic`.
    pub entity_name: String,
    /// External id of the affected entity.
    pub entity_id: String,
    pub action: AuditAction,
    /// Value payload captured with the action. `None` on delete.
    pub values: Option<serde_json::Value>,
    /// Acting user, when one was resolved for the call.
    pub created_by: Option<UserId>,
}

/// One persisted audit entry as read back from the sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Monotonic row id assigned by the sink.
    pub id: i64,
    pub entity_name: String,
    pub entity_id: String,
    pub action: AuditAction,
    pub values: Option<serde_json::Value>,
    pub created_by: Option<UserId>,
    /// Append timestamp in epoch milliseconds.
    pub created_at: i64,
}

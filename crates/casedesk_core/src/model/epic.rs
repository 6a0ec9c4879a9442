//! Epic domain model.
//!
//! # Responsibility
//! - Define the create input and read-model shapes for epic records.
//! - Keep the `assign_case` association expanded on every read path.
//!
//! # Invariants
//! - `id` is stable and never reused for another epic.
//! - `created_by`/`updated_by` always reference the acting user captured at
//!   call time; this layer never persists an epic without them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of an epic record.
pub type EpicId = Uuid;

/// Stable identifier of a case record (association target).
pub type CaseId = Uuid;

/// Stable identifier of an acting user.
pub type UserId = Uuid;

/// Categorical gender value stored on an epic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Field values for creating one epic.
///
/// This layer performs no schema validation of its own; the store rejects
/// rows that violate its constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEpic {
    pub name: String,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    /// Unix epoch milliseconds.
    pub birthdate: Option<i64>,
    /// Reference to the case this epic is assigned to.
    pub assign_case: Option<CaseId>,
}

impl NewEpic {
    /// Creates an input with only the name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Expanded `assign_case` association on a read model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseRef {
    pub id: CaseId,
    pub name: String,
}

/// Read model returned by every epic read path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpicRecord {
    pub id: EpicId,
    pub name: String,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    /// Unix epoch milliseconds.
    pub birthdate: Option<i64>,
    /// Expanded association, `None` when unassigned.
    pub assign_case: Option<CaseRef>,
    /// Creation timestamp in epoch milliseconds.
    pub created_at: i64,
    /// Update timestamp in epoch milliseconds.
    pub updated_at: i64,
    pub created_by: UserId,
    pub updated_by: UserId,
}

/// Reduced `{id, label}` projection for suggestion lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteHit {
    pub id: EpicId,
    /// The epic's name.
    pub label: String,
}

//! Request-scoped call context.
//!
//! # Responsibility
//! - Carry the resolved acting user into repository mutations.
//!
//! # Invariants
//! - Context is built once per request by the caller and passed explicitly;
//!   no ambient/global user lookup happens in this crate.

use crate::model::epic::UserId;
use serde::{Deserialize, Serialize};

/// The acting user resolved by an outer layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
}

/// Per-call context threaded through repository mutations.
///
/// Transaction scoping is not part of this struct: callers that need
/// multiple repository calls in one atomic unit pass the same
/// `rusqlite::Transaction` (which derefs to `Connection`) to every
/// repository they construct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Acting user, `None` for anonymous/system callers.
    pub current_user: Option<CurrentUser>,
}

impl RequestContext {
    /// Context without an acting user.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context acting on behalf of the given user.
    pub fn for_user(id: UserId) -> Self {
        Self {
            current_user: Some(CurrentUser { id }),
        }
    }
}

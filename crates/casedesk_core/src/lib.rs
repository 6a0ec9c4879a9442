//! Core data-access layer for CaseDesk.
//! This crate is the single source of truth for epic persistence behavior.

pub mod context;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use context::{CurrentUser, RequestContext};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::audit::{AuditAction, AuditEntry, AuditRecord};
pub use model::epic::{
    AutocompleteHit, CaseId, CaseRef, EpicId, EpicRecord, Gender, NewEpic, UserId,
};
pub use repo::audit_repo::{AuditLogRepository, SqliteAuditLogRepository};
pub use repo::epic_repo::{
    DateRange, EpicFilter, EpicListQuery, EpicPage, EpicRepository, RawCriteria, RepoError,
    RepoResult, SqliteEpicRepository, EPIC_ENTITY_NAME,
};
pub use service::epic_service::EpicService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

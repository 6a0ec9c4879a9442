//! Epic use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for epic data access.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository contracts.
//! - Service layer remains storage-agnostic.

use crate::context::RequestContext;
use crate::model::epic::{AutocompleteHit, EpicId, EpicRecord, NewEpic};
use crate::repo::epic_repo::{EpicListQuery, EpicPage, EpicRepository, RawCriteria, RepoResult};

/// Use-case service wrapper for epic data access.
pub struct EpicService<R: EpicRepository> {
    repo: R,
}

impl<R: EpicRepository> EpicService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates one epic on behalf of the context's acting user.
    ///
    /// # Contract
    /// - Fails when no current user is resolved.
    /// - Returns the freshly read record with the association expanded.
    pub fn create_epic(&self, new: &NewEpic, ctx: &RequestContext) -> RepoResult<EpicRecord> {
        self.repo.create_epic(new, ctx)
    }

    /// Deletes one epic by id and records the action in the audit log.
    ///
    /// Absence of the id is not an error; the audit entry is written
    /// regardless.
    pub fn destroy_epic(&self, id: EpicId, ctx: &RequestContext) -> RepoResult<()> {
        self.repo.destroy_epic(id, ctx)
    }

    /// Counts epics matching a store-native criteria passthrough.
    pub fn count_epics(&self, filter: Option<&RawCriteria>) -> RepoResult<u64> {
        self.repo.count_epics(filter)
    }

    /// Gets one epic by id.
    pub fn get_epic(&self, id: EpicId) -> RepoResult<Option<EpicRecord>> {
        self.repo.get_epic(id)
    }

    /// Lists one page of epics with the full matching-set total.
    pub fn list_epics(&self, query: &EpicListQuery) -> RepoResult<EpicPage> {
        self.repo.list_epics(query)
    }

    /// Returns `{id, label}` suggestions for the given search text.
    pub fn autocomplete_epics(
        &self,
        search: &str,
        limit: u32,
    ) -> RepoResult<Vec<AutocompleteHit>> {
        self.repo.autocomplete_epics(search, limit)
    }
}

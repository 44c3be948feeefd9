//! Resolution use-case service.
//!
//! # Responsibility
//! - Provide list/update entry points for the admin surface.
//! - Seed a fresh database with a published resolution list.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - Updates return the row as read back after the write.

use crate::model::resolution::{Resolution, ResolutionId, ResolutionPatch, DEFAULT_RESOLUTION_STATUS};
use crate::repo::resolution_repo::{RepoError, RepoResult, ResolutionRepository};
use log::info;

/// Use-case service wrapper for resolution operations.
pub struct ResolutionService<R: ResolutionRepository> {
    repo: R,
}

impl<R: ResolutionRepository> ResolutionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists resolutions in display order.
    pub fn list(&self) -> RepoResult<Vec<Resolution>> {
        self.repo.list_resolutions()
    }

    pub fn get(&self, id: ResolutionId) -> RepoResult<Option<Resolution>> {
        self.repo.get_resolution(id)
    }

    /// Creates one resolution with the default status.
    pub fn create(&self, text: &str) -> RepoResult<Resolution> {
        let id = self
            .repo
            .create_resolution(text, DEFAULT_RESOLUTION_STATUS)?;
        self.read_back(id)
    }

    /// Applies `patch` and returns the stored row.
    pub fn update(&self, id: ResolutionId, patch: &ResolutionPatch) -> RepoResult<Resolution> {
        self.repo.update_resolution(id, patch)?;
        info!(
            "event=resolution_update module=service status=ok id={id} text_changed={} status_changed={}",
            patch.effective_text().is_some(),
            patch.effective_status().is_some()
        );
        self.read_back(id)
    }

    /// Inserts `texts` in order when the table is empty.
    ///
    /// Returns the number of rows inserted.
    pub fn seed_if_empty<T: AsRef<str>>(&self, texts: &[T]) -> RepoResult<usize> {
        if self.repo.count_resolutions()? > 0 {
            return Ok(0);
        }
        for text in texts {
            self.repo
                .create_resolution(text.as_ref(), DEFAULT_RESOLUTION_STATUS)?;
        }
        info!(
            "event=resolution_seed module=service status=ok inserted={}",
            texts.len()
        );
        Ok(texts.len())
    }

    fn read_back(&self, id: ResolutionId) -> RepoResult<Resolution> {
        self.repo
            .get_resolution(id)?
            .ok_or(RepoError::NotFound(id))
    }
}

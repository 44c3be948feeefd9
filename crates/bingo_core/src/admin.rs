//! Admin page state over a resolution source.
//!
//! # Responsibility
//! - Hold the operator's view of published resolutions.
//! - Turn source failures into generic user-facing notices.
//!
//! # Invariants
//! - A failed fetch or update leaves `resolutions` exactly as before.
//! - Notices never carry backend error details.

use crate::model::resolution::{Resolution, ResolutionId, ResolutionPatch};
use crate::repo::resolution_repo::{RepoError, ResolutionRepository};
use crate::service::resolution_service::ResolutionService;
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

const FETCH_FAILED_MESSAGE: &str = "Couldn't fetch resolutions";
const UPDATE_FAILED_MESSAGE: &str = "Couldn't update resolution";
const UPDATE_OK_MESSAGE: &str = "Status updated";

/// Failure reported by a resolution source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    NotFound(ResolutionId),
    Unauthorized,
    Rejected(String),
    Unavailable(String),
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "resolution not found: {id}"),
            Self::Unauthorized => write!(f, "not authenticated"),
            Self::Rejected(message) => write!(f, "request rejected: {message}"),
            Self::Unavailable(message) => write!(f, "source unavailable: {message}"),
        }
    }
}

impl Error for SourceError {}

impl From<RepoError> for SourceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Rejected(err.to_string()),
            other => Self::Unavailable(other.to_string()),
        }
    }
}

/// Where the admin page reads and writes resolutions.
pub trait ResolutionSource {
    fn fetch(&self) -> Result<Vec<Resolution>, SourceError>;
    fn update(&self, id: ResolutionId, patch: &ResolutionPatch) -> Result<Resolution, SourceError>;
}

impl<R: ResolutionRepository> ResolutionSource for ResolutionService<R> {
    fn fetch(&self) -> Result<Vec<Resolution>, SourceError> {
        Ok(self.list()?)
    }

    fn update(&self, id: ResolutionId, patch: &ResolutionPatch) -> Result<Resolution, SourceError> {
        Ok(ResolutionService::update(self, id, patch)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// User-visible toast-style message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: &'static str,
}

impl Notice {
    fn success(message: &'static str) -> Self {
        Self {
            level: NoticeLevel::Success,
            message,
        }
    }

    fn error(message: &'static str) -> Self {
        Self {
            level: NoticeLevel::Error,
            message,
        }
    }
}

pub struct AdminBoard<S: ResolutionSource> {
    source: S,
    resolutions: Vec<Resolution>,
}

impl<S: ResolutionSource> AdminBoard<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            resolutions: Vec::new(),
        }
    }

    pub fn resolutions(&self) -> &[Resolution] {
        &self.resolutions
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Reloads the list; keeps the previous list on failure.
    pub fn refresh(&mut self) -> Option<Notice> {
        match self.source.fetch() {
            Ok(resolutions) => {
                self.resolutions = resolutions;
                None
            }
            Err(err) => {
                warn!("event=admin_fetch module=admin status=error error={err}");
                Some(Notice::error(FETCH_FAILED_MESSAGE))
            }
        }
    }

    /// Sends a new status for `id`.
    ///
    /// Returns `None` when there is nothing to send (blank or unchanged
    /// status). On success the local row is replaced by the stored one.
    pub fn update_status(&mut self, id: ResolutionId, status: &str) -> Option<Notice> {
        let status = status.trim();
        let current = self.resolutions.iter().find(|row| row.id == id);
        if status.is_empty() || current.is_some_and(|row| row.status == status) {
            return None;
        }
        self.apply(id, &ResolutionPatch::status(status))
    }

    /// Sends a text and/or status change for `id`.
    pub fn update(&mut self, id: ResolutionId, patch: &ResolutionPatch) -> Option<Notice> {
        if patch.is_empty() {
            return None;
        }
        self.apply(id, patch)
    }

    fn apply(&mut self, id: ResolutionId, patch: &ResolutionPatch) -> Option<Notice> {
        match self.source.update(id, patch) {
            Ok(updated) => {
                match self.resolutions.iter_mut().find(|row| row.id == id) {
                    Some(row) => *row = updated,
                    None => self.resolutions.push(updated),
                }
                Some(Notice::success(UPDATE_OK_MESSAGE))
            }
            Err(err) => {
                warn!("event=admin_update module=admin status=error id={id} error={err}");
                Some(Notice::error(UPDATE_FAILED_MESSAGE))
            }
        }
    }
}

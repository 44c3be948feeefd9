//! Resolution repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/get/create/update APIs over the `resolutions` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate text before SQL mutations.
//! - Blank patch fields never overwrite stored values.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::resolution::{
    validate_text, Resolution, ResolutionId, ResolutionPatch, ResolutionValidationError,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const RESOLUTION_SELECT_SQL: &str = "SELECT
    id,
    text,
    status,
    position,
    updated_at
FROM resolutions";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for resolution persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ResolutionValidationError),
    Db(DbError),
    NotFound(ResolutionId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "resolution not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted resolution data: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ResolutionValidationError> for RepoError {
    fn from(value: ResolutionValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for admin-managed resolutions.
pub trait ResolutionRepository {
    fn create_resolution(&self, text: &str, status: &str) -> RepoResult<ResolutionId>;
    fn get_resolution(&self, id: ResolutionId) -> RepoResult<Option<Resolution>>;
    fn list_resolutions(&self) -> RepoResult<Vec<Resolution>>;
    fn update_resolution(&self, id: ResolutionId, patch: &ResolutionPatch) -> RepoResult<()>;
    fn count_resolutions(&self) -> RepoResult<u64>;
}

/// SQLite-backed resolution repository.
pub struct SqliteResolutionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteResolutionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl ResolutionRepository for SqliteResolutionRepository<'_> {
    /// Appends a resolution after the current last position.
    fn create_resolution(&self, text: &str, status: &str) -> RepoResult<ResolutionId> {
        let text = text.trim();
        validate_text(text)?;

        self.conn.execute(
            "INSERT INTO resolutions (text, status, position)
             VALUES (
                ?1,
                ?2,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM resolutions)
             );",
            params![text, status.trim()],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn get_resolution(&self, id: ResolutionId) -> RepoResult<Option<Resolution>> {
        let row = self
            .conn
            .query_row(
                &format!("{RESOLUTION_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(parse_resolution_row(row)),
            )
            .optional()?;

        row.transpose()
    }

    fn list_resolutions(&self) -> RepoResult<Vec<Resolution>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESOLUTION_SELECT_SQL} ORDER BY position ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut resolutions = Vec::new();

        while let Some(row) = rows.next()? {
            resolutions.push(parse_resolution_row(row)?);
        }

        Ok(resolutions)
    }

    fn update_resolution(&self, id: ResolutionId, patch: &ResolutionPatch) -> RepoResult<()> {
        patch.validate()?;

        // An empty patch still bumps `updated_at`.
        let changed = self.conn.execute(
            "UPDATE resolutions
             SET
                text = COALESCE(?1, text),
                status = COALESCE(?2, status),
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3;",
            params![patch.effective_text(), patch.effective_status(), id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn count_resolutions(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM resolutions;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }
}

fn parse_resolution_row(row: &Row<'_>) -> RepoResult<Resolution> {
    let text: String = row.get("text")?;
    if text.trim().is_empty() {
        return Err(RepoError::InvalidData(
            "empty value in resolutions.text".to_string(),
        ));
    }

    Ok(Resolution {
        id: row.get("id")?,
        text,
        status: row.get("status")?,
        position: row.get("position")?,
        updated_at_ms: row.get("updated_at")?,
    })
}

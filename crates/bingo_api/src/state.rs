//! Shared handler state.
//!
//! # Invariants
//! - One SQLite connection per state, serialized behind a mutex.
//! - Without a configured admin token no request is authenticated.

use axum::http::HeaderMap;
use bingo_core::{ResolutionService, SqliteResolutionRepository};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

/// Header carrying the operator's admin token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

#[derive(Clone)]
pub struct ApiState {
    conn: Arc<Mutex<Connection>>,
    admin_token: Option<Arc<str>>,
}

impl ApiState {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            admin_token: None,
        }
    }

    /// Blank tokens are ignored.
    pub fn with_admin_token(mut self, token: &str) -> Self {
        let token = token.trim();
        self.admin_token = (!token.is_empty()).then(|| Arc::from(token));
        self
    }

    /// Runs `op` against a resolution service on the shared connection.
    pub fn with_service<T>(
        &self,
        op: impl FnOnce(&ResolutionService<SqliteResolutionRepository<'_>>) -> T,
    ) -> T {
        let conn = self.conn.lock().unwrap_or_else(|e| e.into_inner());
        let service = ResolutionService::new(SqliteResolutionRepository::new(&conn));
        op(&service)
    }

    pub fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.admin_token.as_deref() else {
            return false;
        };
        headers
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|provided| provided == expected)
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiState, ADMIN_TOKEN_HEADER};
    use axum::http::{HeaderMap, HeaderValue};
    use bingo_core::db::open_db_in_memory;

    fn headers(token: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ADMIN_TOKEN_HEADER, HeaderValue::from_static(token));
        headers
    }

    #[test]
    fn token_must_match_exactly() {
        let state = ApiState::new(open_db_in_memory().unwrap()).with_admin_token(" s3cret ");
        assert!(state.is_authenticated(&headers("s3cret")));
        assert!(!state.is_authenticated(&headers("S3CRET")));
        assert!(!state.is_authenticated(&HeaderMap::new()));
    }

    #[test]
    fn no_token_means_nobody_is_authenticated() {
        let state = ApiState::new(open_db_in_memory().unwrap()).with_admin_token("   ");
        assert!(!state.is_authenticated(&headers("")));
        assert!(!state.is_authenticated(&HeaderMap::new()));
    }
}

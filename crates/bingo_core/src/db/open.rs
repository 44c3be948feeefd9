//! Connection bootstrap.

use super::migrations::apply_migrations;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

enum Target<'a> {
    File(&'a Path),
    Memory,
}

impl Target<'_> {
    fn label(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::Memory => "memory",
        }
    }

    fn connect(&self) -> rusqlite::Result<Connection> {
        match self {
            Self::File(path) => Connection::open(path),
            Self::Memory => Connection::open_in_memory(),
        }
    }
}

/// Opens (creating if needed) the database file at `path`, migrated to the
/// latest schema.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open(Target::File(path.as_ref()))
}

/// Private, migrated database that lives as long as the connection.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open(Target::Memory)
}

fn open(target: Target<'_>) -> DbResult<Connection> {
    let started_at = Instant::now();
    let opened = target
        .connect()
        .map_err(DbError::from)
        .and_then(|mut conn| {
            conn.busy_timeout(BUSY_TIMEOUT)?;
            conn.pragma_update(None, "foreign_keys", true)?;
            apply_migrations(&mut conn)?;
            Ok(conn)
        });

    let elapsed_ms = started_at.elapsed().as_millis();
    match &opened {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={} duration_ms={elapsed_ms}",
            target.label()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={elapsed_ms} error={err}",
            target.label()
        ),
    }
    opened
}

//! Ordered schema scripts.
//!
//! Each script runs in its own transaction together with the matching
//! `user_version` bump. Versions only ever grow; never edit a shipped script.

use crate::db::{schema_version, DbError, DbResult};
use log::info;
use rusqlite::Connection;

const SCRIPTS: &[(u32, &str)] = &[
    (1, include_str!("0001_kv_entries.sql")),
    (2, include_str!("0002_resolutions.sql")),
];

/// Highest schema version this build can write.
pub fn latest_version() -> u32 {
    SCRIPTS.last().map_or(0, |(version, _)| *version)
}

/// Brings `conn` up to `latest_version()`.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    for &(version, sql) in SCRIPTS.iter().filter(|(version, _)| *version > from) {
        let run = |conn: &mut Connection| -> rusqlite::Result<()> {
            let tx = conn.transaction()?;
            tx.execute_batch(sql)?;
            tx.pragma_update(None, "user_version", version)?;
            tx.commit()
        };
        run(conn).map_err(|source| DbError::Migration { version, source })?;
        info!("event=db_migrate module=db status=ok version={version}");
    }
    Ok(())
}

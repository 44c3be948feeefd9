//! SQLite-backed durable storage over the `kv_entries` table.
//!
//! # Invariants
//! - Connection must come from `db::open_db*` so `kv_entries` exists.

use super::{BoardStorage, StorageResult};
use rusqlite::{params, Connection, OptionalExtension};

pub struct SqliteStorage<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStorage<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BoardStorage for SqliteStorage<'_> {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

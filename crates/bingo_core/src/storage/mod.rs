//! Durable key-value storage for board state.
//!
//! # Responsibility
//! - Define the string-keyed storage contract the board persists into.
//! - Derive the canonical per-board keys.
//! - Decode JSON entries, classifying absent and malformed values.
//!
//! # Invariants
//! - Absence of an entry is a valid "not yet initialized" state.
//! - Malformed entries are reported as `Malformed`, never as a hard error,
//!   so callers can re-initialize that piece of state.

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::SqliteStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Storage backend failure.
#[derive(Debug)]
pub enum StorageError {
    /// Backend rejected the operation (I/O, quota, SQL error).
    Backend(String),
    /// Value could not be encoded before writing.
    Encode(serde_json::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(message) => write!(f, "storage backend error: {message}"),
            Self::Encode(err) => write!(f, "failed to encode storage value: {err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Backend(value.to_string())
    }
}

/// String-keyed storage contract, shaped like browser local storage.
pub trait BoardStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

impl<S: BoardStorage + ?Sized> BoardStorage for &S {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        (**self).remove(key)
    }
}

/// Canonical storage keys for one board instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub order: String,
    pub completed: String,
    pub annotations: String,
    /// Set once the board has celebrated a full card.
    pub celebrated: String,
    /// Submitted goals and grid size, owned by front ends rather than the board.
    pub submission: String,
}

impl StorageKeys {
    pub fn for_board(board_key: &str) -> Self {
        let board_key = board_key.trim();
        Self {
            order: format!("{board_key}:order"),
            completed: format!("{board_key}:completed"),
            annotations: format!("{board_key}:annotations"),
            celebrated: format!("{board_key}:celebrated"),
            submission: format!("{board_key}:submission"),
        }
    }

    /// Keys holding interaction state, cleared when a new board starts.
    pub fn board_state_keys(&self) -> [&str; 4] {
        [
            self.order.as_str(),
            self.completed.as_str(),
            self.annotations.as_str(),
            self.celebrated.as_str(),
        ]
    }
}

/// Outcome of reading one JSON entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loaded<T> {
    Present(T),
    Absent,
    /// Entry exists but could not be read or decoded.
    Malformed,
}

/// Reads and decodes one JSON entry, logging read failures and bad payloads.
pub fn load_json<T, S>(storage: &S, key: &str) -> Loaded<T>
where
    T: DeserializeOwned,
    S: BoardStorage + ?Sized,
{
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Loaded::Absent,
        Err(err) => {
            warn!("event=storage_read module=storage status=error key={key} error={err}");
            return Loaded::Malformed;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Loaded::Present(value),
        Err(err) => {
            warn!(
                "event=storage_read module=storage status=malformed key={key} line={} column={}",
                err.line(),
                err.column()
            );
            Loaded::Malformed
        }
    }
}

/// Encodes and writes one JSON entry.
pub fn save_json<T, S>(storage: &S, key: &str, value: &T) -> StorageResult<()>
where
    T: Serialize + ?Sized,
    S: BoardStorage + ?Sized,
{
    let encoded = serde_json::to_string(value).map_err(StorageError::Encode)?;
    storage.set(key, &encoded)
}

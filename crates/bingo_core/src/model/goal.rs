//! Goal cell domain model.
//!
//! # Responsibility
//! - Define the canonical record rendered in one bingo grid position.
//! - Validate label length and identity before a cell enters a board.
//!
//! # Invariants
//! - `id` is stable and never reassigned, across shuffles and text edits.
//! - `text` holds between 1 and `MAX_GOAL_TEXT_CHARS` characters.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Maximum label length, counted in characters rather than bytes.
pub const MAX_GOAL_TEXT_CHARS: usize = 50;

/// Label substituted for goals left blank in the submission form.
pub const FREE_CELL_TEXT: &str = "Free space";

/// Stable identifier of one goal cell.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalId(String);

impl GoalId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for GoalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GoalId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GoalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One goal entry displayed in one grid position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalCell {
    pub id: GoalId,
    pub text: String,
}

/// Validation failure for a goal cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoalValidationError {
    EmptyId,
    EmptyText,
    TextTooLong { len: usize, max: usize },
}

impl Display for GoalValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "goal id cannot be empty"),
            Self::EmptyText => write!(f, "goal text cannot be empty"),
            Self::TextTooLong { len, max } => {
                write!(f, "goal text has {len} characters; maximum is {max}")
            }
        }
    }
}

impl Error for GoalValidationError {}

impl GoalCell {
    /// Creates a cell with a caller-provided stable ID.
    pub fn with_id(id: impl Into<GoalId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Checks identity and label constraints.
    ///
    /// # Errors
    /// - `EmptyId` when `id` is blank.
    /// - `EmptyText` when `text` is blank after trimming.
    /// - `TextTooLong` when `text` exceeds `MAX_GOAL_TEXT_CHARS`.
    pub fn validate(&self) -> Result<(), GoalValidationError> {
        if self.id.as_str().trim().is_empty() {
            return Err(GoalValidationError::EmptyId);
        }
        if self.text.trim().is_empty() {
            return Err(GoalValidationError::EmptyText);
        }
        let len = self.text.chars().count();
        if len > MAX_GOAL_TEXT_CHARS {
            return Err(GoalValidationError::TextTooLong {
                len,
                max: MAX_GOAL_TEXT_CHARS,
            });
        }
        Ok(())
    }
}

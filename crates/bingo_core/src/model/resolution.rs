//! Admin-managed resolution record.
//!
//! # Responsibility
//! - Define the server-side shape of one published goal with its progress
//!   status, as edited from the admin surface.
//!
//! # Invariants
//! - `id` is assigned by storage and never changes.
//! - `text` is non-empty; `status` is free text and may be empty.
//! - `position` orders resolutions for display (ascending).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

use super::goal::MAX_GOAL_TEXT_CHARS;

pub type ResolutionId = i64;

/// Status assigned to freshly created resolutions.
pub const DEFAULT_RESOLUTION_STATUS: &str = "Not started";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub id: ResolutionId,
    pub text: String,
    pub status: String,
    pub position: i64,
    /// Unix epoch milliseconds of the last write.
    pub updated_at_ms: i64,
}

/// Partial update for one resolution.
///
/// Absent or blank fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionPatch {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionValidationError {
    EmptyText,
    TextTooLong { len: usize, max: usize },
}

impl Display for ResolutionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "resolution text cannot be empty"),
            Self::TextTooLong { len, max } => {
                write!(f, "resolution text has {len} characters; maximum is {max}")
            }
        }
    }
}

impl Error for ResolutionValidationError {}

impl ResolutionPatch {
    pub fn status(value: impl Into<String>) -> Self {
        Self {
            text: None,
            status: Some(value.into()),
        }
    }

    /// Trimmed text to apply, if any.
    pub fn effective_text(&self) -> Option<&str> {
        non_blank(self.text.as_deref())
    }

    /// Trimmed status to apply, if any.
    pub fn effective_status(&self) -> Option<&str> {
        non_blank(self.status.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.effective_text().is_none() && self.effective_status().is_none()
    }

    pub fn validate(&self) -> Result<(), ResolutionValidationError> {
        if let Some(text) = self.effective_text() {
            validate_text(text)?;
        }
        Ok(())
    }
}

/// Applies the text rules shared with board goals.
pub fn validate_text(text: &str) -> Result<(), ResolutionValidationError> {
    if text.trim().is_empty() {
        return Err(ResolutionValidationError::EmptyText);
    }
    let len = text.chars().count();
    if len > MAX_GOAL_TEXT_CHARS {
        return Err(ResolutionValidationError::TextTooLong {
            len,
            max: MAX_GOAL_TEXT_CHARS,
        });
    }
    Ok(())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::ResolutionPatch;

    #[test]
    fn blank_fields_are_ignored() {
        let patch = ResolutionPatch {
            text: Some("   ".to_string()),
            status: Some(" 3/12 ".to_string()),
        };
        assert_eq!(patch.effective_text(), None);
        assert_eq!(patch.effective_status(), Some("3/12"));
        assert!(!patch.is_empty());
        assert!(ResolutionPatch::default().is_empty());
    }

    #[test]
    fn patch_deserializes_with_missing_fields() {
        let patch: ResolutionPatch = serde_json::from_str(r#"{"status":"done"}"#).unwrap();
        assert_eq!(patch, ResolutionPatch::status("done"));
    }
}

//! Goal-submission validation.
//!
//! # Responsibility
//! - Turn raw form rows into a validated goal list for one grid size.
//! - Collect every per-field problem so the form can show them inline.
//! - Resize the form rows when the chosen grid size changes.
//!
//! # Invariants
//! - A successful `Submission` holds at least `grid.min_goals()` cells with
//!   unique ids and valid labels.
//! - Blank rows become `FREE_CELL_TEXT`; they never block submission.

use crate::model::goal::{GoalCell, GoalId, GoalValidationError, FREE_CELL_TEXT};
use crate::model::grid::GridSize;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// One raw form row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl GoalInput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
        }
    }

    fn blank() -> Self {
        Self {
            id: Some(GoalId::generate().to_string()),
            text: String::new(),
        }
    }
}

/// Validated goals plus the grid they will be laid out on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub grid: GridSize,
    pub goals: Vec<GoalCell>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldErrorKind {
    TextTooLong { len: usize, max: usize },
    DuplicateId(String),
}

/// Problem attached to one form row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub index: usize,
    pub kind: FieldErrorKind,
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            FieldErrorKind::TextTooLong { max, .. } => {
                write!(f, "goal {}: {max} characters maximum", self.index + 1)
            }
            FieldErrorKind::DuplicateId(id) => {
                write!(f, "goal {}: duplicate id `{id}`", self.index + 1)
            }
        }
    }
}

/// All problems found in one submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionErrors {
    pub fields: Vec<FieldError>,
    /// Set when fewer rows than the grid needs were supplied.
    pub too_few: Option<(usize, usize)>,
}

impl SubmissionErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.too_few.is_none()
    }

    /// Errors for one form row, in discovery order.
    pub fn for_index(&self, index: usize) -> impl Iterator<Item = &FieldError> {
        self.fields.iter().filter(move |error| error.index == index)
    }
}

impl Display for SubmissionErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();
        if let Some((required, supplied)) = self.too_few {
            parts.push(format!(
                "minimum {required} goals required, got {supplied}"
            ));
        }
        parts.extend(self.fields.iter().map(ToString::to_string));
        write!(f, "{}", parts.join("; "))
    }
}

impl Error for SubmissionErrors {}

/// Validates form rows for `grid`.
///
/// # Errors
/// Returns every row-level and count-level problem at once.
pub fn validate_submission(
    inputs: &[GoalInput],
    grid: GridSize,
) -> Result<Submission, SubmissionErrors> {
    let mut errors = SubmissionErrors::default();
    if inputs.len() < grid.min_goals() {
        errors.too_few = Some((grid.min_goals(), inputs.len()));
    }

    let mut seen = HashSet::new();
    let mut goals = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        let id = match input.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => GoalId::new(id),
            _ => GoalId::generate(),
        };
        if !seen.insert(id.clone()) {
            errors.fields.push(FieldError {
                index,
                kind: FieldErrorKind::DuplicateId(id.to_string()),
            });
        }

        let text = match input.text.trim() {
            "" => FREE_CELL_TEXT,
            trimmed => trimmed,
        };
        let cell = GoalCell::with_id(id, text);
        if let Err(GoalValidationError::TextTooLong { len, max }) = cell.validate() {
            errors.fields.push(FieldError {
                index,
                kind: FieldErrorKind::TextTooLong { len, max },
            });
        }
        goals.push(cell);
    }

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(Submission { grid, goals })
}

/// Resizes form rows to exactly the count `grid` requires.
///
/// Existing rows keep their index; new rows are blank with fresh ids.
pub fn resize_inputs(current: &[GoalInput], grid: GridSize) -> Vec<GoalInput> {
    (0..grid.min_goals())
        .map(|index| current.get(index).cloned().unwrap_or_else(GoalInput::blank))
        .collect()
}

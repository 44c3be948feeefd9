//! Render model for bingo cards.
//!
//! # Responsibility
//! - Produce one declarative view of a board, parameterized by `BoardTheme`,
//!   instead of one implementation per card variant.
//! - Expose the stable element id the image export collaborator targets.
//!
//! # Invariants
//! - Rendering is a pure function of board state and theme.
//! - `cells.len() == rows * columns` unless fewer goals were supplied.

use crate::board::controller::BingoBoard;
use crate::model::goal::GoalId;
use crate::share::ShareLocale;
use crate::storage::BoardStorage;
use serde::Serialize;

/// Stable identifier of the card subtree handed to image export.
pub const EXPORT_ELEMENT_ID: &str = "bingo-card";

const TEXT_CELL_WIDTH: usize = 18;

/// Copy and display options for one card variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardTheme {
    pub title: String,
    pub subtitle: Option<String>,
    pub footer: Option<String>,
    pub show_annotations: bool,
    pub locale: ShareLocale,
}

impl BoardTheme {
    /// Card built from a user's own submission.
    pub fn personal(year: i32, locale: ShareLocale) -> Self {
        let (title, footer) = match locale {
            ShareLocale::En => (
                format!("Bingo {year}"),
                "Check off the resolutions you complete",
            ),
            ShareLocale::Fr => (
                format!("Bingo {year}"),
                "Cochez les résolutions accomplies",
            ),
        };
        Self {
            title,
            subtitle: None,
            footer: Some(footer.to_string()),
            show_annotations: false,
            locale,
        }
    }

    /// Published card that shows progress notes under each goal.
    pub fn showcase(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: Some(subtitle.into()),
            footer: None,
            show_annotations: true,
            locale: ShareLocale::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedCell {
    pub position: usize,
    pub row: usize,
    pub column: usize,
    pub id: GoalId,
    pub text: String,
    pub completed: bool,
    pub annotation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedBoard {
    pub element_id: &'static str,
    pub title: String,
    pub subtitle: Option<String>,
    pub footer: Option<String>,
    pub rows: usize,
    pub columns: usize,
    pub render_key: u64,
    pub cells: Vec<RenderedCell>,
}

/// Renders the displayed cells of `board` with `theme`.
pub fn render_board<S: BoardStorage>(board: &BingoBoard<S>, theme: &BoardTheme) -> RenderedBoard {
    let grid = board.grid();
    let columns = grid.cols();
    let cells = board
        .visible_cells()
        .into_iter()
        .map(|cell| RenderedCell {
            position: cell.position,
            row: cell.position / columns,
            column: cell.position % columns,
            id: cell.id,
            text: cell.text,
            completed: cell.completed,
            annotation: if theme.show_annotations {
                cell.annotation
            } else {
                None
            },
        })
        .collect();

    RenderedBoard {
        element_id: EXPORT_ELEMENT_ID,
        title: theme.title.clone(),
        subtitle: theme.subtitle.clone(),
        footer: theme.footer.clone(),
        rows: grid.rows(),
        columns,
        render_key: board.render_key(),
        cells,
    }
}

impl RenderedBoard {
    /// Fixed-width text grid, one bordered box per cell.
    pub fn to_text(&self) -> String {
        let border = format!(
            "+{}\n",
            format!("{}+", "-".repeat(TEXT_CELL_WIDTH + 2)).repeat(self.columns)
        );
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        if let Some(subtitle) = &self.subtitle {
            out.push_str(subtitle);
            out.push('\n');
        }
        out.push_str(&border);

        for row in self.cells.chunks(self.columns.max(1)) {
            let mut lines = vec![String::from("|"), String::from("|"), String::from("|")];
            for cell in row {
                let marker = if cell.completed { "[x]" } else { "[ ]" };
                let head = format!("{marker} {}. {}", cell.position + 1, cell.text);
                let note = cell.annotation.as_deref().unwrap_or("");
                let (first, rest) = split_at_char(&head, TEXT_CELL_WIDTH);
                lines[0].push_str(&format!(" {} |", fit(first, TEXT_CELL_WIDTH)));
                lines[1].push_str(&format!(" {} |", fit(rest, TEXT_CELL_WIDTH)));
                lines[2].push_str(&format!(" {} |", fit(note, TEXT_CELL_WIDTH)));
            }
            for line in lines {
                out.push_str(&line);
                out.push('\n');
            }
            out.push_str(&border);
        }

        if let Some(footer) = &self.footer {
            out.push_str(footer);
            out.push('\n');
        }
        out
    }
}

/// Pads or truncates to exactly `width` characters.
fn fit(value: &str, width: usize) -> String {
    let count = value.chars().count();
    if count > width {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    } else {
        format!("{value}{}", " ".repeat(width - count))
    }
}

/// Splits after the first `width` characters.
fn split_at_char(value: &str, width: usize) -> (&str, &str) {
    match value.char_indices().nth(width) {
        Some((index, _)) => value.split_at(index),
        None => (value, ""),
    }
}

//! Core domain logic for the resolutions bingo card.
//! This crate is the single source of truth for board invariants.

pub mod admin;
pub mod board;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;
pub mod share;
pub mod storage;
pub mod submission;

pub use admin::{AdminBoard, Notice, NoticeLevel, ResolutionSource, SourceError};
pub use board::controller::{BingoBoard, BoardCell, ReshuffleEvent, ToggleOutcome};
pub use board::shuffle::{shuffle, shuffle_in_place};
pub use board::stats::CompletionStats;
pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::goal::{GoalCell, GoalId, GoalValidationError, FREE_CELL_TEXT, MAX_GOAL_TEXT_CHARS};
pub use model::grid::{GridSize, ParseGridSizeError};
pub use model::resolution::{
    Resolution, ResolutionId, ResolutionPatch, ResolutionValidationError,
    DEFAULT_RESOLUTION_STATUS,
};
pub use render::{render_board, BoardTheme, RenderedBoard, RenderedCell, EXPORT_ELEMENT_ID};
pub use repo::resolution_repo::{
    RepoError, RepoResult, ResolutionRepository, SqliteResolutionRepository,
};
pub use service::resolution_service::ResolutionService;
pub use share::{export_file_name, share_text, ParseLocaleError, ShareLocale};
pub use storage::{
    load_json, save_json, BoardStorage, Loaded, MemoryStorage, SqliteStorage, StorageError,
    StorageKeys, StorageResult,
};
pub use submission::{
    resize_inputs, validate_submission, FieldError, FieldErrorKind, GoalInput, Submission,
    SubmissionErrors,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Bingo board interaction model.
//!
//! # Responsibility
//! - Shuffle goal cells without bias.
//! - Own completion flags and annotations for one board instance and
//!   persist them through `BoardStorage`.
//! - Derive completion statistics for sharing.
//!
//! # Invariants
//! - Completion and annotations are keyed by goal id, never by position.
//! - Storage failures are logged and swallowed; the board never fails.

pub mod controller;
pub mod shuffle;
pub mod stats;

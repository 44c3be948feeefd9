//! Domain model for bingo boards and admin-managed resolutions.
//!
//! # Responsibility
//! - Define the goal cell, grid size and resolution records shared by the
//!   board controller, storage and admin layers.
//!
//! # Invariants
//! - Every goal cell is identified by a stable `GoalId`.
//! - Grid sizes come from one canonical enumeration (3x3, 3x4, 4x4).

pub mod goal;
pub mod grid;
pub mod resolution;

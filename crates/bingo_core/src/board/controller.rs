//! Board controller: the owned runtime aggregate for one bingo card.
//!
//! # Responsibility
//! - Restore or create the shuffle order for a submitted goal list.
//! - Track completion and annotations by goal id and persist every change.
//! - Notify observers on reshuffle and report the one-shot "board complete"
//!   transition.
//!
//! # Invariants
//! - `ordered` is always a permutation of the submitted (deduplicated) goals.
//! - `completed` and `annotations` only reference known goal ids.
//! - Annotations never store empty or untrimmed strings.
//! - No operation returns an error; storage failures are logged at `warn`.

use crate::board::shuffle::shuffle_in_place;
use crate::board::stats::CompletionStats;
use crate::model::goal::{GoalCell, GoalId};
use crate::model::grid::GridSize;
use crate::storage::{load_json, save_json, BoardStorage, Loaded, StorageKeys};
use crate::submission::Submission;
use log::{debug, info, warn};
use rand::Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Render-ready view of one displayed cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardCell {
    pub position: usize,
    pub id: GoalId,
    pub text: String,
    pub completed: bool,
    pub annotation: Option<String>,
}

/// Result of `toggle_completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Id is not part of this board; nothing changed.
    Unknown,
    /// Cell became completed. `celebrate` is true on the single toggle that
    /// completes every displayed cell.
    Checked { celebrate: bool },
    Unchecked,
}

/// Payload passed to reshuffle observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReshuffleEvent {
    /// Changes on every reshuffle; front ends use it to re-key the render.
    pub render_key: u64,
    pub order: Vec<GoalId>,
}

type ReshuffleObserver = Box<dyn FnMut(&ReshuffleEvent)>;

pub struct BingoBoard<S: BoardStorage> {
    storage: S,
    keys: StorageKeys,
    grid: GridSize,
    ordered: Vec<GoalCell>,
    completed: BTreeSet<GoalId>,
    annotations: BTreeMap<GoalId, String>,
    celebrated: bool,
    render_key: u64,
    observers: Vec<ReshuffleObserver>,
}

impl<S: BoardStorage> BingoBoard<S> {
    /// Builds the board for `submission`, restoring persisted state.
    ///
    /// # Side effects
    /// - Writes a fresh shuffle order when none is stored or the stored one
    ///   no longer matches the submitted goal ids.
    /// - Overwrites malformed completion/annotation entries with empty state.
    pub fn init<R>(submission: Submission, storage: S, board_key: &str, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let keys = StorageKeys::for_board(board_key);
        let goals = dedupe_goals(submission.goals);

        let mut board = Self {
            storage,
            keys,
            grid: submission.grid,
            ordered: goals,
            completed: BTreeSet::new(),
            annotations: BTreeMap::new(),
            celebrated: false,
            render_key: 0,
            observers: Vec::new(),
        };

        if !board.restore_order() {
            shuffle_in_place(&mut board.ordered, rng);
            board.persist_order();
        }
        board.restore_completed();
        board.restore_annotations();
        board.restore_celebrated();

        info!(
            "event=board_init module=board status=ok grid={} goals={} completed={} annotations={}",
            board.grid,
            board.ordered.len(),
            board.completed.len(),
            board.annotations.len()
        );
        board
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    /// All goals in current display order, including ones past the grid.
    pub fn goals(&self) -> &[GoalCell] {
        &self.ordered
    }

    pub fn order(&self) -> Vec<GoalId> {
        self.ordered.iter().map(|goal| goal.id.clone()).collect()
    }

    pub fn completed(&self) -> &BTreeSet<GoalId> {
        &self.completed
    }

    pub fn annotations(&self) -> &BTreeMap<GoalId, String> {
        &self.annotations
    }

    pub fn is_completed(&self, id: &GoalId) -> bool {
        self.completed.contains(id)
    }

    pub fn annotation(&self, id: &GoalId) -> Option<&str> {
        self.annotations.get(id).map(String::as_str)
    }

    pub fn render_key(&self) -> u64 {
        self.render_key
    }

    /// Number of cells rendered: the grid size, or fewer if fewer goals exist.
    pub fn visible_len(&self) -> usize {
        self.grid.cell_count().min(self.ordered.len())
    }

    /// Goal displayed at zero-based `position`.
    pub fn cell_at(&self, position: usize) -> Option<&GoalCell> {
        self.ordered[..self.visible_len()].get(position)
    }

    pub fn contains(&self, id: &GoalId) -> bool {
        self.ordered.iter().any(|goal| &goal.id == id)
    }

    /// The first `cell_count` goals of the current order, with state attached.
    pub fn visible_cells(&self) -> Vec<BoardCell> {
        self.ordered[..self.visible_len()]
            .iter()
            .enumerate()
            .map(|(position, goal)| BoardCell {
                position,
                id: goal.id.clone(),
                text: goal.text.clone(),
                completed: self.completed.contains(&goal.id),
                annotation: self.annotations.get(&goal.id).cloned(),
            })
            .collect()
    }

    /// Completion counted over displayed cells only.
    pub fn completion_stats(&self) -> CompletionStats {
        let visible = &self.ordered[..self.visible_len()];
        let completed = visible
            .iter()
            .filter(|goal| self.completed.contains(&goal.id))
            .count();
        CompletionStats::new(completed, visible.len())
    }

    /// Flips completion of `id` and persists the completed set.
    pub fn toggle_completed(&mut self, id: &GoalId) -> ToggleOutcome {
        if !self.contains(id) {
            debug!("event=board_toggle module=board status=skipped reason=unknown_id");
            return ToggleOutcome::Unknown;
        }

        let outcome = if self.completed.remove(id) {
            ToggleOutcome::Unchecked
        } else {
            self.completed.insert(id.clone());
            let celebrate = !self.celebrated && self.completion_stats().is_complete();
            if celebrate {
                self.celebrated = true;
                self.persist_celebrated();
            }
            ToggleOutcome::Checked { celebrate }
        };
        self.persist_completed();

        let stats = self.completion_stats();
        debug!(
            "event=board_toggle module=board status=ok checked={} completed={} total={}",
            matches!(outcome, ToggleOutcome::Checked { .. }),
            stats.completed,
            stats.total
        );
        if let ToggleOutcome::Checked { celebrate: true } = outcome {
            info!("event=board_complete module=board status=ok total={}", stats.total);
        }
        outcome
    }

    /// Sets or clears the progress note of `id`.
    ///
    /// Returns `false` when `id` is not part of this board.
    pub fn set_annotation(&mut self, id: &GoalId, text: &str) -> bool {
        if !self.contains(id) {
            return false;
        }

        let trimmed = text.trim();
        let changed = if trimmed.is_empty() {
            self.annotations.remove(id).is_some()
        } else {
            self.annotations.insert(id.clone(), trimmed.to_string()).as_deref() != Some(trimmed)
        };
        if changed {
            self.persist_annotations();
        }
        true
    }

    /// Re-randomizes the display order, keeping completion and annotations.
    pub fn reshuffle<R>(&mut self, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        shuffle_in_place(&mut self.ordered, rng);
        self.persist_order();
        self.render_key += 1;

        let event = ReshuffleEvent {
            render_key: self.render_key,
            order: self.order(),
        };
        for observer in &mut self.observers {
            observer(&event);
        }
        debug!(
            "event=board_reshuffle module=board status=ok render_key={} observers={}",
            self.render_key,
            self.observers.len()
        );
    }

    /// Registers a callback invoked after every reshuffle.
    pub fn on_reshuffle<F>(&mut self, observer: F)
    where
        F: FnMut(&ReshuffleEvent) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    /// Discards this board and its persisted interaction state.
    ///
    /// Returns the storage so a new board can be created on it.
    pub fn reset(self) -> S {
        for key in self.keys.board_state_keys() {
            if let Err(err) = self.storage.remove(key) {
                warn!("event=board_reset module=board status=error key={key} error={err}");
            }
        }
        info!("event=board_reset module=board status=ok");
        self.storage
    }

    fn restore_order(&mut self) -> bool {
        let stored: BTreeMap<GoalId, usize> = match load_json(&self.storage, &self.keys.order) {
            Loaded::Present(stored) => stored,
            Loaded::Absent => return false,
            Loaded::Malformed => {
                warn!("event=board_restore module=board status=reinit piece=order reason=malformed");
                return false;
            }
        };

        if !is_position_map_for(&stored, &self.ordered) {
            info!("event=board_restore module=board status=reinit piece=order reason=goals_changed");
            return false;
        }
        self.ordered.sort_by_key(|goal| stored[&goal.id]);
        true
    }

    fn restore_completed(&mut self) {
        match load_json::<Vec<GoalId>, _>(&self.storage, &self.keys.completed) {
            Loaded::Present(ids) => {
                let known = self.known_ids();
                self.completed = ids.into_iter().filter(|id| known.contains(id)).collect();
            }
            Loaded::Absent => {}
            Loaded::Malformed => {
                warn!("event=board_restore module=board status=reinit piece=completed reason=malformed");
                self.persist_completed();
            }
        }
    }

    fn restore_annotations(&mut self) {
        match load_json::<BTreeMap<GoalId, String>, _>(&self.storage, &self.keys.annotations) {
            Loaded::Present(stored) => {
                let known = self.known_ids();
                self.annotations = stored
                    .into_iter()
                    .filter(|(id, _)| known.contains(id))
                    .filter_map(|(id, text)| {
                        let trimmed = text.trim();
                        (!trimmed.is_empty()).then(|| (id, trimmed.to_string()))
                    })
                    .collect();
            }
            Loaded::Absent => {}
            Loaded::Malformed => {
                warn!("event=board_restore module=board status=reinit piece=annotations reason=malformed");
                self.persist_annotations();
            }
        }
    }

    /// A board loaded already complete counts as celebrated.
    fn restore_celebrated(&mut self) {
        let complete = self.completion_stats().is_complete();
        let stored = match load_json::<bool, _>(&self.storage, &self.keys.celebrated) {
            Loaded::Present(flag) => flag,
            Loaded::Absent | Loaded::Malformed => false,
        };
        self.celebrated = stored || complete;
        if complete && !stored {
            self.persist_celebrated();
        }
    }

    fn known_ids(&self) -> HashSet<GoalId> {
        self.ordered.iter().map(|goal| goal.id.clone()).collect()
    }

    fn persist_order(&self) {
        let positions: BTreeMap<&GoalId, usize> = self
            .ordered
            .iter()
            .enumerate()
            .map(|(position, goal)| (&goal.id, position))
            .collect();
        self.persist(&self.keys.order, &positions);
    }

    fn persist_completed(&self) {
        self.persist(&self.keys.completed, &self.completed);
    }

    fn persist_annotations(&self) {
        self.persist(&self.keys.annotations, &self.annotations);
    }

    fn persist_celebrated(&self) {
        self.persist(&self.keys.celebrated, &self.celebrated);
    }

    fn persist<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(err) = save_json(&self.storage, key, value) {
            warn!("event=storage_write module=board status=error key={key} error={err}");
        }
    }
}

/// Keeps the first goal for every id.
fn dedupe_goals(goals: Vec<GoalCell>) -> Vec<GoalCell> {
    let total = goals.len();
    let mut seen = HashSet::new();
    let deduped: Vec<GoalCell> = goals
        .into_iter()
        .filter(|goal| seen.insert(goal.id.clone()))
        .collect();
    if deduped.len() != total {
        warn!(
            "event=board_init module=board status=degraded reason=duplicate_ids dropped={}",
            total - deduped.len()
        );
    }
    deduped
}

/// True when `stored` maps exactly the ids of `goals` onto `0..goals.len()`.
fn is_position_map_for(stored: &BTreeMap<GoalId, usize>, goals: &[GoalCell]) -> bool {
    if stored.len() != goals.len() {
        return false;
    }
    let mut positions = vec![false; goals.len()];
    for goal in goals {
        match stored.get(&goal.id) {
            Some(&position) if position < positions.len() && !positions[position] => {
                positions[position] = true;
            }
            _ => return false,
        }
    }
    true
}

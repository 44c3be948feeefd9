use bingo_core::db::open_db;
use bingo_core::{
    validate_submission, BingoBoard, BoardStorage, GoalId, GoalInput, GridSize, MemoryStorage,
    SqliteStorage, StorageError, StorageKeys, StorageResult, ToggleOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::BTreeSet;

fn nine_goals() -> Vec<GoalInput> {
    (0..9)
        .map(|i| GoalInput {
            id: Some(format!("goal-{i}")),
            text: format!("Resolution {i}"),
        })
        .collect()
}

fn input_ids() -> BTreeSet<GoalId> {
    (0..9).map(|i| GoalId::new(format!("goal-{i}"))).collect()
}

#[test]
fn nine_goals_render_as_a_permutation_and_celebrate_once() {
    let submission = validate_submission(&nine_goals(), GridSize::ThreeByThree).unwrap();
    let storage = MemoryStorage::new();
    let mut rng = StdRng::seed_from_u64(42);
    let mut board = BingoBoard::init(submission, &storage, "e2e", &mut rng);

    let cells = board.visible_cells();
    assert_eq!(cells.len(), 9);
    let rendered: BTreeSet<GoalId> = cells.iter().map(|cell| cell.id.clone()).collect();
    assert_eq!(rendered, input_ids());

    let mut celebrations = 0;
    for (index, cell) in cells.iter().enumerate() {
        match board.toggle_completed(&cell.id) {
            ToggleOutcome::Checked { celebrate } => {
                if celebrate {
                    celebrations += 1;
                    assert_eq!(index, 8, "celebration must fire on the ninth toggle");
                }
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
    assert_eq!(board.completed().len(), 9);
    assert_eq!(celebrations, 1);

    // Unchecking and re-checking does not celebrate again.
    let first = cells[0].id.clone();
    assert_eq!(board.toggle_completed(&first), ToggleOutcome::Unchecked);
    assert_eq!(
        board.toggle_completed(&first),
        ToggleOutcome::Checked { celebrate: false }
    );
}

#[test]
fn celebration_survives_reload_until_reset() {
    let storage = MemoryStorage::new();
    let mut rng = StdRng::seed_from_u64(11);
    let first = GoalId::new("goal-0");
    {
        let submission = validate_submission(&nine_goals(), GridSize::ThreeByThree).unwrap();
        let mut board = BingoBoard::init(submission, &storage, "once", &mut rng);
        let outcomes: Vec<ToggleOutcome> = input_ids()
            .iter()
            .map(|id| board.toggle_completed(id))
            .collect();
        assert_eq!(
            outcomes.last(),
            Some(&ToggleOutcome::Checked { celebrate: true })
        );
        assert_eq!(board.toggle_completed(&first), ToggleOutcome::Unchecked);
    }

    let submission = validate_submission(&nine_goals(), GridSize::ThreeByThree).unwrap();
    let mut board = BingoBoard::init(submission, &storage, "once", &mut rng);
    assert_eq!(board.completed().len(), 8);
    assert_eq!(
        board.toggle_completed(&first),
        ToggleOutcome::Checked { celebrate: false }
    );

    let storage = board.reset();
    let keys = StorageKeys::for_board("once");
    assert_eq!(storage.get(&keys.celebrated).unwrap(), None);

    let submission = validate_submission(&nine_goals(), GridSize::ThreeByThree).unwrap();
    let mut board = BingoBoard::init(submission, storage, "once", &mut rng);
    let celebrations = input_ids()
        .iter()
        .filter(|id| board.toggle_completed(id) == ToggleOutcome::Checked { celebrate: true })
        .count();
    assert_eq!(celebrations, 1);
}

#[test]
fn reload_restores_order_and_completed_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.sqlite3");

    let (order_before, checked) = {
        let conn = open_db(&path).unwrap();
        let submission = validate_submission(&nine_goals(), GridSize::ThreeByThree).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let mut board = BingoBoard::init(submission, SqliteStorage::new(&conn), "reload", &mut rng);

        let checked: Vec<GoalId> = board
            .visible_cells()
            .iter()
            .take(3)
            .map(|cell| cell.id.clone())
            .collect();
        for id in &checked {
            board.toggle_completed(id);
        }
        board.set_annotation(&checked[0], "halfway there");
        (board.order(), checked)
    };

    let conn = open_db(&path).unwrap();
    let submission = validate_submission(&nine_goals(), GridSize::ThreeByThree).unwrap();
    // A different seed proves the order comes from storage, not the RNG.
    let mut rng = StdRng::seed_from_u64(999);
    let board = BingoBoard::init(submission, SqliteStorage::new(&conn), "reload", &mut rng);

    assert_eq!(board.order(), order_before);
    let restored: BTreeSet<GoalId> = board.completed().iter().cloned().collect();
    assert_eq!(restored, checked.iter().cloned().collect());
    assert_eq!(board.annotation(&checked[0]), Some("halfway there"));
    assert_eq!(board.completion_stats().completed, 3);
    assert_eq!(board.completion_stats().percentage, 33);
}

#[test]
fn toggle_twice_restores_previous_set() {
    let submission = validate_submission(&nine_goals(), GridSize::ThreeByThree).unwrap();
    let storage = MemoryStorage::new();
    let mut rng = StdRng::seed_from_u64(1);
    let mut board = BingoBoard::init(submission, &storage, "idem", &mut rng);

    board.toggle_completed(&GoalId::new("goal-2"));
    let before = board.completed().clone();
    let stored_before = storage.get(&StorageKeys::for_board("idem").completed).unwrap();

    let id = GoalId::new("goal-5");
    board.toggle_completed(&id);
    board.toggle_completed(&id);

    assert_eq!(board.completed(), &before);
    assert_eq!(
        storage.get(&StorageKeys::for_board("idem").completed).unwrap(),
        stored_before
    );
}

#[test]
fn reshuffle_keeps_completion_and_annotations() {
    let submission = validate_submission(&nine_goals(), GridSize::ThreeByThree).unwrap();
    let storage = MemoryStorage::new();
    let mut rng = StdRng::seed_from_u64(3);
    let mut board = BingoBoard::init(submission, &storage, "shuffle", &mut rng);

    board.toggle_completed(&GoalId::new("goal-1"));
    board.toggle_completed(&GoalId::new("goal-4"));
    board.set_annotation(&GoalId::new("goal-4"), "2/4");
    let completed = board.completed().clone();
    let annotations = board.annotations().clone();
    let stored_order = storage
        .get(&StorageKeys::for_board("shuffle").order)
        .unwrap();

    for _ in 0..10 {
        board.reshuffle(&mut rng);
        assert_eq!(board.completed(), &completed);
        assert_eq!(board.annotations(), &annotations);
    }
    assert_ne!(
        storage.get(&StorageKeys::for_board("shuffle").order).unwrap(),
        stored_order
    );
}

#[test]
fn whitespace_annotation_removes_existing_entry() {
    let submission = validate_submission(&nine_goals(), GridSize::ThreeByThree).unwrap();
    let storage = MemoryStorage::new();
    let mut rng = StdRng::seed_from_u64(3);
    let mut board = BingoBoard::init(submission, &storage, "notes", &mut rng);
    let id = GoalId::new("goal-0");

    board.set_annotation(&id, "started");
    board.set_annotation(&id, "   ");

    assert_eq!(board.annotation(&id), None);
    let stored = storage
        .get(&StorageKeys::for_board("notes").annotations)
        .unwrap();
    assert_eq!(stored.as_deref(), Some("{}"));
}

#[test]
fn changed_goal_list_gets_a_fresh_order_and_drops_stale_completion() {
    let storage = MemoryStorage::new();
    let mut rng = StdRng::seed_from_u64(8);
    {
        let submission = validate_submission(&nine_goals(), GridSize::ThreeByThree).unwrap();
        let mut board = BingoBoard::init(submission, &storage, "edit", &mut rng);
        board.toggle_completed(&GoalId::new("goal-8"));
        board.toggle_completed(&GoalId::new("goal-0"));
    }

    let mut edited = nine_goals();
    edited[8] = GoalInput {
        id: Some("goal-new".to_string()),
        text: "Brand new".to_string(),
    };
    let submission = validate_submission(&edited, GridSize::ThreeByThree).unwrap();
    let board = BingoBoard::init(submission, &storage, "edit", &mut rng);

    assert!(board.contains(&GoalId::new("goal-new")));
    let completed: Vec<&str> = board.completed().iter().map(GoalId::as_str).collect();
    assert_eq!(completed, vec!["goal-0"]);
}

/// Storage whose writes always fail, like a full quota.
struct FullStorage;

impl BoardStorage for FullStorage {
    fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Backend("disk unreadable".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Backend("quota exceeded".to_string()))
    }

    fn remove(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Backend("quota exceeded".to_string()))
    }
}

#[test]
fn storage_failures_never_reach_the_caller() {
    let submission = validate_submission(&nine_goals(), GridSize::ThreeByThree).unwrap();
    let mut rng = StdRng::seed_from_u64(5);
    let mut board = BingoBoard::init(submission, FullStorage, "broken", &mut rng);

    let id = GoalId::new("goal-3");
    assert_eq!(
        board.toggle_completed(&id),
        ToggleOutcome::Checked { celebrate: false }
    );
    assert!(board.set_annotation(&id, "still works"));
    board.reshuffle(&mut rng);
    assert!(board.is_completed(&id));
    assert_eq!(board.visible_cells().len(), 9);
    board.reset();
}

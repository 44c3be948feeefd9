//! Command implementations behind the `bingo` binary.
//!
//! # Responsibility
//! - Drive `BingoBoard` and the admin routes against one SQLite file.
//! - Serve the admin routes over HTTP.
//! - Write human-readable output to the supplied writer.
//!
//! # Invariants
//! - The submitted goal list lives under `StorageKeys::submission`; board
//!   state keys are owned by `BingoBoard`.
//! - Commands other than `new` never change the goal list.

use bingo_api::{ApiResolutionSource, ApiState};
use bingo_core::{
    export_file_name, load_json, render_board, save_json, share_text, validate_submission,
    AdminBoard, AppConfig, BingoBoard, BoardStorage, BoardTheme, GoalId, GoalInput, GridSize,
    Loaded, NoticeLevel, ResolutionId, ResolutionPatch, SqliteStorage, StorageKeys, Submission,
    ToggleOutcome,
};
use chrono::{Datelike, Utc};
use log::{info, warn};
use rand::Rng;
use rusqlite::Connection;
use serde::Deserialize;
use std::error::Error;
use std::io::Write;
use std::path::Path;
use tokio::net::TcpListener;

pub type CommandResult = Result<(), Box<dyn Error>>;

/// Contents accepted by `new --goals-file`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum GoalsFile {
    Texts(Vec<String>),
    Inputs(Vec<GoalInput>),
}

impl GoalsFile {
    pub fn read(path: &Path) -> Result<Vec<GoalInput>, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path)
            .map_err(|err| format!("failed to read `{}`: {err}", path.display()))?;
        let parsed: Self = serde_json::from_str(&raw)
            .map_err(|err| format!("failed to parse `{}`: {err}", path.display()))?;
        Ok(match parsed {
            Self::Texts(texts) => texts.into_iter().map(GoalInput::text).collect(),
            Self::Inputs(inputs) => inputs,
        })
    }
}

/// One board namespace inside one database.
pub struct Session<'conn> {
    conn: &'conn Connection,
    config: AppConfig,
    keys: StorageKeys,
}

impl<'conn> Session<'conn> {
    pub fn new(conn: &'conn Connection, config: AppConfig) -> Self {
        let keys = StorageKeys::for_board(&config.board_key);
        Self { conn, config, keys }
    }

    fn storage(&self) -> SqliteStorage<'conn> {
        SqliteStorage::new(self.conn)
    }

    fn theme(&self) -> BoardTheme {
        let mut theme = BoardTheme::personal(Utc::now().year(), self.config.locale);
        if let Some(title) = &self.config.title {
            theme.title = title.clone();
        }
        if self.config.subtitle.is_some() {
            theme.subtitle = self.config.subtitle.clone();
        }
        theme
    }

    fn open_board<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
    ) -> Result<BingoBoard<SqliteStorage<'conn>>, Box<dyn Error>> {
        let storage = self.storage();
        let submission = match load_json::<Submission, _>(&storage, &self.keys.submission) {
            Loaded::Present(submission) => submission,
            Loaded::Absent => {
                return Err(format!(
                    "no goals submitted for board `{}`; run `bingo new` first",
                    self.config.board_key
                )
                .into())
            }
            Loaded::Malformed => {
                return Err(format!(
                    "stored goals for board `{}` are unreadable; run `bingo new` again",
                    self.config.board_key
                )
                .into())
            }
        };
        Ok(BingoBoard::init(
            submission,
            storage,
            &self.config.board_key,
            rng,
        ))
    }

    /// Validates `inputs`, stores them and starts a fresh board.
    pub fn new_board<R: Rng + ?Sized>(
        &self,
        grid: GridSize,
        inputs: &[GoalInput],
        rng: &mut R,
        out: &mut impl Write,
    ) -> CommandResult {
        let submission = match validate_submission(inputs, grid) {
            Ok(submission) => submission,
            Err(errors) => {
                for field in &errors.fields {
                    writeln!(out, "{field}")?;
                }
                return Err(errors.into());
            }
        };

        let storage = self.storage();
        for key in self.keys.board_state_keys() {
            storage.remove(key)?;
        }
        save_json(&storage, &self.keys.submission, &submission)?;
        info!(
            "event=board_submit module=cli status=ok board_key={} grid={} goals={}",
            self.config.board_key,
            grid,
            submission.goals.len()
        );

        let board = BingoBoard::init(submission, storage, &self.config.board_key, rng);
        write!(out, "{}", render_board(&board, &self.theme()).to_text())?;
        Ok(())
    }

    pub fn show<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut impl Write) -> CommandResult {
        let board = self.open_board(rng)?;
        write!(out, "{}", render_board(&board, &self.theme()).to_text())?;
        Ok(())
    }

    /// Toggles the cell named by a goal id or a 1-based position.
    pub fn toggle<R: Rng + ?Sized>(
        &self,
        target: &str,
        rng: &mut R,
        out: &mut impl Write,
    ) -> CommandResult {
        let mut board = self.open_board(rng)?;
        let id = resolve_target(&board, target)?;
        match board.toggle_completed(&id) {
            ToggleOutcome::Checked { celebrate } => {
                writeln!(out, "checked {id}")?;
                if celebrate {
                    writeln!(out, "Bingo! Every resolution is complete.")?;
                }
            }
            ToggleOutcome::Unchecked => writeln!(out, "unchecked {id}")?,
            ToggleOutcome::Unknown => return Err(format!("unknown goal `{target}`").into()),
        }
        Ok(())
    }

    pub fn annotate<R: Rng + ?Sized>(
        &self,
        target: &str,
        text: &str,
        rng: &mut R,
        out: &mut impl Write,
    ) -> CommandResult {
        let mut board = self.open_board(rng)?;
        let id = resolve_target(&board, target)?;
        if !board.set_annotation(&id, text) {
            writeln!(out, "note for {id} unchanged")?;
        } else if board.annotation(&id).is_some() {
            writeln!(out, "note for {id} saved")?;
        } else {
            writeln!(out, "note for {id} cleared")?;
        }
        Ok(())
    }

    pub fn reshuffle<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut impl Write) -> CommandResult {
        let mut board = self.open_board(rng)?;
        board.reshuffle(rng);
        write!(out, "{}", render_board(&board, &self.theme()).to_text())?;
        Ok(())
    }

    pub fn stats<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut impl Write) -> CommandResult {
        let board = self.open_board(rng)?;
        let stats = board.completion_stats();
        writeln!(
            out,
            "{}/{} completed ({}%)",
            stats.completed, stats.total, stats.percentage
        )?;
        Ok(())
    }

    pub fn share<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut impl Write) -> CommandResult {
        let board = self.open_board(rng)?;
        writeln!(
            out,
            "{}",
            share_text(&board.completion_stats(), self.config.locale)
        )?;
        writeln!(out, "image: {}", export_file_name(&self.theme().title))?;
        Ok(())
    }

    /// Clears completion, notes and order; the goal list stays.
    pub fn reset<R: Rng + ?Sized>(&self, rng: &mut R, out: &mut impl Write) -> CommandResult {
        self.open_board(rng)?.reset();
        writeln!(out, "board `{}` reset", self.config.board_key)?;
        Ok(())
    }
}

/// Operator commands, sent through the admin routes in-process.
pub struct AdminSession {
    state: ApiState,
    token: String,
}

impl AdminSession {
    /// Signs requests with a token minted for this process only.
    pub fn new(conn: Connection) -> Self {
        let token = format!("{:016x}", rand::rng().random::<u64>());
        Self {
            state: ApiState::new(conn).with_admin_token(&token),
            token,
        }
    }

    fn board(&self) -> Result<AdminBoard<ApiResolutionSource>, Box<dyn Error>> {
        let source = ApiResolutionSource::new(self.state.clone())?.with_admin_token(&self.token);
        let mut admin = AdminBoard::new(source);
        if let Some(notice) = admin.refresh() {
            return Err(notice.message.into());
        }
        Ok(admin)
    }

    pub fn list(&self, out: &mut impl Write) -> CommandResult {
        for row in self.board()?.resolutions() {
            writeln!(out, "{:>4}  {:<50}  {}", row.id, row.text, row.status)?;
        }
        Ok(())
    }

    pub fn add(&self, text: &str, out: &mut impl Write) -> CommandResult {
        let created = self.state.with_service(|service| service.create(text))?;
        writeln!(out, "added {} {}", created.id, created.text)?;
        Ok(())
    }

    pub fn update(
        &self,
        id: ResolutionId,
        patch: &ResolutionPatch,
        out: &mut impl Write,
    ) -> CommandResult {
        match self.board()?.update(id, patch) {
            None => writeln!(out, "nothing to update")?,
            Some(notice) if notice.level == NoticeLevel::Success => {
                writeln!(out, "{}", notice.message)?
            }
            Some(notice) => return Err(notice.message.into()),
        }
        Ok(())
    }
}

/// Serves the admin routes on `addr` until the listener fails.
pub fn serve_admin_api(
    conn: Connection,
    admin_token: Option<&str>,
    addr: &str,
    out: &mut impl Write,
) -> CommandResult {
    let mut state = ApiState::new(conn);
    match admin_token {
        Some(token) => state = state.with_admin_token(token),
        None => warn!("event=api_serve module=cli status=degraded reason=no_admin_token"),
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let listener = TcpListener::bind(addr).await?;
        writeln!(out, "listening on http://{}", listener.local_addr()?)?;
        out.flush()?;
        bingo_api::serve(listener, state).await
    })?;
    Ok(())
}

/// Exact goal ids win over 1-based positions.
fn resolve_target<S: BoardStorage>(
    board: &BingoBoard<S>,
    target: &str,
) -> Result<GoalId, Box<dyn Error>> {
    let target = target.trim();
    let id = GoalId::from(target);
    if board.contains(&id) {
        return Ok(id);
    }
    target
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| board.cell_at(index))
        .map(|cell| cell.id.clone())
        .ok_or_else(|| format!("unknown goal `{target}`").into())
}

#[cfg(test)]
mod tests {
    use super::{resolve_target, AdminSession, GoalsFile, Session};
    use bingo_core::db::open_db_in_memory;
    use bingo_core::{AppConfig, GoalInput, GridSize};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::io::Write;

    fn goals(count: usize) -> Vec<GoalInput> {
        (0..count)
            .map(|i| GoalInput {
                id: Some(format!("g{i}")),
                text: format!("Goal {i}"),
            })
            .collect()
    }

    fn output(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn goals_file_accepts_plain_strings_and_objects() {
        let mut texts = tempfile::NamedTempFile::new().unwrap();
        write!(texts, r#"["Run", "Read"]"#).unwrap();
        let parsed = GoalsFile::read(texts.path()).unwrap();
        assert_eq!(parsed, vec![GoalInput::text("Run"), GoalInput::text("Read")]);

        let mut objects = tempfile::NamedTempFile::new().unwrap();
        write!(objects, r#"[{{"id": "a", "text": "Swim"}}]"#).unwrap();
        let parsed = GoalsFile::read(objects.path()).unwrap();
        assert_eq!(parsed[0].id.as_deref(), Some("a"));
    }

    #[test]
    fn commands_share_one_persisted_board() {
        let conn = open_db_in_memory().unwrap();
        let session = Session::new(&conn, AppConfig::default());
        let mut rng = StdRng::seed_from_u64(11);

        let mut out = Vec::new();
        session
            .new_board(GridSize::ThreeByThree, &goals(9), &mut rng, &mut out)
            .unwrap();
        assert!(output(out).contains("[ ] 1."));

        for target in ["g0", "2", "g0"] {
            session.toggle(target, &mut rng, &mut Vec::new()).unwrap();
        }
        let mut out = Vec::new();
        session.stats(&mut rng, &mut out).unwrap();
        assert_eq!(output(out), "1/9 completed (11%)\n");

        assert!(session.toggle("10", &mut rng, &mut Vec::new()).is_err());
        assert!(session.toggle("missing", &mut rng, &mut Vec::new()).is_err());

        let mut out = Vec::new();
        session.reset(&mut rng, &mut out).unwrap();
        let mut out = Vec::new();
        session.stats(&mut rng, &mut out).unwrap();
        assert_eq!(output(out), "0/9 completed (0%)\n");
    }

    #[test]
    fn too_few_goals_are_rejected_before_anything_is_stored() {
        let conn = open_db_in_memory().unwrap();
        let session = Session::new(&conn, AppConfig::default());
        let mut rng = StdRng::seed_from_u64(2);

        assert!(session
            .new_board(GridSize::FourByFour, &goals(9), &mut rng, &mut Vec::new())
            .is_err());
        assert!(session.show(&mut rng, &mut Vec::new()).is_err());
    }

    #[test]
    fn numeric_ids_are_matched_before_positions() {
        let conn = open_db_in_memory().unwrap();
        let session = Session::new(&conn, AppConfig::default());
        let mut rng = StdRng::seed_from_u64(7);
        let numbered: Vec<GoalInput> = (1..=9)
            .map(|i| GoalInput {
                id: Some(i.to_string()),
                text: format!("Goal {i}"),
            })
            .collect();
        session
            .new_board(GridSize::ThreeByThree, &numbered, &mut rng, &mut Vec::new())
            .unwrap();

        let board = session.open_board(&mut rng).unwrap();
        let target = (1..=9)
            .map(|i| i.to_string())
            .find(|id| board.cell_at(id.parse::<usize>().unwrap() - 1).unwrap().id.as_str() != id)
            .unwrap();
        assert_eq!(resolve_target(&board, &target).unwrap().as_str(), target);
        drop(board);

        let mut out = Vec::new();
        session.toggle(&target, &mut rng, &mut out).unwrap();
        assert_eq!(output(out), format!("checked {target}\n"));
    }

    #[test]
    fn field_errors_are_printed_once_per_row() {
        let conn = open_db_in_memory().unwrap();
        let session = Session::new(&conn, AppConfig::default());
        let mut rng = StdRng::seed_from_u64(3);
        let mut rows = goals(9);
        rows[1].text = "x".repeat(51);

        let mut out = Vec::new();
        assert!(session
            .new_board(GridSize::ThreeByThree, &rows, &mut rng, &mut out)
            .is_err());
        assert_eq!(output(out), "goal 2: 50 characters maximum\n");
    }

    #[test]
    fn admin_commands_go_through_routes() {
        let admin = AdminSession::new(open_db_in_memory().unwrap());

        admin.add("Learn to juggle", &mut Vec::new()).unwrap();
        let mut out = Vec::new();
        admin
            .update(1, &bingo_core::ResolutionPatch::status("2/3"), &mut out)
            .unwrap();
        assert_eq!(output(out), "Status updated\n");

        let mut out = Vec::new();
        admin.list(&mut out).unwrap();
        let listing = output(out);
        assert!(listing.contains("Learn to juggle"));
        assert!(listing.contains("2/3"));

        assert!(admin
            .update(9, &bingo_core::ResolutionPatch::status("done"), &mut Vec::new())
            .is_err());
    }
}

//! `bingo` command-line front end.
//!
//! # Responsibility
//! - Parse flags, merge them over the optional JSON config and start logging.
//! - Dispatch to the board, admin and serve commands in `commands`.

mod commands;

use bingo_core::db::open_db;
use bingo_core::{init_logging, AppConfig, GoalInput, GridSize, ResolutionPatch, ShareLocale};
use clap::{Parser, Subcommand};
use commands::{serve_admin_api, AdminSession, CommandResult, GoalsFile, Session};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{stdout, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bingo", version, about = "Resolutions bingo card")]
struct Cli {
    /// SQLite file holding boards and published resolutions.
    #[arg(long, global = true, env = "BINGO_DB")]
    db: Option<PathBuf>,
    /// Board namespace; several boards can share one database.
    #[arg(long, global = true, env = "BINGO_BOARD")]
    board: Option<String>,
    #[arg(long, global = true, env = "BINGO_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, global = true, env = "BINGO_LOCALE")]
    locale: Option<ShareLocale>,
    #[arg(long, global = true, env = "BINGO_LOG_LEVEL")]
    log_level: Option<String>,
    #[arg(long, global = true, env = "BINGO_LOG_DIR")]
    log_dir: Option<PathBuf>,
    /// Seed for shuffles, for reproducible output.
    #[arg(long, global = true)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit goals and start a freshly shuffled board.
    New {
        #[arg(long, default_value = "3x3")]
        grid: GridSize,
        #[arg(long = "goal")]
        goals: Vec<String>,
        /// JSON array of strings or `{id, text}` objects.
        #[arg(long, conflicts_with = "goals")]
        goals_file: Option<PathBuf>,
    },
    Show,
    /// Check or uncheck a cell by goal id or 1-based position.
    Toggle { target: String },
    /// Attach a progress note; an empty note clears it.
    Annotate { target: String, text: String },
    Reshuffle,
    Stats,
    Share,
    /// Clear completion, notes and order for the current goals.
    Reset,
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
    /// Serve the admin routes over HTTP.
    Serve {
        #[arg(long, default_value = "127.0.0.1:5000")]
        addr: String,
        /// Token admin clients send in the `x-admin-token` header.
        #[arg(long, env = "BINGO_ADMIN_TOKEN")]
        admin_token: Option<String>,
    },
    Version,
}

#[derive(Subcommand)]
enum AdminCommand {
    List,
    Add {
        text: String,
    },
    Update {
        id: i64,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        text: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Version = cli.command {
        println!("bingo {}", env!("CARGO_PKG_VERSION"));
        println!("bingo_core {}", bingo_core::core_version());
        return Ok(());
    }

    let config = resolve_config(&cli)?;
    if let Some(log_dir) = &config.log_dir {
        let log_dir = std::path::absolute(log_dir)?;
        init_logging(&config.log_level, &log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    let mut out = stdout().lock();

    match cli.command {
        Commands::Admin { command } => {
            let admin = AdminSession::new(conn);
            match command {
                AdminCommand::List => admin.list(&mut out),
                AdminCommand::Add { text } => admin.add(&text, &mut out),
                AdminCommand::Update { id, status, text } => {
                    admin.update(id, &ResolutionPatch { text, status }, &mut out)
                }
            }
        }
        Commands::Serve { addr, admin_token } => {
            let token = admin_token.or_else(|| config.admin_token.clone());
            serve_admin_api(conn, token.as_deref(), &addr, &mut out)
        }
        command => {
            let session = Session::new(&conn, config);
            let mut rng = match cli.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            run_board_command(&session, command, &mut rng, &mut out)
        }
    }
}

fn run_board_command(
    session: &Session<'_>,
    command: Commands,
    rng: &mut StdRng,
    out: &mut impl Write,
) -> CommandResult {
    match command {
        Commands::New {
            grid,
            goals,
            goals_file,
        } => {
            let inputs = match goals_file {
                Some(path) => GoalsFile::read(&path)?,
                None => goals.into_iter().map(GoalInput::text).collect(),
            };
            session.new_board(grid, &inputs, rng, out)
        }
        Commands::Show => session.show(rng, out),
        Commands::Toggle { target } => session.toggle(&target, rng, out),
        Commands::Annotate { target, text } => session.annotate(&target, &text, rng, out),
        Commands::Reshuffle => session.reshuffle(rng, out),
        Commands::Stats => session.stats(rng, out),
        Commands::Share => session.share(rng, out),
        Commands::Reset => session.reset(rng, out),
        Commands::Admin { .. } | Commands::Serve { .. } | Commands::Version => Ok(()),
    }
}

/// Flags and `BINGO_*` variables override the config file.
fn resolve_config(cli: &Cli) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(board) = cli.board.as_deref().map(str::trim) {
        if board.is_empty() {
            return Err("--board cannot be empty".into());
        }
        config.board_key = board.to_string();
    }
    if let Some(locale) = cli.locale {
        config.locale = locale;
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(log_dir) = &cli.log_dir {
        config.log_dir = Some(log_dir.clone());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{resolve_config, Cli, Commands};
    use clap::Parser;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "bingo", "--board", "work", "--locale", "fr", "toggle", "3",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.board_key, "work");
        assert_eq!(config.locale, bingo_core::ShareLocale::Fr);
        assert!(matches!(cli.command, Commands::Toggle { ref target } if target == "3"));
    }

    #[test]
    fn new_parses_grid_and_repeated_goals() {
        let cli = Cli::parse_from([
            "bingo", "new", "--grid", "4x4", "--goal", "Run", "--goal", "Read",
        ]);
        match cli.command {
            Commands::New { grid, goals, .. } => {
                assert_eq!(grid, bingo_core::GridSize::FourByFour);
                assert_eq!(goals, vec!["Run", "Read"]);
            }
            _ => panic!("expected new"),
        }
    }

    #[test]
    fn serve_reads_token_from_flag() {
        let cli = Cli::parse_from(["bingo", "serve", "--admin-token", "s3cret"]);
        match cli.command {
            Commands::Serve { addr, admin_token } => {
                assert_eq!(addr, "127.0.0.1:5000");
                assert_eq!(admin_token.as_deref(), Some("s3cret"));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn blank_board_flag_is_rejected() {
        let cli = Cli::parse_from(["bingo", "--board", "  ", "show"]);
        assert!(resolve_config(&cli).is_err());
    }
}

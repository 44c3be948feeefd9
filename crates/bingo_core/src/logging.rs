//! Rolling file logs for front ends.
//!
//! # Responsibility
//! - Start one `flexi_logger` backend per process.
//! - Capture panics as structured `event=panic_captured` lines.
//!
//! # Invariants
//! - A second `init_logging` with the same settings is a no-op; different
//!   settings are rejected.
//! - Goal text and annotations are never written to logs, only ids and counts.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::panic::PanicHookInfo;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "bingo";
const ROTATE_AT_BYTES: u64 = 2 * 1024 * 1024;
const KEEP_ROTATED_FILES: usize = 5;
const PANIC_PAYLOAD_LIMIT: usize = 160;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

#[derive(Debug)]
pub enum LoggingError {
    UnknownLevel(String),
    RelativeDir(PathBuf),
    CreateDir { dir: PathBuf, source: std::io::Error },
    Backend(flexi_logger::FlexiLoggerError),
    /// Logging already runs with other settings.
    Conflict { active: String, requested: String },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(
                f,
                "unknown log level `{level}`; use trace|debug|info|warn|error"
            ),
            Self::RelativeDir(dir) => {
                write!(f, "log directory must be absolute: `{}`", dir.display())
            }
            Self::CreateDir { dir, source } => {
                write!(f, "cannot create log directory `{}`: {source}", dir.display())
            }
            Self::Backend(err) => write!(f, "logger backend failed: {err}"),
            Self::Conflict { active, requested } => write!(
                f,
                "logging already active with {active}; cannot switch to {requested}"
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Settings {
    level: LevelFilter,
    dir: PathBuf,
}

impl Display for Settings {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "level={} dir={}",
            self.level.as_str().to_ascii_lowercase(),
            self.dir.display()
        )
    }
}

struct ActiveLogger {
    settings: Settings,
    _handle: LoggerHandle,
}

/// Starts file logging under `log_dir` at `level`.
///
/// # Errors
/// - Unknown level names, relative directories, and unwritable directories.
/// - `Conflict` when logging already runs with a different level or directory.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LoggingError> {
    let requested = Settings {
        level: parse_level(level)?,
        dir: absolute_dir(log_dir)?,
    };

    let active = ACTIVE.get_or_try_init(|| start(requested.clone()))?;
    if active.settings != requested {
        return Err(LoggingError::Conflict {
            active: active.settings.to_string(),
            requested: requested.to_string(),
        });
    }
    Ok(())
}

/// Active `(level, dir)`, if logging was started.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.settings.level, active.settings.dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(level: &str) -> Result<LevelFilter, LoggingError> {
    let trimmed = level.trim();
    let name = if trimmed.eq_ignore_ascii_case("warning") {
        "warn"
    } else {
        trimmed
    };
    match name.parse::<LevelFilter>() {
        Ok(LevelFilter::Off) | Err(_) => Err(LoggingError::UnknownLevel(trimmed.to_string())),
        Ok(filter) => Ok(filter),
    }
}

fn absolute_dir(dir: &Path) -> Result<PathBuf, LoggingError> {
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Err(LoggingError::RelativeDir(dir.to_path_buf()))
    }
}

fn start(settings: Settings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|source| LoggingError::CreateDir {
        dir: settings.dir.clone(),
        source,
    })?;

    let spec = settings.level.as_str().to_ascii_lowercase();
    let handle = Logger::try_with_str(&spec)
        .map_err(LoggingError::Backend)?
        .log_to_file(
            FileSpec::default()
                .directory(&settings.dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_ROTATED_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Backend)?;

    if PANIC_HOOK.set(()).is_ok() {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic| {
            error!(
                "event=panic_captured module=logging status=error location={} payload={}",
                panic
                    .location()
                    .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line())),
                panic_summary(panic)
            );
            previous(panic);
        }));
    }

    info!(
        "event=logging_init module=logging status=ok os={} version={} {settings}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION")
    );
    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

fn panic_summary(panic: &PanicHookInfo<'_>) -> String {
    let payload = panic.payload();
    let text = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    single_line(text, PANIC_PAYLOAD_LIMIT)
}

/// Flattens line breaks and caps the length; payloads may quote goal text.
fn single_line(value: &str, limit: usize) -> String {
    let mut out: String = value
        .chars()
        .map(|ch| if matches!(ch, '\n' | '\r') { ' ' } else { ch })
        .take(limit)
        .collect();
    if value.chars().count() > limit {
        out.push_str("...");
    }
    out
}

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// `~/.usage-dashboard`, or `./.usage-dashboard` without a home directory.
pub fn app_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".usage-dashboard")
}

/// Ensure `~/.usage-dashboard/` and its `logs/` subdirectory exist.
pub fn ensure_directories() -> anyhow::Result<()> {
    let dir = app_dir();
    std::fs::create_dir_all(&dir)?;
    std::fs::create_dir_all(dir.join("logs"))?;
    Ok(())
}

/// Log file used while a full-screen view owns the terminal.
pub fn default_log_file() -> PathBuf {
    app_dir().join("logs").join("dashboard.log")
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a CLI level name onto an [`EnvFilter`] directive.
///
/// Unknown names are passed through unchanged so that full directives such
/// as `"dashboard_data=debug"` keep working.
pub fn level_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" => "warn".to_string(),
        "ERROR" | "CRITICAL" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber.
///
/// With `log_file` set, events are appended to that file without ANSI
/// colours; otherwise they go to stderr.  Falls back to `"info"` if the
/// level string is not a valid filter.
pub fn setup_logging(log_level: &str, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_new(level_directive(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));

    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            let layer = fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file));
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
        None => {
            let layer = fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry()
                .with(filter)
                .with(layer)
                .try_init()?;
        }
    }

    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

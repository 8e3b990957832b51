use clap::Parser;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::error::{DashboardError, Result};
use crate::models::{FilterConfig, HostFilter};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Team application usage dashboard
#[derive(Parser, Debug, Clone)]
#[command(
    name = "usage-dashboard",
    about = "Filterable summary statistics and charts for application usage exports",
    version
)]
pub struct Settings {
    /// Activity CSV to load
    pub file: PathBuf,

    /// View mode
    #[arg(long, default_value = "dashboard", value_parser = ["dashboard", "report", "json"])]
    pub view: String,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,

    /// Host to include, or "All"
    #[arg(long, default_value = "All")]
    pub host: String,

    /// User to include (repeatable; none selected means every user)
    #[arg(long = "user")]
    pub users: Vec<String>,

    /// Application to include (repeatable; none selected means every application)
    #[arg(long = "app")]
    pub applications: Vec<String>,

    /// Seconds between checks of the input file for changes (1-60)
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..=60))]
    pub refresh_rate: u32,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and apply `--debug`.
    pub fn load() -> Self {
        Self::load_from(std::env::args_os())
    }

    /// Same as [`Settings::load`] with explicit arguments.
    pub fn load_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(args).apply_debug()
    }

    /// Build the initial [`FilterConfig`] from the filter flags.
    ///
    /// Returns an error when both bounds are given and `--from` is after
    /// `--to`.  A single bound leaves the other side open.
    pub fn filter_config(&self) -> Result<FilterConfig> {
        let date_range = match (self.from, self.to) {
            (Some(start), Some(end)) if start > end => {
                return Err(DashboardError::InvalidFilter(format!(
                    "--from {} is after --to {}",
                    start, end
                )));
            }
            (Some(start), Some(end)) => Some((start, end)),
            (Some(start), None) => Some((start, NaiveDate::MAX)),
            (None, Some(end)) => Some((NaiveDate::MIN, end)),
            (None, None) => None,
        };

        Ok(FilterConfig {
            date_range,
            host: HostFilter::from(self.host.clone()),
            users: self.users.iter().cloned().collect(),
            applications: self.applications.iter().cloned().collect(),
        })
    }

    fn apply_debug(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

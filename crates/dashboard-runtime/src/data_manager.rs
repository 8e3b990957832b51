//! Change-aware dataset cache for the dashboard runtime.
//!
//! Wraps [`read_activity_csv`] with a file-fingerprint check and retry
//! logic.  Callers use [`DatasetManager::get_dataset`] to obtain the current
//! [`Dataset`]; the file is only re-read when its modification time or length
//! changed, up to three read attempts are made with back-off, and a failed
//! reload falls back to the previously loaded dataset.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::models::ActivityRecord;
use dashboard_data::filter::FilterOptions;
use dashboard_data::reader::{read_activity_csv, IngestReport};

/// Maximum number of read attempts before keeping the previous dataset.
const MAX_RETRY_ATTEMPTS: u32 = 3;

// ── FileFingerprint ───────────────────────────────────────────────────────────

/// Cheap identity of a file's contents: modification time plus length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileFingerprint {
    pub modified: Option<SystemTime>,
    pub len: u64,
}

impl FileFingerprint {
    pub fn of(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path).map_err(|source| DashboardError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// One immutable load of the input file.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub path: PathBuf,
    pub records: Vec<ActivityRecord>,
    pub report: IngestReport,
    /// Selector choices derived from `records`.
    pub options: FilterOptions,
    pub fingerprint: FileFingerprint,
    pub loaded_at: DateTime<Local>,
}

impl Dataset {
    /// Read `path` into a dataset.
    pub fn load(path: &Path) -> Result<Self> {
        let fingerprint = FileFingerprint::of(path)?;
        let ingested = read_activity_csv(path)?;
        Ok(Self::from_records(
            path,
            ingested.records,
            ingested.report,
            fingerprint,
        ))
    }

    pub fn from_records(
        path: &Path,
        records: Vec<ActivityRecord>,
        report: IngestReport,
        fingerprint: FileFingerprint,
    ) -> Self {
        Self {
            path: path.to_path_buf(),
            options: FilterOptions::from_records(&records),
            records,
            report,
            fingerprint,
            loaded_at: Local::now(),
        }
    }

    /// File name for display, falling back to the full path.
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

// ── DatasetManager ────────────────────────────────────────────────────────────

/// Cached loader for a single CSV file.
///
/// # Example
/// ```no_run
/// use dashboard_runtime::data_manager::DatasetManager;
///
/// let mut mgr = DatasetManager::new("usage.csv");
/// if let Some(dataset) = mgr.get_dataset(false) {
///     println!("records: {}", dataset.records.len());
/// }
/// ```
pub struct DatasetManager {
    path: PathBuf,
    dataset: Option<Arc<Dataset>>,
    /// Incremented on every successful (re)load.
    generation: u64,
    last_error: Option<String>,
}

impl DatasetManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dataset: None,
            generation: 0,
            last_error: None,
        }
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Return the current dataset, reloading when the file changed.
    ///
    /// `force` bypasses the fingerprint check.  On failure the previous
    /// dataset (if any) is returned and [`last_error`](Self::last_error) is
    /// set.
    pub fn get_dataset(&mut self, force: bool) -> Option<Arc<Dataset>> {
        if !force && self.is_current() {
            tracing::debug!("dataset unchanged on disk");
            return self.dataset.clone();
        }

        match self.load_with_retry() {
            Ok(dataset) => {
                tracing::debug!(
                    records = dataset.records.len(),
                    dropped = dataset.report.dropped_invalid_date,
                    "dataset loaded"
                );
                self.dataset = Some(Arc::new(dataset));
                self.generation += 1;
                self.last_error = None;
                self.dataset.clone()
            }
            Err(e) => {
                tracing::warn!(error = %e, "load failed; keeping previous dataset");
                self.last_error = Some(e.to_string());
                self.dataset.clone()
            }
        }
    }

    /// Number of successful loads so far; changes exactly when a new
    /// dataset is installed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Private helpers ───────────────────────────────────────────────────

    /// `true` when a dataset is cached and the file still matches it.
    fn is_current(&self) -> bool {
        match (&self.dataset, FileFingerprint::of(&self.path)) {
            (Some(ds), Ok(fp)) => ds.fingerprint == fp,
            _ => false,
        }
    }

    /// Back-off schedule: attempt 1 → 0 ms, attempt 2 → 100 ms, attempt 3 → 200 ms.
    fn load_with_retry(&self) -> Result<Dataset> {
        let mut attempt = 0;
        loop {
            if attempt > 0 {
                let sleep_ms = u64::from(attempt) * 100;
                tracing::debug!(attempt, sleep_ms, "retrying load after back-off");
                thread::sleep(Duration::from_millis(sleep_ms));
            }

            match Dataset::load(&self.path) {
                Ok(dataset) => return Ok(dataset),
                Err(e) if attempt + 1 < MAX_RETRY_ATTEMPTS => {
                    tracing::warn!(attempt, error = %e, "load attempt failed");
                }
                Err(e) => return Err(e),
            }
            attempt += 1;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

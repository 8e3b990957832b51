//! Background reload orchestrator.
//!
//! Polls a [`DatasetManager`] in a tokio task and forwards every newly
//! loaded [`Dataset`] through an `mpsc` channel, so the TUI event loop can
//! react to a new upload without any shared mutable state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time;

use crate::data_manager::{Dataset, DatasetManager};

// ── Public types ──────────────────────────────────────────────────────────────

/// Message sent from the reload task to the presentation layer.
#[derive(Debug, Clone)]
pub enum DatasetUpdate {
    /// A new dataset replaced the previous one (or is the first one).
    Loaded(Arc<Dataset>),
    /// Reading the file failed; the previous dataset, if any, stays current.
    Failed(String),
}

// ── ReloadOrchestrator ────────────────────────────────────────────────────────

/// Background reload coordinator for one input file.
pub struct ReloadOrchestrator {
    refresh_interval: Duration,
    path: PathBuf,
}

impl ReloadOrchestrator {
    pub fn new(path: impl Into<PathBuf>, refresh_interval_secs: u64) -> Self {
        Self {
            refresh_interval: Duration::from_secs(refresh_interval_secs.max(1)),
            path: path.into(),
        }
    }

    /// Spawn the reload loop.
    ///
    /// Returns the receiving end of the update channel and a
    /// [`ReloadHandle`] that stops the loop.
    pub fn start(self) -> (mpsc::Receiver<DatasetUpdate>, ReloadHandle) {
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.reload_loop(tx).await;
        });

        (rx, ReloadHandle { handle })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// Load immediately, then poll on `refresh_interval` until the receiver
    /// is dropped.
    async fn reload_loop(self, tx: mpsc::Sender<DatasetUpdate>) {
        let mut manager = DatasetManager::new(self.path.clone());
        let mut state = SendState::default();

        if !Self::poll_and_send(&mut manager, &mut state, &tx, true).await {
            return;
        }

        let mut interval = time::interval(self.refresh_interval);
        // The first tick fires immediately; the initial load already ran.
        interval.tick().await;

        loop {
            interval.tick().await;

            if tx.is_closed() {
                tracing::debug!("reload channel closed; exiting loop");
                break;
            }

            if !Self::poll_and_send(&mut manager, &mut state, &tx, false).await {
                break;
            }
        }
    }

    /// Check the file and send whatever changed.  Returns `false` once the
    /// receiver is gone.
    async fn poll_and_send(
        manager: &mut DatasetManager,
        state: &mut SendState,
        tx: &mpsc::Sender<DatasetUpdate>,
        force: bool,
    ) -> bool {
        let dataset = manager.get_dataset(force);

        let update = if manager.generation() != state.generation {
            state.generation = manager.generation();
            state.error = None;
            dataset.map(DatasetUpdate::Loaded)
        } else {
            match manager.last_error() {
                Some(err) if state.error.as_deref() != Some(err) => {
                    state.error = Some(err.to_string());
                    Some(DatasetUpdate::Failed(err.to_string()))
                }
                Some(_) => None,
                None => {
                    state.error = None;
                    None
                }
            }
        };

        match update {
            Some(update) => {
                if tx.send(update).await.is_err() {
                    tracing::warn!("failed to send dataset update; receiver dropped");
                    return false;
                }
                true
            }
            None => true,
        }
    }
}

/// What the loop already told the receiver.
#[derive(Default)]
struct SendState {
    generation: u64,
    error: Option<String>,
}

// ── ReloadHandle ──────────────────────────────────────────────────────────────

/// Handle to the background reload task.
pub struct ReloadHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl ReloadHandle {
    /// Immediately abort the reload loop.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! Runtime layer for the usage dashboard.
//!
//! Loads the input file, reloads it in the background when it changes and
//! keeps the active filter selection together with its computed tables.

pub mod data_manager;
pub mod filter_session;
pub mod orchestrator;

pub use dashboard_core as core;
pub use dashboard_data as data;

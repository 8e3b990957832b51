//! Data layer for the usage dashboard.
//!
//! Reads activity CSV exports, applies a [`FilterConfig`] and builds the
//! aggregate tables consumed by the report, JSON and terminal views.
//!
//! [`FilterConfig`]: dashboard_core::models::FilterConfig

pub mod aggregator;
pub mod analysis;
pub mod filter;
pub mod reader;

pub use dashboard_core as core;

pub use analysis::{compute, DashboardTables};
pub use filter::{apply_filters, FilterOptions};
pub use reader::{parse_activity_csv, read_activity_csv, Ingested, IngestReport};

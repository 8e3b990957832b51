//! Terminal UI layer for the usage dashboard.
//!
//! Provides themes, chart components, the filter sidebar, the dashboard and
//! report views, and the application event loop built on top of
//! [`ratatui`].

pub mod app;
pub mod components;
pub mod dashboard_view;
pub mod filter_panel;
pub mod table_view;
pub mod themes;

pub use dashboard_core as core;

//! Core types for the usage dashboard.
//!
//! Activity records, the immutable filter configuration, lenient date
//! parsing, number formatting, CLI settings and the shared error type.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;

pub use error::{DashboardError, Result};
pub use models::{ActivityRecord, FilterConfig, HostFilter, ALL_HOSTS};

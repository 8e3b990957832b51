//! The filter-and-aggregate pipeline.
//!
//! [`compute`] is a pure function of the ingested records and a
//! [`FilterConfig`]; it never fails and an empty view yields well-formed
//! empty tables.  [`run_analysis`] wraps it with timing metadata for the
//! JSON output and the dashboard header.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use dashboard_core::error::Result;
use dashboard_core::models::{ActivityRecord, FilterConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregator::{
    HourTotal, KeyTotal, Matrix, ShareSlice, SummaryCounts, TopUser, UsageAggregator,
};
use crate::filter::{apply_filters, FilterOptions};
use crate::reader::{read_activity_csv, IngestReport};

// ── Public types ──────────────────────────────────────────────────────────────

/// Every table the rendering layer consumes, computed from one filtered view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardTables {
    /// The filtered view itself, in input order.
    pub filtered: Vec<ActivityRecord>,
    pub summary: SummaryCounts,
    pub by_application: Vec<KeyTotal>,
    pub application_shares: Vec<ShareSlice>,
    pub by_user: Vec<KeyTotal>,
    pub by_host: Vec<KeyTotal>,
    pub by_hour: Vec<HourTotal>,
    pub user_application: Matrix<String>,
    pub user_hour: Matrix<u32>,
    pub top_user: Option<TopUser>,
}

impl DashboardTables {
    /// Sum of minutes over the filtered view.
    pub fn total_minutes(&self) -> f64 {
        self.filtered.iter().map(ActivityRecord::minutes).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }
}

/// Metadata produced alongside the tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisMetadata {
    /// ISO-8601 timestamp when this result was generated.
    pub generated_at: String,
    /// Human summary of the filter that produced the tables.
    pub filter: String,
    /// Records fed into the filter.
    pub records_considered: usize,
    /// Records that passed it.
    pub records_matched: usize,
    /// Wall-clock seconds spent filtering and aggregating.
    pub compute_time_seconds: f64,
}

/// Tables plus metadata, the shape written by the JSON view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub tables: DashboardTables,
    pub metadata: AnalysisMetadata,
    /// Present when the result was produced straight from a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingest: Option<IngestReport>,
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Filter `records` with `filter` and build every aggregate table.
pub fn compute(records: &[ActivityRecord], filter: &FilterConfig) -> DashboardTables {
    let view = apply_filters(records, filter);

    let by_application = UsageAggregator::by_application(&view);
    let by_user = UsageAggregator::by_user(&view);
    let top_user = UsageAggregator::top_user(&by_user);

    DashboardTables {
        summary: UsageAggregator::summary(&view),
        application_shares: UsageAggregator::shares(&by_application),
        by_host: UsageAggregator::by_host(&view),
        by_hour: UsageAggregator::by_hour(&view),
        user_application: UsageAggregator::user_application_matrix(&view),
        user_hour: UsageAggregator::user_hour_matrix(&view),
        filtered: view.into_iter().cloned().collect(),
        by_application,
        by_user,
        top_user,
    }
}

/// [`compute`] with timing metadata attached.
///
/// The date range is clamped to the span of `records` first, so an
/// open-ended bound is reported as the date it actually reached.
pub fn run_analysis(records: &[ActivityRecord], filter: &FilterConfig) -> AnalysisResult {
    let start = Instant::now();
    let filter = &FilterOptions::from_records(records).clamp_date_range(filter);
    let tables = compute(records, filter);
    let elapsed = start.elapsed().as_secs_f64();

    debug!(
        "Computed tables for {} of {} records in {:.3}s",
        tables.filtered.len(),
        records.len(),
        elapsed
    );

    AnalysisResult {
        metadata: AnalysisMetadata {
            generated_at: Utc::now().to_rfc3339(),
            filter: filter.describe(),
            records_considered: records.len(),
            records_matched: tables.filtered.len(),
            compute_time_seconds: elapsed,
        },
        tables,
        ingest: None,
    }
}

/// Read `path` and run the pipeline in one step.
pub fn analyze_file(path: &Path, filter: &FilterConfig) -> Result<AnalysisResult> {
    let ingested = read_activity_csv(path)?;
    let mut result = run_analysis(&ingested.records, filter);
    result.ingest = Some(ingested.report);
    Ok(result)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

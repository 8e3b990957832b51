//! Current dataset plus the active filter selection.
//!
//! The selection is an immutable [`FilterConfig`] value: every mutation
//! builds a new config and, when it differs from the current one, re-runs
//! [`compute`].  Nothing else is cached between selections.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use dashboard_core::models::{FilterConfig, HostFilter};
use dashboard_data::analysis::{compute, DashboardTables};
use dashboard_data::filter::FilterOptions;

use crate::data_manager::Dataset;

/// Which multi-select a mutation applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionAxis {
    Users,
    Applications,
}

/// Which end of the date range to move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBound {
    Start,
    End,
}

#[derive(Debug, Default)]
pub struct FilterSession {
    dataset: Option<Arc<Dataset>>,
    options: FilterOptions,
    filter: FilterConfig,
    tables: DashboardTables,
}

impl FilterSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.dataset.as_ref()
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }

    pub fn tables(&self) -> &DashboardTables {
        &self.tables
    }

    /// Selector entries for `axis`, sorted ascending.
    pub fn choices(&self, axis: SelectionAxis) -> &[String] {
        match axis {
            SelectionAxis::Users => &self.options.users,
            SelectionAxis::Applications => &self.options.applications,
        }
    }

    pub fn is_selected(&self, axis: SelectionAxis, key: &str) -> bool {
        self.selection(axis).contains(key)
    }

    // ── Dataset lifecycle ─────────────────────────────────────────────────

    /// Install a freshly loaded dataset and reset to the spanning selection.
    pub fn install_dataset(&mut self, dataset: Arc<Dataset>) {
        tracing::debug!(
            records = dataset.records.len(),
            "installing dataset; selection reset"
        );
        self.options = dataset.options.clone();
        self.filter = self.options.spanning_selection();
        self.dataset = Some(dataset);
        self.recompute();
    }

    /// Overlay the non-default parts of `seed` on the current selection.
    ///
    /// Used for command-line selections: a date range, a specific host and
    /// non-empty user or application sets replace the spanning defaults.
    pub fn apply_overrides(&mut self, seed: &FilterConfig) {
        let mut next = self.filter.clone();
        if let Some((start, end)) = self.options.clamp_date_range(seed).date_range {
            next = next.with_date_range(start, end);
        }
        if seed.host != HostFilter::All {
            next = next.with_host(seed.host.clone());
        }
        if !seed.users.is_empty() {
            next = next.with_users(seed.users.iter().cloned());
        }
        if !seed.applications.is_empty() {
            next = next.with_applications(seed.applications.iter().cloned());
        }
        self.apply(next);
    }

    // ── Mutations ─────────────────────────────────────────────────────────

    /// Replace the whole selection.
    pub fn apply(&mut self, next: FilterConfig) {
        if next != self.filter {
            self.filter = next;
            self.recompute();
        }
    }

    pub fn set_host(&mut self, host: HostFilter) {
        let next = self.filter.clone().with_host(host);
        self.apply(next);
    }

    /// Advance to the next host choice, wrapping back to `All`.
    pub fn cycle_host(&mut self) {
        let choices = self.options.host_choices();
        let current = self.filter.host.to_string();
        let idx = choices.iter().position(|c| *c == current).unwrap_or(0);
        let next = &choices[(idx + 1) % choices.len()];
        self.set_host(HostFilter::from(next.clone()));
    }

    pub fn toggle(&mut self, axis: SelectionAxis, key: &str) {
        let mut selection = self.selection(axis).clone();
        if !selection.remove(key) {
            selection.insert(key.to_string());
        }
        self.set_selection(axis, selection);
    }

    pub fn select_all(&mut self, axis: SelectionAxis) {
        let all = self.choices(axis).iter().cloned().collect();
        self.set_selection(axis, all);
    }

    /// Clear the selection.  An empty set applies no filter on that axis.
    pub fn select_none(&mut self, axis: SelectionAxis) {
        self.set_selection(axis, BTreeSet::new());
    }

    /// Move one end of the date range by `days`, clamped to the dataset span
    /// and never crossing the other end.
    pub fn shift_range(&mut self, bound: RangeBound, days: i64) {
        let (Some(min), Some(max)) = (self.options.min_date, self.options.max_date) else {
            return;
        };
        let (start, end) = self.filter.date_range.unwrap_or((min, max));
        let shifted = |d: NaiveDate| {
            d.checked_add_signed(Duration::days(days))
                .unwrap_or(d)
                .clamp(min, max)
        };
        let (start, end) = match bound {
            RangeBound::Start => (shifted(start).min(end), end),
            RangeBound::End => (start, shifted(end).max(start)),
        };
        let next = self.filter.clone().with_date_range(start, end);
        self.apply(next);
    }

    /// Back to the spanning selection of the current dataset.
    pub fn reset(&mut self) {
        let next = self.options.spanning_selection();
        self.apply(next);
    }

    // ── Private helpers ───────────────────────────────────────────────────

    fn selection(&self, axis: SelectionAxis) -> &BTreeSet<String> {
        match axis {
            SelectionAxis::Users => &self.filter.users,
            SelectionAxis::Applications => &self.filter.applications,
        }
    }

    fn set_selection(&mut self, axis: SelectionAxis, selection: BTreeSet<String>) {
        let next = match axis {
            SelectionAxis::Users => self.filter.clone().with_users(selection),
            SelectionAxis::Applications => self.filter.clone().with_applications(selection),
        };
        self.apply(next);
    }

    fn recompute(&mut self) {
        self.tables = match &self.dataset {
            Some(ds) => compute(&ds.records, &self.filter),
            None => DashboardTables::default(),
        };
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

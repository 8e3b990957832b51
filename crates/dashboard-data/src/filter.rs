//! Filter options derived from a dataset and the filtered view itself.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use dashboard_core::models::{ActivityRecord, FilterConfig, HostFilter, ALL_HOSTS};
use serde::{Deserialize, Serialize};

/// Everything a selector needs to offer: the date span and the distinct
/// hosts, users and applications of a dataset, each sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
    pub hosts: Vec<String>,
    pub users: Vec<String>,
    pub applications: Vec<String>,
}

impl FilterOptions {
    pub fn from_records(records: &[ActivityRecord]) -> Self {
        let mut hosts = BTreeSet::new();
        let mut users = BTreeSet::new();
        let mut applications = BTreeSet::new();
        let mut min_date: Option<NaiveDate> = None;
        let mut max_date: Option<NaiveDate> = None;

        for r in records {
            hosts.insert(r.host.clone());
            users.insert(r.user.clone());
            applications.insert(r.application.clone());
            min_date = Some(min_date.map_or(r.date, |d| d.min(r.date)));
            max_date = Some(max_date.map_or(r.date, |d| d.max(r.date)));
        }

        Self {
            min_date,
            max_date,
            hosts: hosts.into_iter().collect(),
            users: users.into_iter().collect(),
            applications: applications.into_iter().collect(),
        }
    }

    /// Host selector entries: the `"All"` sentinel followed by every host.
    pub fn host_choices(&self) -> Vec<String> {
        std::iter::once(ALL_HOSTS.to_string())
            .chain(self.hosts.iter().cloned())
            .collect()
    }

    /// Default selection: full date span, host `All`, every user and every
    /// application selected.
    pub fn spanning_selection(&self) -> FilterConfig {
        let config = FilterConfig::default()
            .with_host(HostFilter::All)
            .with_users(self.users.iter().cloned())
            .with_applications(self.applications.iter().cloned());
        match (self.min_date, self.max_date) {
            (Some(start), Some(end)) => config.with_date_range(start, end),
            _ => config,
        }
    }

    /// `filter` with its date range pulled inside the dataset span.
    ///
    /// Matches exactly the same records; an open-ended bound from the
    /// command line becomes the first or last date actually present.
    pub fn clamp_date_range(&self, filter: &FilterConfig) -> FilterConfig {
        match (filter.date_range, self.min_date, self.max_date) {
            (Some((start, end)), Some(min), Some(max)) => filter
                .clone()
                .with_date_range(start.max(min), end.min(max)),
            _ => filter.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_date.is_none()
    }
}

/// Records passing every predicate of `filter`, in input order.
///
/// Always a subset of `records`; an empty user or application set applies
/// no filter on that axis.
pub fn apply_filters<'a>(
    records: &'a [ActivityRecord],
    filter: &FilterConfig,
) -> Vec<&'a ActivityRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Sentinel used by the host selector to mean "do not filter by host".
pub const ALL_HOSTS: &str = "All";

/// One ingested row of per-user / per-application activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Calendar day the activity belongs to (always present).
    pub date: NaiveDate,
    /// When the row was written by the collector, if it could be parsed.
    #[serde(default)]
    pub written_at: Option<NaiveDateTime>,
    /// Machine identifier.
    #[serde(default)]
    pub host: String,
    /// Person identifier.
    #[serde(default)]
    pub user: String,
    /// Program identifier.
    #[serde(default)]
    pub application: String,
    /// Active minutes; `None` when the source cell was blank or not numeric.
    #[serde(default)]
    pub total_active_time_minutes: Option<f64>,
}

impl ActivityRecord {
    /// Hour of day (0–23) taken from `written_at`, or `None` when hourless.
    pub fn hour(&self) -> Option<u32> {
        self.written_at.map(|ts| ts.hour())
    }

    /// Minutes contributed to sums; missing durations count as nothing.
    pub fn minutes(&self) -> f64 {
        self.total_active_time_minutes
            .filter(|m| m.is_finite())
            .unwrap_or(0.0)
    }
}

// ── HostFilter ────────────────────────────────────────────────────────────────

/// Host selection: either every host or exactly one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum HostFilter {
    /// No host filtering (the `"All"` sentinel).
    #[default]
    All,
    /// Keep only rows whose host equals this value exactly.
    Only(String),
}

impl HostFilter {
    /// Whether a record's host passes this selection.
    pub fn matches(&self, host: &str) -> bool {
        match self {
            HostFilter::All => true,
            HostFilter::Only(h) => h == host,
        }
    }
}

impl fmt::Display for HostFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostFilter::All => f.write_str(ALL_HOSTS),
            HostFilter::Only(h) => f.write_str(h),
        }
    }
}

impl FromStr for HostFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(HostFilter::from(s.to_string()))
    }
}

impl From<String> for HostFilter {
    fn from(s: String) -> Self {
        if s == ALL_HOSTS {
            HostFilter::All
        } else {
            HostFilter::Only(s)
        }
    }
}

impl From<HostFilter> for String {
    fn from(h: HostFilter) -> Self {
        h.to_string()
    }
}

// ── FilterConfig ──────────────────────────────────────────────────────────────

/// Immutable filter selection passed into the aggregation pipeline.
///
/// The four predicates are combined with logical AND.  The user and
/// application sets are *pass-through when empty*: deselecting everyone
/// applies no filter instead of hiding every row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Inclusive `(start, end)` date bounds; `None` disables the predicate.
    #[serde(default)]
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Host selection.
    #[serde(default)]
    pub host: HostFilter,
    /// Selected users; empty means no user filter.
    #[serde(default)]
    pub users: BTreeSet<String>,
    /// Selected applications; empty means no application filter.
    #[serde(default)]
    pub applications: BTreeSet<String>,
}

impl FilterConfig {
    /// Builder-style replacement of the date range.
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.date_range = Some((start, end));
        self
    }

    /// Builder-style replacement of the host selection.
    pub fn with_host(mut self, host: HostFilter) -> Self {
        self.host = host;
        self
    }

    /// Builder-style replacement of the user set.
    pub fn with_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.users = users.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style replacement of the application set.
    pub fn with_applications<I, S>(mut self, applications: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applications = applications.into_iter().map(Into::into).collect();
        self
    }

    /// `true` when the record passes every active predicate.
    pub fn matches(&self, record: &ActivityRecord) -> bool {
        if let Some((start, end)) = self.date_range {
            if record.date < start || record.date > end {
                return false;
            }
        }
        if !self.host.matches(&record.host) {
            return false;
        }
        // Empty selections are pass-through, mirroring the sidebar behaviour.
        if !self.users.is_empty() && !self.users.contains(&record.user) {
            return false;
        }
        if !self.applications.is_empty() && !self.applications.contains(&record.application) {
            return false;
        }
        true
    }

    /// One-line human description, e.g. `"2024-01-01..2024-01-31 | host All | 3 users | all apps"`.
    pub fn describe(&self) -> String {
        let range = match self.date_range {
            Some((s, e)) => format!("{}..{}", s, e),
            None => "all dates".to_string(),
        };
        let users = match self.users.len() {
            0 => "all users".to_string(),
            1 => "1 user".to_string(),
            n => format!("{} users", n),
        };
        let apps = match self.applications.len() {
            0 => "all apps".to_string(),
            1 => "1 app".to_string(),
            n => format!("{} apps", n),
        };
        format!("{} | host {} | {} | {}", range, self.host, users, apps)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

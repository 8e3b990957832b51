//! Grouped sums over a filtered view of activity records.
//!
//! Every table sums `total_active_time_minutes`; missing durations count as
//! zero.  Grouping goes through a `BTreeMap`, so keys are enumerated in
//! ascending order before the stable descending sort, which makes ties come
//! out in key order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use dashboard_core::models::ActivityRecord;
use serde::{Deserialize, Serialize};

// ── Table types ───────────────────────────────────────────────────────────────

/// One row of a single-key aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyTotal {
    pub key: String,
    pub minutes: f64,
}

/// One row of the hour-of-day aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourTotal {
    /// Hour of day, 0–23.
    pub hour: u32,
    /// Always strictly positive.
    pub minutes: f64,
}

/// A key's share of the overall total, for the pie / share list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareSlice {
    pub key: String,
    pub minutes: f64,
    /// Percentage of the summed minutes, rounded to one decimal.
    pub percent: f64,
}

/// Dense pivot table: `values[row][column]`, absent combinations are 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matrix<C> {
    pub rows: Vec<String>,
    pub columns: Vec<C>,
    pub values: Vec<Vec<f64>>,
}

impl<C> Default for Matrix<C> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<C: PartialEq> Matrix<C> {
    /// Cell lookup by labels; `None` only when a label is unknown.
    pub fn get(&self, row: &str, column: &C) -> Option<f64> {
        let r = self.rows.iter().position(|x| x == row)?;
        let c = self.columns.iter().position(|x| x == column)?;
        Some(self.values[r][c])
    }
}

impl<C> Matrix<C> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn row_total(&self, row: usize) -> f64 {
        self.values.get(row).map_or(0.0, |r| r.iter().sum())
    }

    pub fn column_totals(&self) -> Vec<f64> {
        (0..self.columns.len())
            .map(|c| self.values.iter().map(|r| r[c]).sum())
            .collect()
    }

    /// Largest cell value, 0 for an empty matrix.
    pub fn max_value(&self) -> f64 {
        self.values
            .iter()
            .flat_map(|r| r.iter().copied())
            .fold(0.0, f64::max)
    }
}

/// Row and distinct-key counts of the filtered view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub total_records: usize,
    pub unique_users: usize,
    pub unique_applications: usize,
    pub unique_hosts: usize,
}

/// The user with the largest summed minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopUser {
    pub user: String,
    pub minutes: f64,
    /// `round(minutes / max * 100)` capped at 100; 0 when max is 0.
    pub percent_of_max: u8,
}

/// Percentage of `value` relative to `max`, rounded and capped to `0..=100`.
///
/// A zero (or negative, or non-finite) maximum yields 0.
pub fn percent_of_max(value: f64, max: f64) -> u8 {
    if !max.is_finite() || max <= 0.0 || !value.is_finite() {
        return 0;
    }
    (value / max * 100.0).round().clamp(0.0, 100.0) as u8
}

// ── UsageAggregator ───────────────────────────────────────────────────────────

/// Stateless helper that builds every aggregate table from a filtered view.
pub struct UsageAggregator;

impl UsageAggregator {
    /// Minutes per application, descending.
    pub fn by_application(records: &[&ActivityRecord]) -> Vec<KeyTotal> {
        Self::ranked_by(records, |r| &r.application)
    }

    /// Minutes per user, descending.
    pub fn by_user(records: &[&ActivityRecord]) -> Vec<KeyTotal> {
        Self::ranked_by(records, |r| &r.user)
    }

    /// Minutes per host, descending.
    pub fn by_host(records: &[&ActivityRecord]) -> Vec<KeyTotal> {
        Self::ranked_by(records, |r| &r.host)
    }

    /// Minutes per hour of `written_at`, ascending by hour.
    ///
    /// Hourless records are skipped and hours whose total is not strictly
    /// positive are omitted.
    pub fn by_hour(records: &[&ActivityRecord]) -> Vec<HourTotal> {
        let mut map: BTreeMap<u32, f64> = BTreeMap::new();
        for r in records {
            if let Some(hour) = r.hour() {
                *map.entry(hour).or_default() += r.minutes();
            }
        }
        map.into_iter()
            .filter(|(_, minutes)| *minutes > 0.0)
            .map(|(hour, minutes)| HourTotal { hour, minutes })
            .collect()
    }

    /// Share of each application in the overall total, in `totals` order.
    pub fn shares(totals: &[KeyTotal]) -> Vec<ShareSlice> {
        let sum: f64 = totals.iter().map(|t| t.minutes).sum();
        totals
            .iter()
            .map(|t| ShareSlice {
                key: t.key.clone(),
                minutes: t.minutes,
                percent: dashboard_core::formatting::percentage(t.minutes, sum, 1),
            })
            .collect()
    }

    /// User × application pivot over every user and application in the view.
    pub fn user_application_matrix(records: &[&ActivityRecord]) -> Matrix<String> {
        let mut cells: BTreeMap<(&str, &str), f64> = BTreeMap::new();
        let mut users = BTreeSet::new();
        let mut apps = BTreeSet::new();

        for r in records {
            users.insert(r.user.as_str());
            apps.insert(r.application.as_str());
            *cells
                .entry((r.user.as_str(), r.application.as_str()))
                .or_default() += r.minutes();
        }

        let values = users
            .iter()
            .map(|u| {
                apps.iter()
                    .map(|a| cells.get(&(*u, *a)).copied().unwrap_or(0.0))
                    .collect()
            })
            .collect();

        Matrix {
            rows: users.into_iter().map(str::to_string).collect(),
            columns: apps.into_iter().map(str::to_string).collect(),
            values,
        }
    }

    /// User × hour pivot for the heatmap.
    ///
    /// Columns are the hours of [`by_hour`](Self::by_hour); rows are the users
    /// with at least one hour-bearing record.
    pub fn user_hour_matrix(records: &[&ActivityRecord]) -> Matrix<u32> {
        let hours: Vec<u32> = Self::by_hour(records).iter().map(|h| h.hour).collect();

        let mut cells: BTreeMap<(&str, u32), f64> = BTreeMap::new();
        let mut users = BTreeSet::new();
        for r in records {
            if let Some(hour) = r.hour() {
                users.insert(r.user.as_str());
                *cells.entry((r.user.as_str(), hour)).or_default() += r.minutes();
            }
        }

        if hours.is_empty() {
            return Matrix::default();
        }

        let values = users
            .iter()
            .map(|u| {
                hours
                    .iter()
                    .map(|h| cells.get(&(*u, *h)).copied().unwrap_or(0.0))
                    .collect()
            })
            .collect();

        Matrix {
            rows: users.into_iter().map(str::to_string).collect(),
            columns: hours,
            values,
        }
    }

    pub fn summary(records: &[&ActivityRecord]) -> SummaryCounts {
        SummaryCounts {
            total_records: records.len(),
            unique_users: Self::distinct(records, |r| &r.user),
            unique_applications: Self::distinct(records, |r| &r.application),
            unique_hosts: Self::distinct(records, |r| &r.host),
        }
    }

    /// Top user from a descending [`by_user`](Self::by_user) table.
    pub fn top_user(by_user: &[KeyTotal]) -> Option<TopUser> {
        let top = by_user.first()?;
        let max = by_user
            .iter()
            .map(|t| t.minutes)
            .fold(f64::NEG_INFINITY, f64::max);
        Some(TopUser {
            user: top.key.clone(),
            minutes: top.minutes,
            percent_of_max: percent_of_max(top.minutes, max),
        })
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn distinct(records: &[&ActivityRecord], key_fn: impl Fn(&ActivityRecord) -> &String) -> usize {
        records.iter().map(|r| key_fn(r)).collect::<BTreeSet<_>>().len()
    }

    fn ranked_by(
        records: &[&ActivityRecord],
        key_fn: impl Fn(&ActivityRecord) -> &String,
    ) -> Vec<KeyTotal> {
        let mut map: BTreeMap<&str, f64> = BTreeMap::new();
        for r in records {
            *map.entry(key_fn(r).as_str()).or_default() += r.minutes();
        }

        let mut totals: Vec<KeyTotal> = map
            .into_iter()
            .map(|(key, minutes)| KeyTotal {
                key: key.to_string(),
                minutes,
            })
            .collect();
        // Stable: equal sums keep ascending key order.
        totals.sort_by(|a, b| b.minutes.partial_cmp(&a.minutes).unwrap_or(Ordering::Equal));
        totals
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(user: &str, app: &str, host: &str, hour: Option<u32>, minutes: Option<f64>) -> ActivityRecord {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        ActivityRecord {
            date,
            written_at: hour.and_then(|h| date.and_hms_opt(h, 0, 0)),
            host: host.to_string(),
            user: user.to_string(),
            application: app.to_string(),
            total_active_time_minutes: minutes,
        }
    }

    fn refs(records: &[ActivityRecord]) -> Vec<&ActivityRecord> {
        records.iter().collect()
    }

    fn keys(totals: &[KeyTotal]) -> Vec<&str> {
        totals.iter().map(|t| t.key.as_str()).collect()
    }

    // ── single-key tables ─────────────────────────────────────────────────────

    #[test]
    fn test_by_application_descending() {
        let records = vec![
            rec("alice", "X", "h1", Some(9), Some(30.0)),
            rec("alice", "Y", "h1", Some(9), Some(10.0)),
            rec("bob", "Z", "h2", Some(10), Some(50.0)),
            rec("bob", "X", "h2", Some(10), Some(5.0)),
        ];
        let totals = UsageAggregator::by_application(&refs(&records));
        assert_eq!(keys(&totals), vec!["Z", "X", "Y"]);
        assert_eq!(totals[1].minutes, 35.0);
    }

    #[test]
    fn test_ties_keep_ascending_key_order() {
        let records = vec![
            rec("carol", "X", "h", None, Some(10.0)),
            rec("alice", "X", "h", None, Some(10.0)),
            rec("bob", "X", "h", None, Some(20.0)),
        ];
        let totals = UsageAggregator::by_user(&refs(&records));
        assert_eq!(keys(&totals), vec!["bob", "alice", "carol"]);
    }

    #[test]
    fn test_missing_minutes_count_as_zero() {
        let records = vec![
            rec("alice", "X", "h", None, None),
            rec("alice", "X", "h", None, Some(4.0)),
        ];
        let totals = UsageAggregator::by_host(&refs(&records));
        assert_eq!(totals, vec![KeyTotal { key: "h".into(), minutes: 4.0 }]);
    }

    #[test]
    fn test_empty_identifiers_form_their_own_group() {
        let records = vec![rec("", "X", "h", None, Some(3.0))];
        let totals = UsageAggregator::by_user(&refs(&records));
        assert_eq!(keys(&totals), vec![""]);
    }

    #[test]
    fn test_empty_view_yields_empty_tables() {
        let view: Vec<&ActivityRecord> = Vec::new();
        assert!(UsageAggregator::by_application(&view).is_empty());
        assert!(UsageAggregator::by_hour(&view).is_empty());
        assert!(UsageAggregator::user_application_matrix(&view).is_empty());
        assert!(UsageAggregator::user_hour_matrix(&view).is_empty());
        assert_eq!(UsageAggregator::summary(&view), SummaryCounts::default());
        assert_eq!(UsageAggregator::top_user(&[]), None);
    }

    // ── by_hour ───────────────────────────────────────────────────────────────

    #[test]
    fn test_by_hour_skips_hourless_and_non_positive() {
        let records = vec![
            rec("alice", "X", "h", Some(14), Some(10.0)),
            rec("alice", "X", "h", Some(9), Some(5.0)),
            rec("alice", "X", "h", Some(9), Some(2.0)),
            rec("alice", "X", "h", Some(3), Some(0.0)),
            rec("alice", "X", "h", None, Some(100.0)),
        ];
        let hours = UsageAggregator::by_hour(&refs(&records));
        assert_eq!(
            hours,
            vec![
                HourTotal { hour: 9, minutes: 7.0 },
                HourTotal { hour: 14, minutes: 10.0 },
            ]
        );
    }

    // ── matrices ──────────────────────────────────────────────────────────────

    #[test]
    fn test_user_application_matrix_fills_zeros() {
        let records = vec![
            rec("alice", "X", "h", None, Some(30.0)),
            rec("alice", "Y", "h", None, Some(10.0)),
            rec("bob", "X", "h", None, Some(5.0)),
        ];
        let m = UsageAggregator::user_application_matrix(&refs(&records));
        assert_eq!(m.rows, vec!["alice", "bob"]);
        assert_eq!(m.columns, vec!["X", "Y"]);
        assert_eq!(m.get("bob", &"Y".to_string()), Some(0.0));
        assert_eq!(m.get("alice", &"X".to_string()), Some(30.0));
        assert_eq!(m.get("carol", &"X".to_string()), None);
        assert_eq!(m.row_total(0), 40.0);
        assert_eq!(m.column_totals(), vec![35.0, 10.0]);
        assert_eq!(m.max_value(), 30.0);
        assert!(m.values.iter().all(|r| r.len() == m.columns.len()));
    }

    #[test]
    fn test_user_hour_matrix_columns_follow_hour_table() {
        let records = vec![
            rec("alice", "X", "h", Some(9), Some(5.0)),
            rec("bob", "X", "h", Some(11), Some(3.0)),
            rec("bob", "X", "h", Some(4), Some(0.0)),
            rec("carol", "X", "h", None, Some(8.0)),
        ];
        let m = UsageAggregator::user_hour_matrix(&refs(&records));
        assert_eq!(m.columns, vec![9, 11]);
        assert_eq!(m.rows, vec!["alice", "bob"]);
        assert_eq!(m.get("alice", &11), Some(0.0));
        assert_eq!(m.get("bob", &11), Some(3.0));
    }

    // ── summary / top user ────────────────────────────────────────────────────

    #[test]
    fn test_summary_counts() {
        let records = vec![
            rec("alice", "X", "h1", None, Some(1.0)),
            rec("alice", "Y", "h1", None, Some(1.0)),
            rec("bob", "X", "h2", None, Some(1.0)),
        ];
        let s = UsageAggregator::summary(&refs(&records));
        assert_eq!(
            s,
            SummaryCounts {
                total_records: 3,
                unique_users: 2,
                unique_applications: 2,
                unique_hosts: 2,
            }
        );
    }

    #[test]
    fn test_top_user() {
        let records = vec![
            rec("alice", "X", "h", None, Some(40.0)),
            rec("bob", "X", "h", None, Some(5.0)),
        ];
        let by_user = UsageAggregator::by_user(&refs(&records));
        let top = UsageAggregator::top_user(&by_user).unwrap();
        assert_eq!(top.user, "alice");
        assert_eq!(top.minutes, 40.0);
        assert_eq!(top.percent_of_max, 100);
    }

    #[test]
    fn test_top_user_with_zero_max() {
        let records = vec![rec("alice", "X", "h", None, None)];
        let by_user = UsageAggregator::by_user(&refs(&records));
        let top = UsageAggregator::top_user(&by_user).unwrap();
        assert_eq!(top.percent_of_max, 0);
    }

    #[test]
    fn test_percent_of_max_bounds() {
        assert_eq!(percent_of_max(0.0, 0.0), 0);
        assert_eq!(percent_of_max(5.0, 0.0), 0);
        assert_eq!(percent_of_max(1.0, 3.0), 33);
        assert_eq!(percent_of_max(2.0, 3.0), 67);
        assert_eq!(percent_of_max(150.0, 100.0), 100);
        assert_eq!(percent_of_max(-5.0, 100.0), 0);
        assert_eq!(percent_of_max(f64::NAN, 10.0), 0);
    }

    #[test]
    fn test_shares() {
        let totals = vec![
            KeyTotal { key: "X".into(), minutes: 30.0 },
            KeyTotal { key: "Y".into(), minutes: 10.0 },
        ];
        let shares = UsageAggregator::shares(&totals);
        assert_eq!(shares[0].percent, 75.0);
        assert_eq!(shares[1].percent, 25.0);

        let zero = UsageAggregator::shares(&[KeyTotal { key: "X".into(), minutes: 0.0 }]);
        assert_eq!(zero[0].percent, 0.0);
    }
}

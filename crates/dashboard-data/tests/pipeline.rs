//! End-to-end checks of ingest → filter → aggregate from CSV text.

use chrono::NaiveDate;
use dashboard_core::models::{FilterConfig, HostFilter};
use dashboard_data::aggregator::KeyTotal;
use dashboard_data::{compute, parse_activity_csv, FilterOptions};

const CSV: &str = "\
Date,WrittenAt,Host,User,Application,Total_Active_Time_Minutes
02/01/2024,01/02/2024 09:10:00,ws-1,alice,X,30
02/01/2024,01/02/2024 14:00:00,ws-1,alice,Y,10
03/01/2024,01/03/2024 09:45:00,ws-2,bob,X,5
03/01/2024,,ws-2,carol,Z,12
31/02/2024,02/28/2024 11:00:00,ws-1,alice,X,99
yesterday,01/03/2024 09:00:00,ws-2,bob,X,7
04/01/2024,01/04/2024 16:30:00,ws-3,dave,Y,not-a-number
";

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn totals(table: &[KeyTotal]) -> Vec<(&str, f64)> {
    table.iter().map(|t| (t.key.as_str(), t.minutes)).collect()
}

#[test]
fn unparseable_primary_dates_are_dropped() {
    let ingested = parse_activity_csv(CSV.as_bytes()).unwrap();
    assert_eq!(ingested.report.rows_read, 7);
    assert_eq!(ingested.report.dropped_invalid_date, 2);
    assert_eq!(ingested.records.len(), 5);
    assert_eq!(ingested.report.missing_written_at, 1);
    assert_eq!(ingested.report.unparsed_minutes, 1);
}

#[test]
fn single_day_range_over_three_rows() {
    let csv = "\
Date,WrittenAt,Host,User,Application,Total_Active_Time_Minutes
02/01/2024,01/02/2024 09:00,ws-1,alice,X,30
02/01/2024,01/02/2024 10:00,ws-1,alice,Y,10
03/01/2024,01/03/2024 09:00,ws-1,bob,X,5
";
    let ingested = parse_activity_csv(csv.as_bytes()).unwrap();
    assert_eq!(ingested.records.len(), 3);

    let filter = FilterConfig::default().with_date_range(day(2), day(2));
    let tables = compute(&ingested.records, &filter);
    assert_eq!(tables.filtered.len(), 2);
    assert!(tables.filtered.iter().all(|r| r.user == "alice"));
    assert_eq!(totals(&tables.by_user), vec![("alice", 40.0)]);
    assert_eq!(totals(&tables.by_application), vec![("X", 30.0), ("Y", 10.0)]);
    let top = tables.top_user.as_ref().unwrap();
    assert_eq!(top.user, "alice");
    assert_eq!(top.percent_of_max, 100);

    let no_users = filter.clone().with_users(Vec::<String>::new());
    assert_eq!(compute(&ingested.records, &no_users), tables);
}

#[test]
fn documented_example_with_date_range() {
    let ingested = parse_activity_csv(CSV.as_bytes()).unwrap();
    let filter = FilterConfig::default()
        .with_date_range(day(2), day(2))
        .with_users(["alice", "bob"])
        .with_applications(["X", "Y"]);

    let tables = compute(&ingested.records, &filter);
    assert_eq!(tables.filtered.len(), 2);
    assert_eq!(totals(&tables.by_user), vec![("alice", 40.0)]);
    assert_eq!(totals(&tables.by_application), vec![("X", 30.0), ("Y", 10.0)]);
    let top = tables.top_user.unwrap();
    assert_eq!(top.user, "alice");
    assert_eq!(top.percent_of_max, 100);
}

#[test]
fn empty_user_selection_is_pass_through() {
    let ingested = parse_activity_csv(CSV.as_bytes()).unwrap();
    let range_only = FilterConfig::default().with_date_range(day(2), day(3));
    let with_empty_sets = range_only
        .clone()
        .with_users(Vec::<String>::new())
        .with_applications(Vec::<String>::new());

    let a = compute(&ingested.records, &range_only);
    let b = compute(&ingested.records, &with_empty_sets);
    assert_eq!(a, b);
    assert_eq!(a.filtered.len(), 4);
}

#[test]
fn filtered_view_is_subset_and_deterministic() {
    let ingested = parse_activity_csv(CSV.as_bytes()).unwrap();
    let filter = FilterConfig::default().with_host(HostFilter::Only("ws-2".to_string()));

    let first = compute(&ingested.records, &filter);
    let second = compute(&ingested.records, &filter);
    assert_eq!(first, second);
    assert!(first
        .filtered
        .iter()
        .all(|r| ingested.records.contains(r) && r.host == "ws-2"));
}

#[test]
fn single_key_sums_equal_view_sum() {
    let ingested = parse_activity_csv(CSV.as_bytes()).unwrap();
    let tables = compute(&ingested.records, &FilterConfig::default());
    let view_sum = tables.total_minutes();

    for table in [&tables.by_application, &tables.by_user, &tables.by_host] {
        let sum: f64 = table.iter().map(|t| t.minutes).sum();
        assert!((sum - view_sum).abs() < 1e-9);
    }
    assert_eq!(view_sum, 57.0);
}

#[test]
fn pivot_has_no_missing_cells() {
    let ingested = parse_activity_csv(CSV.as_bytes()).unwrap();
    let tables = compute(&ingested.records, &FilterConfig::default());
    let m = &tables.user_application;

    assert_eq!(m.rows.len(), tables.summary.unique_users);
    assert_eq!(m.columns.len(), tables.summary.unique_applications);
    for user in &m.rows {
        for app in &m.columns {
            assert!(m.get(user, app).is_some());
        }
    }
    assert_eq!(m.get("bob", &"Y".to_string()), Some(0.0));
}

#[test]
fn hour_table_has_only_positive_values() {
    let ingested = parse_activity_csv(CSV.as_bytes()).unwrap();
    let tables = compute(&ingested.records, &FilterConfig::default());

    assert!(tables.by_hour.iter().all(|h| h.minutes > 0.0));
    let hours: Vec<u32> = tables.by_hour.iter().map(|h| h.hour).collect();
    // dave's 16:30 row has no numeric duration, carol's row has no timestamp.
    assert_eq!(hours, vec![9, 14]);
    assert_eq!(tables.user_hour.columns, hours);
}

#[test]
fn top_user_percent_is_bounded() {
    let ingested = parse_activity_csv(CSV.as_bytes()).unwrap();
    let dave_only = FilterConfig::default().with_users(["dave"]);
    let tables = compute(&ingested.records, &dave_only);
    assert_eq!(tables.top_user.unwrap().percent_of_max, 0);

    let nobody = FilterConfig::default().with_users(["nobody"]);
    let tables = compute(&ingested.records, &nobody);
    assert!(tables.top_user.is_none());
    assert!(tables.by_application.is_empty());
    assert!(tables.user_application.is_empty());
}

#[test]
fn spanning_selection_matches_no_filter() {
    let ingested = parse_activity_csv(CSV.as_bytes()).unwrap();
    let options = FilterOptions::from_records(&ingested.records);
    assert_eq!(options.min_date, Some(day(2)));
    assert_eq!(options.max_date, Some(day(4)));

    let spanning = compute(&ingested.records, &options.spanning_selection());
    let unfiltered = compute(&ingested.records, &FilterConfig::default());
    assert_eq!(spanning, unfiltered);
}

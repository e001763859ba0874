use std::path::PathBuf;

use chrono::NaiveDate;

use wpl_stats::dataset::{load_match_table, load_match_table_with, read_raw_table};
use wpl_stats::match_record::{MatchResult, TossDecision, UNKNOWN_VENUE};
use wpl_stats::head_to_head::aggregate_head_to_head;
use wpl_stats::normalize::{RowPolicy, normalize, normalize_with};
use wpl_stats::{SeasonFilter, StatsError};

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn loads_sample_league() {
    let (table, report) = load_match_table(&fixture_path("wpl_sample.csv")).expect("fixture should load");
    assert_eq!(table.len(), 11);
    assert_eq!(report.rows_in, 11);
    assert_eq!(report.rows_skipped, 0);
    assert!(!report.venue_defaulted);
    assert_eq!(table.seasons(), vec![2023, 2024]);
    assert_eq!(
        table.teams(),
        vec![
            "Delhi Capitals",
            "Gujarat Giants",
            "Mumbai Indians",
            "Royal Challengers Bangalore"
        ]
    );

    let first = &table.records()[0];
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2023, 3, 4));
    assert_eq!(first.toss_decision, TossDecision::Field);
    assert_eq!(first.winner_runs, 143);
    assert_eq!(first.winner_wickets, 0);

    let tie = &table.records()[7];
    assert_eq!(tie.result, MatchResult::Tie);
    let no_result = &table.records()[8];
    assert_eq!(no_result.result, MatchResult::NoResult);
    assert_eq!((no_result.winner_runs, no_result.winner_wickets), (0, 0));
}

#[test]
fn messy_export_is_rejected_by_default() {
    let err = load_match_table(&fixture_path("wpl_messy.csv")).unwrap_err();
    match err {
        StatsError::InvalidRow { row, reason } => {
            assert_eq!(row, 3);
            assert!(reason.contains("plays itself"), "{reason}");
        }
        other => panic!("expected invalid row, got {other:?}"),
    }
}

#[test]
fn unplaceable_rows_fail_instead_of_vanishing() {
    let csv = "team1,team2,winner,toss_winner,toss_decision\n\
               A,B,A,A,bat\n\
               A,B,B,a,field\n\
               A,B,B,B,coin\n";
    let raw = read_raw_table(csv.as_bytes()).unwrap();

    let err = normalize(&raw).unwrap_err();
    assert!(matches!(err, StatsError::InvalidRow { row: 2, .. }), "{err:?}");

    let (table, report) = normalize_with(&raw, RowPolicy::Skip).unwrap();
    assert_eq!((report.rows_in, report.rows_kept, report.rows_skipped), (3, 1, 2));
    let h2h = aggregate_head_to_head(&table, SeasonFilter::Overall);
    assert_eq!(h2h[0].matches, 1);
}

#[test]
fn skip_policy_repairs_messy_export() {
    let (table, report) = load_match_table_with(&fixture_path("wpl_messy.csv"), RowPolicy::Skip)
        .expect("fixture should load");

    // Self-fixture, foreign toss winner and unknown toss call are dropped.
    assert_eq!(report.rows_in, 6);
    assert_eq!(report.rows_skipped, 3);
    assert_eq!(report.rows_kept, 3);
    assert_eq!(report.dates_unparsed, 1);
    assert!(report.venue_defaulted);
    assert!(table.records().iter().all(|m| m.venue == UNKNOWN_VENUE));

    let first = &table.records()[0];
    assert_eq!(first.team1, "Gujarat Giants");
    assert_eq!(first.team2, "Mumbai Indians");
    assert_eq!(first.match_number, 1);
    assert_eq!(first.season, 2023);
    assert_eq!(first.date, NaiveDate::from_ymd_opt(2023, 3, 4));
    assert_eq!(first.toss_decision, TossDecision::Field);
    assert_eq!((first.winner_runs, first.winner_wickets), (143, 0));

    let undated = &table.records()[1];
    assert_eq!(undated.date, None);
    assert_eq!(undated.year, 2023);
    assert_eq!(undated.toss_decision, TossDecision::Field);

    let no_season = &table.records()[2];
    assert_eq!(no_season.season, 2023);
    assert_eq!(no_season.toss_decision, TossDecision::Bat);
}

#[test]
fn missing_required_columns_fail_with_schema_error() {
    let csv = "team1,team2,winner\nA,B,A\n";
    let raw = read_raw_table(csv.as_bytes()).unwrap();
    let err = normalize(&raw).unwrap_err();
    match err {
        StatsError::Schema { missing } => {
            assert_eq!(missing, vec!["toss_winner", "toss_decision"]);
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn header_only_input_is_an_empty_table() {
    let csv = "team1,team2,winner,toss_winner,toss_decision\n";
    let raw = read_raw_table(csv.as_bytes()).unwrap();
    let (table, report) = normalize(&raw).unwrap();
    assert!(table.is_empty());
    assert_eq!(report.rows_in, 0);
    assert!(report.venue_defaulted);
}

#[test]
fn missing_margins_become_zero() {
    let csv = "team1,team2,winner,toss_winner,toss_decision,winner_runs,winner_wickets\n\
               A,B,A,A,bat,,\n\
               A,B,,B,field,,\n";
    let raw = read_raw_table(csv.as_bytes()).unwrap();
    let (table, _) = normalize(&raw).unwrap();
    for m in table.records() {
        assert_eq!((m.winner_runs, m.winner_wickets), (0, 0));
    }
    assert_eq!(table.records()[0].result, MatchResult::Won("A".to_string()));
    assert_eq!(table.records()[1].result, MatchResult::NoResult);
    // No season and no date: season falls back to 0.
    assert_eq!(table.records()[0].season, 0);
}

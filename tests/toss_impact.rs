use std::path::PathBuf;

use wpl_stats::dataset::load_match_table;
use wpl_stats::toss_impact::{analyze_toss_decision, summarize_toss_by_team, summarize_toss_decisions};
use wpl_stats::{MatchTable, SeasonFilter, TossDecision};

fn sample_table() -> MatchTable {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("wpl_sample.csv");
    load_match_table(&path).expect("fixture should load").0
}

#[test]
fn one_record_per_match_in_scope() {
    let table = sample_table();
    let overall = analyze_toss_decision(&table, SeasonFilter::Overall);
    assert_eq!(overall.len(), 11);

    let first = &overall[0];
    assert_eq!(first.season, 2023);
    assert_eq!(first.match_number, 1);
    assert_eq!(first.fixture, "Gujarat Giants vs Mumbai Indians");
    assert_eq!(first.toss_winner, "Gujarat Giants");
    assert_eq!(first.toss_decision, TossDecision::Field);
    assert_eq!(first.winner.as_deref(), Some("Mumbai Indians"));
    assert!(!first.toss_success);

    let third = &overall[2];
    assert!(third.toss_success);

    let tie = &overall[7];
    assert_eq!(tie.winner.as_deref(), Some("Tie"));
    assert!(!tie.toss_success);
    assert_eq!(overall[8].winner, None);

    assert_eq!(analyze_toss_decision(&table, SeasonFilter::Season(2024)).len(), 6);
}

#[test]
fn team_summary_rates() {
    let table = sample_table();
    let records = analyze_toss_decision(&table, SeasonFilter::Overall);
    let summary = summarize_toss_by_team(&records);

    let teams: Vec<&str> = summary.iter().map(|s| s.team.as_str()).collect();
    assert_eq!(
        teams,
        vec![
            "Delhi Capitals",
            "Gujarat Giants",
            "Mumbai Indians",
            "Royal Challengers Bangalore"
        ]
    );
    let mi = &summary[2];
    assert_eq!((mi.tosses_won, mi.toss_and_match_won), (4, 2));
    assert_eq!(mi.success_rate_pct, 50.0);
    let dc = &summary[0];
    assert_eq!((dc.tosses_won, dc.toss_and_match_won), (4, 0));
    assert_eq!(dc.success_rate_pct, 0.0);

    let tosses: u32 = summary.iter().map(|s| s.tosses_won).sum();
    assert_eq!(tosses, 11);
}

#[test]
fn decision_summary_counts_choices() {
    let table = sample_table();
    let records = analyze_toss_decision(&table, SeasonFilter::Overall);
    let by_decision = summarize_toss_decisions(&records);
    assert_eq!(by_decision.len(), 2);

    let bat = &by_decision[0];
    assert_eq!(bat.decision, TossDecision::Bat);
    assert_eq!((bat.times_chosen, bat.toss_winner_won), (6, 0));

    let field = &by_decision[1];
    assert_eq!(field.decision, TossDecision::Field);
    assert_eq!((field.times_chosen, field.toss_winner_won), (5, 2));
    assert_eq!(field.win_rate_pct, 40.0);
}

#[test]
fn empty_scope_gives_empty_views() {
    let table = sample_table();
    let records = analyze_toss_decision(&table, SeasonFilter::Season(2030));
    assert!(records.is_empty());
    assert!(summarize_toss_by_team(&records).is_empty());
    assert!(summarize_toss_decisions(&records).is_empty());
}

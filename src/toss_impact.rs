use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::warn_empty_input;
use crate::match_record::{MatchTable, SeasonFilter, TossDecision};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TossDecisionRecord {
    #[serde(rename = "Season")]
    pub season: i32,
    #[serde(rename = "Match No")]
    pub match_number: u32,
    #[serde(rename = "Match")]
    pub fixture: String,
    #[serde(rename = "Toss Won By")]
    pub toss_winner: String,
    #[serde(rename = "Toss Decision")]
    pub toss_decision: TossDecision,
    #[serde(rename = "Match Won By")]
    pub winner: Option<String>,
    /// The toss winner also won the match.
    #[serde(rename = "Toss Decision Succeeded")]
    pub toss_success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamTossSummary {
    #[serde(rename = "Team")]
    pub team: String,
    #[serde(rename = "Tosses Won")]
    pub tosses_won: u32,
    #[serde(rename = "Toss Won & Match Won")]
    pub toss_and_match_won: u32,
    #[serde(rename = "Toss Success Rate (%)")]
    pub success_rate_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionSummary {
    #[serde(rename = "Toss Decision")]
    pub decision: TossDecision,
    #[serde(rename = "Times Chosen")]
    pub times_chosen: u32,
    #[serde(rename = "Toss Winner Won")]
    pub toss_winner_won: u32,
    #[serde(rename = "Win Rate (%)")]
    pub win_rate_pct: f64,
}

pub fn analyze_toss_decision(table: &MatchTable, season: SeasonFilter) -> Vec<TossDecisionRecord> {
    let out: Vec<TossDecisionRecord> = table
        .filtered(season)
        .map(|m| TossDecisionRecord {
            season: m.season,
            match_number: m.match_number,
            fixture: m.fixture_label(),
            toss_winner: m.toss_winner.clone(),
            toss_decision: m.toss_decision,
            winner: m.result.label(),
            toss_success: m.result.is_won_by(&m.toss_winner),
        })
        .collect();
    if out.is_empty() {
        warn_empty_input("toss_decision", season);
    }
    out
}

/// Toss success rate per team, grouped by toss winner, sorted by team name.
pub fn summarize_toss_by_team(records: &[TossDecisionRecord]) -> Vec<TeamTossSummary> {
    let mut by_team: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for r in records {
        let entry = by_team.entry(r.toss_winner.as_str()).or_default();
        entry.0 += 1;
        if r.toss_success {
            entry.1 += 1;
        }
    }
    by_team
        .into_iter()
        .map(|(team, (won, converted))| TeamTossSummary {
            team: team.to_string(),
            tosses_won: won,
            toss_and_match_won: converted,
            success_rate_pct: pct(converted, won),
        })
        .collect()
}

/// How often each toss choice was made and converted into a win.
pub fn summarize_toss_decisions(records: &[TossDecisionRecord]) -> Vec<DecisionSummary> {
    let mut by_decision: BTreeMap<TossDecision, (u32, u32)> = BTreeMap::new();
    for r in records {
        let entry = by_decision.entry(r.toss_decision).or_default();
        entry.0 += 1;
        if r.toss_success {
            entry.1 += 1;
        }
    }
    by_decision
        .into_iter()
        .map(|(decision, (chosen, won))| DecisionSummary {
            decision,
            times_chosen: chosen,
            toss_winner_won: won,
            win_rate_pct: pct(won, chosen),
        })
        .collect()
}

fn pct(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = part as f64 * 100.0 / whole as f64;
    (raw * 100.0).round() / 100.0
}

//! Ordered-pair head-to-head records.
//!
//! Every ordered pair of distinct teams gets one record reported from `team1`'s
//! side, so each fixture shows up twice with mirrored counts. This is the
//! densest derived table: it feeds the feature encoder and every head-to-head
//! view, and is meant to be built once per run and then only read.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::warn_empty_input;
use crate::head_to_head::pair_key;
use crate::match_record::{MatchRecord, MatchResult, MatchTable, SeasonFilter, TossDecision};

pub const RECENT_MATCHES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
    #[serde(rename = "NR")]
    NoResult,
}

impl FormResult {
    pub fn as_str(self) -> &'static str {
        match self {
            FormResult::Win => "W",
            FormResult::Loss => "L",
            FormResult::NoResult => "NR",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "W" => Some(FormResult::Win),
            "L" => Some(FormResult::Loss),
            "NR" => Some(FormResult::NoResult),
            _ => None,
        }
    }
}

impl fmt::Display for FormResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compact description of one past meeting, as stored in the last-5 column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub date: Option<NaiveDate>,
    pub team1: String,
    pub team2: String,
    pub winner: Option<String>,
    pub winner_runs: u32,
    pub winner_wickets: u32,
}

impl MatchSummary {
    fn from_record(m: &MatchRecord) -> Self {
        Self {
            date: m.date,
            team1: m.team1.clone(),
            team2: m.team2.clone(),
            winner: m.result.label(),
            winner_runs: m.winner_runs,
            winner_wickets: m.winner_wickets,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseStatsRecord {
    pub team1: String,
    pub team2: String,
    pub total_matches: u32,
    pub team1_wins: u32,
    pub team2_wins: u32,
    pub no_results: u32,
    pub ties: u32,
    pub toss_wins: u32,
    pub toss_won_match_won: u32,
    /// Won the toss but did not win the match (loss, tie or no result).
    pub toss_won_match_lost: u32,
    pub toss_lost_match_won: u32,
    pub toss_lost_match_lost: u32,
    pub chose_bat: u32,
    pub chose_bowl: u32,
    pub batting_first_wins: u32,
    pub batting_second_wins: u32,
    pub win_by_runs: u32,
    pub win_by_wickets: u32,
    /// Most recent first, at most [`RECENT_MATCHES`] long.
    pub last_5_matches: Vec<MatchSummary>,
    /// `team1`'s form over `last_5_matches`, position for position.
    pub recent_form: Vec<FormResult>,
    pub opponent_recent_form: Vec<FormResult>,
    pub match_years: Vec<i32>,
}

pub fn build_pairwise_stats(table: &MatchTable) -> Vec<PairwiseStatsRecord> {
    let teams: BTreeSet<&str> = table
        .records()
        .iter()
        .flat_map(|m| [m.team1.as_str(), m.team2.as_str()])
        .collect();

    let mut fixtures: HashMap<(&str, &str), Vec<&MatchRecord>> = HashMap::new();
    for m in table.records() {
        fixtures
            .entry(pair_key(&m.team1, &m.team2))
            .or_default()
            .push(m);
    }
    for history in fixtures.values_mut() {
        sort_most_recent_first(history);
    }

    let mut out = Vec::with_capacity(teams.len() * teams.len().saturating_sub(1));
    for a in &teams {
        for b in &teams {
            if a == b {
                continue;
            }
            let history = fixtures
                .get(&pair_key(a, b))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            out.push(pair_record(a, b, history));
        }
    }

    if out.is_empty() {
        warn_empty_input("pairwise_stats", SeasonFilter::Overall);
    }
    out
}

pub fn find_pair<'a>(
    records: &'a [PairwiseStatsRecord],
    team1: &str,
    team2: &str,
) -> Option<&'a PairwiseStatsRecord> {
    records
        .iter()
        .find(|r| r.team1 == team1 && r.team2 == team2)
}

/// Undated matches sort after dated ones; season and match number break ties.
fn sort_most_recent_first(history: &mut [&MatchRecord]) {
    history.sort_by(|x, y| recency_key(y).cmp(&recency_key(x)));
}

fn recency_key(m: &MatchRecord) -> (bool, Option<NaiveDate>, i32, u32) {
    (m.date.is_some(), m.date, m.season, m.match_number)
}

fn pair_record(a: &str, b: &str, history: &[&MatchRecord]) -> PairwiseStatsRecord {
    let mut rec = PairwiseStatsRecord {
        team1: a.to_string(),
        team2: b.to_string(),
        total_matches: 0,
        team1_wins: 0,
        team2_wins: 0,
        no_results: 0,
        ties: 0,
        toss_wins: 0,
        toss_won_match_won: 0,
        toss_won_match_lost: 0,
        toss_lost_match_won: 0,
        toss_lost_match_lost: 0,
        chose_bat: 0,
        chose_bowl: 0,
        batting_first_wins: 0,
        batting_second_wins: 0,
        win_by_runs: 0,
        win_by_wickets: 0,
        last_5_matches: Vec::new(),
        recent_form: Vec::new(),
        opponent_recent_form: Vec::new(),
        match_years: Vec::new(),
    };
    let mut years = BTreeSet::new();

    for m in history {
        rec.total_matches += 1;
        years.insert(m.year);

        match &m.result {
            MatchResult::Won(w) if w == a => {
                rec.team1_wins += 1;
                rec.win_by_runs = rec.win_by_runs.saturating_add(m.winner_runs);
                rec.win_by_wickets = rec.win_by_wickets.saturating_add(m.winner_wickets);
            }
            MatchResult::Won(w) if w == b => rec.team2_wins += 1,
            MatchResult::Won(_) => {}
            MatchResult::Tie => rec.ties += 1,
            MatchResult::NoResult => rec.no_results += 1,
        }

        let won_toss = m.toss_winner == a;
        let won_match = m.result.is_won_by(a);
        match (won_toss, won_match) {
            (true, true) => rec.toss_won_match_won += 1,
            (true, false) => rec.toss_won_match_lost += 1,
            (false, true) => rec.toss_lost_match_won += 1,
            (false, false) => rec.toss_lost_match_lost += 1,
        }

        if won_toss {
            rec.toss_wins += 1;
            match m.toss_decision {
                TossDecision::Bat => rec.chose_bat += 1,
                TossDecision::Field => rec.chose_bowl += 1,
            }
        }

        if won_match {
            if m.batted_first() == a {
                rec.batting_first_wins += 1;
            } else {
                rec.batting_second_wins += 1;
            }
        }
    }

    rec.last_5_matches = history
        .iter()
        .take(RECENT_MATCHES)
        .map(|m| MatchSummary::from_record(m))
        .collect();
    rec.recent_form = form_for(a, &rec.last_5_matches);
    rec.opponent_recent_form = form_for(b, &rec.last_5_matches);
    rec.match_years = years.into_iter().collect();
    rec
}

/// `NR` for no recorded winner, `W` when `team` won, `L` otherwise.
pub fn form_for(team: &str, matches: &[MatchSummary]) -> Vec<FormResult> {
    matches
        .iter()
        .map(|s| match s.winner.as_deref() {
            None => FormResult::NoResult,
            Some(w) if w == team => FormResult::Win,
            Some(_) => FormResult::Loss,
        })
        .collect()
}

pub fn render_form(form: &[FormResult]) -> String {
    form.iter().map(|f| f.as_str()).collect::<Vec<_>>().join(" ")
}

pub fn parse_form(raw: &str) -> Vec<FormResult> {
    raw.split_whitespace().filter_map(FormResult::parse).collect()
}

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::warn_empty_input;
use crate::match_record::{MatchTable, SeasonFilter};

/// Result tallies for one unordered fixture. `team_a` sorts before `team_b`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadToHeadRecord {
    #[serde(rename = "Season")]
    pub season: Option<i32>,
    #[serde(rename = "Team 1")]
    pub team_a: String,
    #[serde(rename = "Team 2")]
    pub team_b: String,
    #[serde(rename = "Matches Played")]
    pub matches: u32,
    #[serde(rename = "Team 1 Wins")]
    pub team_a_wins: u32,
    #[serde(rename = "Team 2 Wins")]
    pub team_b_wins: u32,
    #[serde(rename = "Draws")]
    pub draws: u32,
}

impl HeadToHeadRecord {
    pub fn wins_for(&self, team: &str) -> Option<u32> {
        if team == self.team_a {
            Some(self.team_a_wins)
        } else if team == self.team_b {
            Some(self.team_b_wins)
        } else {
            None
        }
    }
}

/// Lexicographic orientation for an unordered pair.
pub fn pair_key<'a>(x: &'a str, y: &'a str) -> (&'a str, &'a str) {
    if x <= y { (x, y) } else { (y, x) }
}

/// Tally every fixture in scope. Any result that is not a win for one of the
/// two sides (tie, no result, unexpected name) counts as a draw.
pub fn aggregate_head_to_head(table: &MatchTable, season: SeasonFilter) -> Vec<HeadToHeadRecord> {
    let mut by_pair: BTreeMap<(String, String), HeadToHeadRecord> = BTreeMap::new();

    for m in table.filtered(season) {
        let (a, b) = pair_key(&m.team1, &m.team2);
        let entry = by_pair
            .entry((a.to_string(), b.to_string()))
            .or_insert_with(|| HeadToHeadRecord {
                season: season.season(),
                team_a: a.to_string(),
                team_b: b.to_string(),
                matches: 0,
                team_a_wins: 0,
                team_b_wins: 0,
                draws: 0,
            });

        entry.matches += 1;
        match m.winner() {
            Some(w) if w == a => entry.team_a_wins += 1,
            Some(w) if w == b => entry.team_b_wins += 1,
            _ => entry.draws += 1,
        }
    }

    if by_pair.is_empty() {
        warn_empty_input("head_to_head", season);
    }
    by_pair.into_values().collect()
}

pub fn find_head_to_head<'a>(
    records: &'a [HeadToHeadRecord],
    x: &str,
    y: &str,
) -> Option<&'a HeadToHeadRecord> {
    let (a, b) = pair_key(x, y);
    records.iter().find(|r| r.team_a == a && r.team_b == b)
}

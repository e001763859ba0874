use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::warn_empty_input;
use crate::match_record::{MatchTable, SeasonFilter, WinType, classify_win_type};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueRecord {
    #[serde(rename = "Season")]
    pub season: Option<i32>,
    #[serde(rename = "venue")]
    pub venue: String,
    #[serde(rename = "Batting First Wins")]
    pub batting_first_wins: u32,
    #[serde(rename = "Batting Second Wins")]
    pub batting_second_wins: u32,
    /// Every match played there, decisive or not.
    #[serde(rename = "Total Matches")]
    pub total_matches: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWinTypeRecord {
    pub season: i32,
    #[serde(rename = "Batting First")]
    pub batting_first_wins: u32,
    #[serde(rename = "Chasing")]
    pub chasing_wins: u32,
}

pub fn aggregate_venue_performance(table: &MatchTable, season: SeasonFilter) -> Vec<VenueRecord> {
    let mut by_venue: BTreeMap<&str, VenueRecord> = BTreeMap::new();

    for m in table.filtered(season) {
        let entry = by_venue.entry(m.venue.as_str()).or_insert_with(|| VenueRecord {
            season: season.season(),
            venue: m.venue.clone(),
            batting_first_wins: 0,
            batting_second_wins: 0,
            total_matches: 0,
        });
        entry.total_matches += 1;
        match classify_win_type(m) {
            Some(WinType::BattingFirst) => entry.batting_first_wins += 1,
            Some(WinType::Chasing) => entry.batting_second_wins += 1,
            None => {}
        }
    }

    if by_venue.is_empty() {
        warn_empty_input("venue_stats", season);
    }
    by_venue.into_values().collect()
}

/// Batting-first versus chasing wins for each season, ascending by season.
pub fn summarize_win_types_by_season(table: &MatchTable) -> Vec<SeasonWinTypeRecord> {
    let mut by_season: BTreeMap<i32, SeasonWinTypeRecord> = BTreeMap::new();
    for m in table.records() {
        let Some(win_type) = classify_win_type(m) else {
            continue;
        };
        let entry = by_season.entry(m.season).or_insert(SeasonWinTypeRecord {
            season: m.season,
            batting_first_wins: 0,
            chasing_wins: 0,
        });
        match win_type {
            WinType::BattingFirst => entry.batting_first_wins += 1,
            WinType::Chasing => entry.chasing_wins += 1,
        }
    }
    by_season.into_values().collect()
}

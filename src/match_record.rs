use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const UNKNOWN_VENUE: &str = "Unknown Venue";
pub const TIE_LABEL: &str = "Tie";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TossDecision {
    Bat,
    Field,
}

impl TossDecision {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "bat" | "batting" => Some(TossDecision::Bat),
            "field" | "fielding" | "bowl" | "bowling" => Some(TossDecision::Field),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TossDecision::Bat => "bat",
            TossDecision::Field => "field",
        }
    }
}

impl fmt::Display for TossDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single match as recorded in the `winner` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Won(String),
    Tie,
    NoResult,
}

impl MatchResult {
    pub fn parse(raw: &str) -> Self {
        let s = raw.trim();
        match s.to_ascii_lowercase().as_str() {
            "" | "nan" | "na" | "n/a" | "null" | "none" | "no result" => MatchResult::NoResult,
            "tie" | "draw" | "tied" => MatchResult::Tie,
            _ => MatchResult::Won(s.to_string()),
        }
    }

    pub fn winner(&self) -> Option<&str> {
        match self {
            MatchResult::Won(team) => Some(team.as_str()),
            MatchResult::Tie | MatchResult::NoResult => None,
        }
    }

    pub fn is_won_by(&self, team: &str) -> bool {
        self.winner() == Some(team)
    }

    /// Label as written to flat files: the winner's name, `Tie`, or nothing.
    pub fn label(&self) -> Option<String> {
        match self {
            MatchResult::Won(team) => Some(team.clone()),
            MatchResult::Tie => Some(TIE_LABEL.to_string()),
            MatchResult::NoResult => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_number: u32,
    pub season: i32,
    pub date: Option<NaiveDate>,
    /// Year of `date` when it parsed, otherwise `season`.
    pub year: i32,
    pub team1: String,
    pub team2: String,
    pub toss_winner: String,
    pub toss_decision: TossDecision,
    pub result: MatchResult,
    pub winner_runs: u32,
    pub winner_wickets: u32,
    pub venue: String,
}

impl MatchRecord {
    pub fn involves(&self, team: &str) -> bool {
        self.team1 == team || self.team2 == team
    }

    /// True when the match is between `a` and `b` in either stored orientation.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.team1 == a && self.team2 == b) || (self.team1 == b && self.team2 == a)
    }

    pub fn opponent_of(&self, team: &str) -> Option<&str> {
        if self.team1 == team {
            Some(&self.team2)
        } else if self.team2 == team {
            Some(&self.team1)
        } else {
            None
        }
    }

    pub fn winner(&self) -> Option<&str> {
        self.result.winner()
    }

    /// The side that batted first, derived from the toss.
    pub fn batted_first(&self) -> &str {
        let toss_loser = if self.toss_winner == self.team1 {
            &self.team2
        } else {
            &self.team1
        };
        match self.toss_decision {
            TossDecision::Bat => &self.toss_winner,
            TossDecision::Field => toss_loser,
        }
    }

    pub fn fixture_label(&self) -> String {
        format!("{} vs {}", self.team1, self.team2)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinType {
    #[serde(rename = "Batting First")]
    BattingFirst,
    #[serde(rename = "Chasing")]
    Chasing,
}

impl fmt::Display for WinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WinType::BattingFirst => f.write_str("Batting First"),
            WinType::Chasing => f.write_str("Chasing"),
        }
    }
}

/// Classify a decisive result by whether the winner set or chased the target.
/// Ties, no-results and winners that are neither side are not classified.
// Ties and no-results are left out here, not counted as batting-first wins.
pub fn classify_win_type(m: &MatchRecord) -> Option<WinType> {
    let winner = m.winner()?;
    if !m.involves(winner) {
        return None;
    }
    if winner == m.batted_first() {
        Some(WinType::BattingFirst)
    } else {
        Some(WinType::Chasing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SeasonFilter {
    #[default]
    Overall,
    Season(i32),
}

impl SeasonFilter {
    pub fn matches(&self, m: &MatchRecord) -> bool {
        match self {
            SeasonFilter::Overall => true,
            SeasonFilter::Season(season) => m.season == *season,
        }
    }

    pub fn season(&self) -> Option<i32> {
        match self {
            SeasonFilter::Overall => None,
            SeasonFilter::Season(season) => Some(*season),
        }
    }
}

impl fmt::Display for SeasonFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeasonFilter::Overall => f.write_str("overall"),
            SeasonFilter::Season(season) => write!(f, "{season}"),
        }
    }
}

impl FromStr for SeasonFilter {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let s = raw.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("overall") || s.eq_ignore_ascii_case("all") {
            return Ok(SeasonFilter::Overall);
        }
        s.parse::<i32>()
            .map(SeasonFilter::Season)
            .map_err(|_| format!("invalid season filter {s:?}"))
    }
}

/// The canonical, normalized match table. Built once per run and shared by
/// reference with every aggregator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchTable {
    records: Vec<MatchRecord>,
}

impl MatchTable {
    pub fn new(records: Vec<MatchRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn filtered(&self, season: SeasonFilter) -> impl Iterator<Item = &MatchRecord> {
        self.records.iter().filter(move |m| season.matches(m))
    }

    pub fn seasons(&self) -> Vec<i32> {
        let set: BTreeSet<i32> = self.records.iter().map(|m| m.season).collect();
        set.into_iter().collect()
    }

    pub fn teams(&self) -> Vec<String> {
        let set: BTreeSet<&str> = self
            .records
            .iter()
            .flat_map(|m| [m.team1.as_str(), m.team2.as_str()])
            .collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// `overall` followed by every season present, ascending.
    pub fn scopes(&self) -> Vec<SeasonFilter> {
        let mut out = vec![SeasonFilter::Overall];
        out.extend(self.seasons().into_iter().map(SeasonFilter::Season));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(toss_winner: &str, decision: TossDecision, winner: &str) -> MatchRecord {
        MatchRecord {
            match_number: 1,
            season: 2023,
            date: None,
            year: 2023,
            team1: "A".to_string(),
            team2: "B".to_string(),
            toss_winner: toss_winner.to_string(),
            toss_decision: decision,
            result: MatchResult::parse(winner),
            winner_runs: 0,
            winner_wickets: 0,
            venue: UNKNOWN_VENUE.to_string(),
        }
    }

    #[test]
    fn batted_first_follows_toss() {
        assert_eq!(record("A", TossDecision::Bat, "A").batted_first(), "A");
        assert_eq!(record("A", TossDecision::Field, "A").batted_first(), "B");
        assert_eq!(record("B", TossDecision::Field, "A").batted_first(), "A");
    }

    #[test]
    fn win_type_classification() {
        let bat = record("A", TossDecision::Bat, "A");
        assert_eq!(classify_win_type(&bat), Some(WinType::BattingFirst));
        let field = record("A", TossDecision::Field, "A");
        assert_eq!(classify_win_type(&field), Some(WinType::Chasing));
        let other = record("B", TossDecision::Field, "A");
        assert_eq!(classify_win_type(&other), Some(WinType::BattingFirst));
        assert_eq!(classify_win_type(&record("A", TossDecision::Bat, "Tie")), None);
        assert_eq!(classify_win_type(&record("A", TossDecision::Bat, "")), None);
    }

    #[test]
    fn season_filter_parses_overall_sentinel() {
        assert_eq!("overall".parse::<SeasonFilter>(), Ok(SeasonFilter::Overall));
        assert_eq!("Overall".parse::<SeasonFilter>(), Ok(SeasonFilter::Overall));
        assert_eq!("2024".parse::<SeasonFilter>(), Ok(SeasonFilter::Season(2024)));
        assert!("twenty".parse::<SeasonFilter>().is_err());
    }

    #[test]
    fn result_parsing() {
        assert_eq!(MatchResult::parse(" nan "), MatchResult::NoResult);
        assert_eq!(MatchResult::parse("Draw"), MatchResult::Tie);
        assert_eq!(
            MatchResult::parse("Mumbai Indians"),
            MatchResult::Won("Mumbai Indians".to_string())
        );
    }
}

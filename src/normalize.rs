use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use tracing::{debug, warn};

use crate::error::{Result, StatsError};
use crate::match_record::{MatchRecord, MatchResult, MatchTable, TossDecision, UNKNOWN_VENUE};

pub const REQUIRED_COLUMNS: [&str; 5] = ["team1", "team2", "winner", "toss_winner", "toss_decision"];

static COLUMN_SYNONYMS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("team", "team1"),
        ("opponent", "team2"),
        ("match_no", "match_number"),
        ("match no", "match_number"),
        ("match_id", "match_number"),
    ])
});

// Day-first before month-first: the league publishes dd/mm dates.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d-%m-%Y",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

/// Untyped table as read from disk: header names plus string cells.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub rows_in: usize,
    pub rows_kept: usize,
    pub rows_skipped: usize,
    pub dates_unparsed: usize,
    pub venue_defaulted: bool,
}

pub fn canonical_column_name(raw: &str) -> String {
    let key = raw.trim().to_lowercase();
    match COLUMN_SYNONYMS.get(key.as_str()) {
        Some(canon) => (*canon).to_string(),
        None => key,
    }
}

/// What to do with a row that cannot describe a fixture (blank or identical
/// teams, a toss winner who is neither side, an unknown toss call).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowPolicy {
    /// Fail the whole run with [`StatsError::InvalidRow`].
    #[default]
    Reject,
    /// Drop the row, count it in [`NormalizeReport::rows_skipped`] and warn.
    Skip,
}

/// Turn a raw table into the canonical match table, rejecting invalid rows.
///
/// Missing margins default to 0, a missing venue to [`UNKNOWN_VENUE`] and bad
/// dates to `None`. Anything else wrong with a row fails the run.
pub fn normalize(raw: &RawTable) -> Result<(MatchTable, NormalizeReport)> {
    normalize_with(raw, RowPolicy::Reject)
}

pub fn normalize_with(raw: &RawTable, policy: RowPolicy) -> Result<(MatchTable, NormalizeReport)> {
    let mut columns: HashMap<String, usize> = HashMap::new();
    for (idx, header) in raw.headers.iter().enumerate() {
        columns.entry(canonical_column_name(header)).or_insert(idx);
    }

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !columns.contains_key(**name))
        .map(|name| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(StatsError::Schema { missing });
    }

    let mut report = NormalizeReport {
        rows_in: raw.rows.len(),
        venue_defaulted: !columns.contains_key("venue"),
        ..NormalizeReport::default()
    };

    let mut records = Vec::with_capacity(raw.rows.len());
    for (row_idx, row) in raw.rows.iter().enumerate() {
        let cell = |name: &str| cell_value(&columns, row, name);

        let team1 = cell("team1");
        let team2 = cell("team2");
        let toss_winner = cell("toss_winner");
        if let Some(reason) = fixture_problem(team1, team2, toss_winner) {
            reject_or_skip(policy, &mut report, row_idx + 1, reason)?;
            continue;
        }
        let Some(toss_decision) = TossDecision::parse(cell("toss_decision")) else {
            let reason = format!("unrecognised toss decision {:?}", cell("toss_decision"));
            reject_or_skip(policy, &mut report, row_idx + 1, reason)?;
            continue;
        };

        let raw_date = cell("date");
        let date = parse_date(raw_date);
        if date.is_none() && !raw_date.is_empty() {
            debug!(row = row_idx + 1, value = raw_date, "unparseable match date");
            report.dates_unparsed += 1;
        }

        let season = parse_int(cell("season"))
            .and_then(|v| i32::try_from(v).ok())
            .or_else(|| date.map(|d| d.year()))
            .unwrap_or(0);
        let match_number = parse_int(cell("match_number"))
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(row_idx as u32 + 1);
        let venue = match cell("venue") {
            "" => UNKNOWN_VENUE.to_string(),
            v => v.to_string(),
        };

        records.push(MatchRecord {
            match_number,
            season,
            date,
            year: date.map(|d| d.year()).unwrap_or(season),
            team1: team1.to_string(),
            team2: team2.to_string(),
            toss_winner: toss_winner.to_string(),
            toss_decision,
            result: MatchResult::parse(cell("winner")),
            winner_runs: parse_margin(cell("winner_runs")),
            winner_wickets: parse_margin(cell("winner_wickets")),
            venue,
        });
    }

    report.rows_kept = records.len();
    Ok((MatchTable::new(records), report))
}

fn cell_value<'a>(columns: &HashMap<String, usize>, row: &'a [String], name: &str) -> &'a str {
    columns
        .get(name)
        .and_then(|idx| row.get(*idx))
        .map(|s| s.trim())
        .unwrap_or("")
}

fn fixture_problem(team1: &str, team2: &str, toss_winner: &str) -> Option<String> {
    if team1.is_empty() || team2.is_empty() {
        return Some("blank team name".to_string());
    }
    if team1 == team2 {
        return Some(format!("{team1:?} plays itself"));
    }
    if toss_winner != team1 && toss_winner != team2 {
        return Some(format!("toss winner {toss_winner:?} is neither {team1:?} nor {team2:?}"));
    }
    None
}

fn reject_or_skip(
    policy: RowPolicy,
    report: &mut NormalizeReport,
    row: usize,
    reason: String,
) -> Result<()> {
    match policy {
        RowPolicy::Reject => Err(StatsError::InvalidRow { row, reason }),
        RowPolicy::Skip => {
            warn!(row, reason = %reason, "skipping match row");
            report.rows_skipped += 1;
            Ok(())
        }
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    for candidate in [s, s.split(['T', ' ']).next().unwrap_or(s)] {
        for fmt in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(candidate, fmt) {
                return Some(d);
            }
        }
    }
    None
}

// Spreadsheet exports often carry integers as "2023.0".
fn parse_int(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f = s.parse::<f64>().ok()?;
    (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
}

/// Missing or malformed margins mean "did not win this way": 0.
fn parse_margin(raw: &str) -> u32 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v.round() as u32,
        _ => 0,
    }
}

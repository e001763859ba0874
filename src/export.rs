use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Workbook, Worksheet};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::Result;
use crate::head_to_head::{HeadToHeadRecord, aggregate_head_to_head};
use crate::match_record::{MatchTable, SeasonFilter};
use crate::pairwise_stats::{
    MatchSummary, PairwiseStatsRecord, build_pairwise_stats, parse_form, render_form,
};
use crate::toss_impact::{
    DecisionSummary, TeamTossSummary, TossDecisionRecord, analyze_toss_decision,
    summarize_toss_by_team, summarize_toss_decisions,
};
use crate::venue_stats::{
    SeasonWinTypeRecord, VenueRecord, aggregate_venue_performance, summarize_win_types_by_season,
};

/// Every season-scoped view for one scope.
#[derive(Debug, Clone)]
pub struct ScopeViews {
    pub scope: SeasonFilter,
    pub head_to_head: Vec<HeadToHeadRecord>,
    pub toss_decisions: Vec<TossDecisionRecord>,
    pub toss_summary: Vec<TeamTossSummary>,
    pub decision_summary: Vec<DecisionSummary>,
    pub venues: Vec<VenueRecord>,
}

impl ScopeViews {
    pub fn compute(table: &MatchTable, scope: SeasonFilter) -> Self {
        let toss_decisions = analyze_toss_decision(table, scope);
        Self {
            scope,
            head_to_head: aggregate_head_to_head(table, scope),
            toss_summary: summarize_toss_by_team(&toss_decisions),
            decision_summary: summarize_toss_decisions(&toss_decisions),
            toss_decisions,
            venues: aggregate_venue_performance(table, scope),
        }
    }
}

/// All derived tables of one run.
#[derive(Debug, Clone)]
pub struct DerivedViews {
    pub scopes: Vec<ScopeViews>,
    pub pairwise: Vec<PairwiseStatsRecord>,
    pub win_types: Vec<SeasonWinTypeRecord>,
}

impl DerivedViews {
    /// `overall` plus every season present.
    pub fn compute(table: &MatchTable) -> Self {
        Self::for_scopes(table, &table.scopes())
    }

    pub fn for_scopes(table: &MatchTable, scopes: &[SeasonFilter]) -> Self {
        Self {
            scopes: scopes
                .iter()
                .map(|scope| ScopeViews::compute(table, *scope))
                .collect(),
            pairwise: build_pairwise_stats(table),
            win_types: summarize_win_types_by_season(table),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ExportReport {
    pub files: Vec<PathBuf>,
    pub rows: usize,
}

/// Flat form of [`PairwiseStatsRecord`]: the last-5 list and the match years
/// stay nested as JSON inside a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseCsvRow {
    pub team1: String,
    pub team2: String,
    pub total_matches: u32,
    pub team1_wins: u32,
    pub team2_wins: u32,
    pub no_results: u32,
    pub ties: u32,
    pub toss_wins: u32,
    pub toss_won_match_won: u32,
    pub toss_won_match_lost: u32,
    pub toss_lost_match_won: u32,
    pub toss_lost_match_lost: u32,
    pub chose_bat: u32,
    pub chose_bowl: u32,
    pub batting_first_wins: u32,
    pub batting_second_wins: u32,
    pub win_by_runs: u32,
    pub win_by_wickets: u32,
    pub last_5_matches: String,
    pub recent_form: String,
    pub opponent_recent_form: String,
    pub match_years: String,
}

impl PairwiseCsvRow {
    pub fn from_record(r: &PairwiseStatsRecord) -> Result<Self> {
        Ok(Self {
            team1: r.team1.clone(),
            team2: r.team2.clone(),
            total_matches: r.total_matches,
            team1_wins: r.team1_wins,
            team2_wins: r.team2_wins,
            no_results: r.no_results,
            ties: r.ties,
            toss_wins: r.toss_wins,
            toss_won_match_won: r.toss_won_match_won,
            toss_won_match_lost: r.toss_won_match_lost,
            toss_lost_match_won: r.toss_lost_match_won,
            toss_lost_match_lost: r.toss_lost_match_lost,
            chose_bat: r.chose_bat,
            chose_bowl: r.chose_bowl,
            batting_first_wins: r.batting_first_wins,
            batting_second_wins: r.batting_second_wins,
            win_by_runs: r.win_by_runs,
            win_by_wickets: r.win_by_wickets,
            last_5_matches: serde_json::to_string(&r.last_5_matches)?,
            recent_form: render_form(&r.recent_form),
            opponent_recent_form: render_form(&r.opponent_recent_form),
            match_years: serde_json::to_string(&r.match_years)?,
        })
    }

    pub fn into_record(self) -> Result<PairwiseStatsRecord> {
        let last_5_matches: Vec<MatchSummary> = parse_json_column(&self.last_5_matches)?;
        let match_years: Vec<i32> = parse_json_column(&self.match_years)?;
        Ok(PairwiseStatsRecord {
            recent_form: parse_form(&self.recent_form),
            opponent_recent_form: parse_form(&self.opponent_recent_form),
            team1: self.team1,
            team2: self.team2,
            total_matches: self.total_matches,
            team1_wins: self.team1_wins,
            team2_wins: self.team2_wins,
            no_results: self.no_results,
            ties: self.ties,
            toss_wins: self.toss_wins,
            toss_won_match_won: self.toss_won_match_won,
            toss_won_match_lost: self.toss_won_match_lost,
            toss_lost_match_won: self.toss_lost_match_won,
            toss_lost_match_lost: self.toss_lost_match_lost,
            chose_bat: self.chose_bat,
            chose_bowl: self.chose_bowl,
            batting_first_wins: self.batting_first_wins,
            batting_second_wins: self.batting_second_wins,
            win_by_runs: self.win_by_runs,
            win_by_wickets: self.win_by_wickets,
            last_5_matches,
            match_years,
        })
    }
}

fn parse_json_column<T: DeserializeOwned + Default>(raw: &str) -> Result<T> {
    let s = raw.trim();
    if s.is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_str(s)?)
}

pub fn view_file_name(view: &str, scope: SeasonFilter) -> String {
    format!("{view}_{scope}.csv")
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut rdr = csv::Reader::from_path(path)?;
    let mut out = Vec::new();
    for row in rdr.deserialize() {
        out.push(row?);
    }
    Ok(out)
}

pub fn write_pairwise_table(path: &Path, records: &[PairwiseStatsRecord]) -> Result<()> {
    let rows = records
        .iter()
        .map(PairwiseCsvRow::from_record)
        .collect::<Result<Vec<_>>>()?;
    write_csv(path, &rows)
}

/// Load a persisted pairwise table, parsing the nested columns back.
pub fn read_pairwise_table(path: &Path) -> Result<Vec<PairwiseStatsRecord>> {
    read_csv::<PairwiseCsvRow>(path)?
        .into_iter()
        .map(PairwiseCsvRow::into_record)
        .collect()
}

/// Write one CSV per view and scope into `out_dir`.
pub fn write_views(out_dir: &Path, views: &DerivedViews) -> Result<ExportReport> {
    fs::create_dir_all(out_dir)?;
    let mut report = ExportReport::default();

    for sv in &views.scopes {
        let scope = sv.scope;
        write_view(out_dir, &mut report, &view_file_name("head_to_head", scope), &sv.head_to_head)?;
        write_view(out_dir, &mut report, &view_file_name("toss_decision", scope), &sv.toss_decisions)?;
        write_view(out_dir, &mut report, &view_file_name("toss_summary", scope), &sv.toss_summary)?;
        write_view(out_dir, &mut report, &view_file_name("toss_choice", scope), &sv.decision_summary)?;
        write_view(out_dir, &mut report, &view_file_name("venue_stats", scope), &sv.venues)?;
    }

    let pairwise_path = out_dir.join(view_file_name("pairwise_stats", SeasonFilter::Overall));
    write_pairwise_table(&pairwise_path, &views.pairwise)?;
    report.rows += views.pairwise.len();
    report.files.push(pairwise_path);

    write_view(out_dir, &mut report, "win_type_by_season.csv", &views.win_types)?;

    info!(
        dir = %out_dir.display(),
        files = report.files.len(),
        rows = report.rows,
        "wrote derived views"
    );
    Ok(report)
}

fn write_view<T: Serialize>(
    out_dir: &Path,
    report: &mut ExportReport,
    file_name: &str,
    rows: &[T],
) -> Result<()> {
    let path = out_dir.join(file_name);
    write_csv(&path, rows)?;
    report.rows += rows.len();
    report.files.push(path);
    Ok(())
}

/// Same views as [`write_views`], one worksheet each, in a single workbook.
/// Pairwise rows keep only the latest form string, not the nested columns.
pub fn write_workbook(path: &Path, views: &DerivedViews) -> Result<()> {
    let mut workbook = Workbook::new();
    for (name, rows) in workbook_sheets(views) {
        let sheet = workbook.add_worksheet();
        sheet.set_name(&name)?;
        write_rows(sheet, &rows)?;
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    workbook.save(path)?;
    info!(path = %path.display(), "wrote workbook");
    Ok(())
}

/// Worksheet names and cell rows, header first, in workbook order.
pub fn workbook_sheets(views: &DerivedViews) -> Vec<(String, Vec<Vec<String>>)> {
    let mut sheets = Vec::new();
    for sv in &views.scopes {
        let scope = sv.scope;
        sheets.push((format!("H2H {scope}"), head_to_head_rows(&sv.head_to_head)));
        sheets.push((format!("Tosses {scope}"), toss_decision_rows(&sv.toss_decisions)));
        sheets.push((format!("Toss {scope}"), toss_summary_rows(&sv.toss_summary)));
        sheets.push((format!("Choice {scope}"), decision_rows(&sv.decision_summary)));
        sheets.push((format!("Venues {scope}"), venue_rows(&sv.venues)));
    }
    sheets.push(("Pairwise".to_string(), pairwise_rows(&views.pairwise)));
    sheets.push(("WinTypes".to_string(), win_type_rows(&views.win_types)));
    sheets
}

fn head_to_head_rows(records: &[HeadToHeadRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Team 1", "Team 2", "Matches Played", "Team 1 Wins", "Team 2 Wins", "Draws"])];
    rows.extend(records.iter().map(|r| {
        vec![
            r.team_a.clone(),
            r.team_b.clone(),
            r.matches.to_string(),
            r.team_a_wins.to_string(),
            r.team_b_wins.to_string(),
            r.draws.to_string(),
        ]
    }));
    rows
}

fn toss_decision_rows(records: &[TossDecisionRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&[
        "Season",
        "Match No",
        "Match",
        "Toss Won By",
        "Toss Decision",
        "Match Won By",
        "Toss Decision Succeeded",
    ])];
    rows.extend(records.iter().map(|r| {
        vec![
            r.season.to_string(),
            r.match_number.to_string(),
            r.fixture.clone(),
            r.toss_winner.clone(),
            r.toss_decision.to_string(),
            r.winner.clone().unwrap_or_default(),
            r.toss_success.to_string(),
        ]
    }));
    rows
}

fn toss_summary_rows(records: &[TeamTossSummary]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Team", "Tosses Won", "Toss Won & Match Won", "Toss Success Rate (%)"])];
    rows.extend(records.iter().map(|r| {
        vec![
            r.team.clone(),
            r.tosses_won.to_string(),
            r.toss_and_match_won.to_string(),
            format!("{:.2}", r.success_rate_pct),
        ]
    }));
    rows
}

fn decision_rows(records: &[DecisionSummary]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Toss Decision", "Times Chosen", "Toss Winner Won", "Win Rate (%)"])];
    rows.extend(records.iter().map(|r| {
        vec![
            r.decision.to_string(),
            r.times_chosen.to_string(),
            r.toss_winner_won.to_string(),
            format!("{:.2}", r.win_rate_pct),
        ]
    }));
    rows
}

fn venue_rows(records: &[VenueRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Venue", "Batting First Wins", "Batting Second Wins", "Total Matches"])];
    rows.extend(records.iter().map(|r| {
        vec![
            r.venue.clone(),
            r.batting_first_wins.to_string(),
            r.batting_second_wins.to_string(),
            r.total_matches.to_string(),
        ]
    }));
    rows
}

fn pairwise_rows(records: &[PairwiseStatsRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&[
        "Team",
        "Opponent",
        "Matches",
        "Wins",
        "Losses",
        "No Result",
        "Ties",
        "Toss Wins",
        "Toss Won & Match Won",
        "Toss Won & Match Lost",
        "Toss Lost & Match Won",
        "Toss Lost & Match Lost",
        "Chose Bat",
        "Chose Bowl",
        "Batting First Wins",
        "Batting Second Wins",
        "Win By Runs",
        "Win By Wickets",
        "Recent Form",
    ])];
    rows.extend(records.iter().map(|r| {
        vec![
            r.team1.clone(),
            r.team2.clone(),
            r.total_matches.to_string(),
            r.team1_wins.to_string(),
            r.team2_wins.to_string(),
            r.no_results.to_string(),
            r.ties.to_string(),
            r.toss_wins.to_string(),
            r.toss_won_match_won.to_string(),
            r.toss_won_match_lost.to_string(),
            r.toss_lost_match_won.to_string(),
            r.toss_lost_match_lost.to_string(),
            r.chose_bat.to_string(),
            r.chose_bowl.to_string(),
            r.batting_first_wins.to_string(),
            r.batting_second_wins.to_string(),
            r.win_by_runs.to_string(),
            r.win_by_wickets.to_string(),
            render_form(&r.recent_form),
        ]
    }));
    rows
}

fn win_type_rows(records: &[SeasonWinTypeRecord]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Season", "Batting First", "Chasing"])];
    rows.extend(records.iter().map(|r| {
        vec![
            r.season.to_string(),
            r.batting_first_wins.to_string(),
            r.chasing_wins.to_string(),
        ]
    }));
    rows
}

fn header(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet.write_string(row_idx as u32, col_idx as u16, value)?;
        }
    }
    Ok(())
}

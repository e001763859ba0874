//! Integer coding of categorical match features for the winner model.
//!
//! An encoder is fitted once on the training corpus and then travels with the
//! trained model. Codes follow the sorted order of the values seen while
//! fitting, so two encoders fitted on different data disagree; never refit at
//! inference time.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};
use crate::match_record::{MatchTable, TossDecision};
use crate::pairwise_stats::PairwiseStatsRecord;

pub const FEATURE_NAMES: [&str; 6] = [
    "team1",
    "team2",
    "toss_winner",
    "toss_decision",
    "matches",
    "toss_wins",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut classes: Vec<String> = values.into_iter().map(|v| v.as_ref().to_string()).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn code(&self, value: &str) -> Option<u32> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
            .map(|idx| idx as u32)
    }

    pub fn value(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.code(value).is_some()
    }
}

/// One training (or inference) example before encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub team1: String,
    pub team2: String,
    pub toss_winner: String,
    pub toss_decision: TossDecision,
    pub matches: u32,
    pub toss_wins: u32,
    pub winner: Option<String>,
}

impl FeatureRow {
    /// Inference row for an upcoming fixture, using the pair's history counts.
    pub fn for_fixture(
        pair: &PairwiseStatsRecord,
        toss_winner: &str,
        toss_decision: TossDecision,
    ) -> Self {
        Self {
            team1: pair.team1.clone(),
            team2: pair.team2.clone(),
            toss_winner: toss_winner.to_string(),
            toss_decision,
            matches: pair.total_matches,
            toss_wins: pair.toss_wins,
            winner: None,
        }
    }
}

/// Join every decisive match with the pairwise record of its stored
/// orientation. Ties and no-results carry no label and are left out.
pub fn build_feature_rows(table: &MatchTable, pairwise: &[PairwiseStatsRecord]) -> Vec<FeatureRow> {
    let by_pair: HashMap<(&str, &str), &PairwiseStatsRecord> = pairwise
        .iter()
        .map(|p| ((p.team1.as_str(), p.team2.as_str()), p))
        .collect();

    table
        .records()
        .iter()
        .filter_map(|m| {
            let winner = m.winner().filter(|w| m.involves(w))?;
            let pair = by_pair.get(&(m.team1.as_str(), m.team2.as_str()))?;
            Some(FeatureRow {
                team1: m.team1.clone(),
                team2: m.team2.clone(),
                toss_winner: m.toss_winner.clone(),
                toss_decision: m.toss_decision,
                matches: pair.total_matches,
                toss_wins: pair.toss_wins,
                winner: Some(winner.to_string()),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedFeatureVector {
    pub team1: u32,
    pub team2: u32,
    pub toss_winner: u32,
    pub toss_decision: u32,
    pub matches: u32,
    pub toss_wins: u32,
}

impl EncodedFeatureVector {
    /// Values in [`FEATURE_NAMES`] order.
    pub fn to_array(&self) -> [u32; 6] {
        [
            self.team1,
            self.team2,
            self.toss_winner,
            self.toss_decision,
            self.matches,
            self.toss_wins,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureEncoder {
    pub team1: LabelEncoder,
    pub team2: LabelEncoder,
    pub toss_winner: LabelEncoder,
    pub toss_decision: LabelEncoder,
    pub winner: LabelEncoder,
}

pub fn fit_feature_encoder(rows: &[FeatureRow]) -> FeatureEncoder {
    FeatureEncoder {
        team1: LabelEncoder::fit(rows.iter().map(|r| r.team1.as_str())),
        team2: LabelEncoder::fit(rows.iter().map(|r| r.team2.as_str())),
        toss_winner: LabelEncoder::fit(rows.iter().map(|r| r.toss_winner.as_str())),
        toss_decision: LabelEncoder::fit(rows.iter().map(|r| r.toss_decision.as_str())),
        winner: LabelEncoder::fit(rows.iter().filter_map(|r| r.winner.as_deref())),
    }
}

pub fn encode(encoder: &FeatureEncoder, row: &FeatureRow) -> Result<EncodedFeatureVector> {
    encoder.encode(row)
}

impl FeatureEncoder {
    pub fn encode(&self, row: &FeatureRow) -> Result<EncodedFeatureVector> {
        Ok(EncodedFeatureVector {
            team1: lookup(&self.team1, "team1", &row.team1)?,
            team2: lookup(&self.team2, "team2", &row.team2)?,
            toss_winner: lookup(&self.toss_winner, "toss_winner", &row.toss_winner)?,
            toss_decision: lookup(
                &self.toss_decision,
                "toss_decision",
                row.toss_decision.as_str(),
            )?,
            matches: row.matches,
            toss_wins: row.toss_wins,
        })
    }

    pub fn encode_label(&self, winner: &str) -> Result<u32> {
        lookup(&self.winner, "winner", winner)
    }

    pub fn decode_label(&self, code: u32) -> Option<&str> {
        self.winner.value(code)
    }
}

fn lookup(encoder: &LabelEncoder, field: &'static str, value: &str) -> Result<u32> {
    encoder.code(value).ok_or_else(|| StatsError::UnknownCategory {
        field,
        value: value.to_string(),
    })
}

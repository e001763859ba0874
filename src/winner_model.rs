use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StatsError};
use crate::feature_encoder::{EncodedFeatureVector, FeatureEncoder, FeatureRow};
use crate::match_record::TossDecision;
use crate::pairwise_stats::{PairwiseStatsRecord, find_pair};

pub const MODEL_VERSION: u32 = 1;
pub const DEFAULT_SPLIT_SEED: u64 = 42;
pub const DEFAULT_TEST_FRACTION: f64 = 0.2;

type LabelCounts = BTreeMap<u32, u32>;

/// Majority-vote lookup with back-off: the exact categorical key first, then
/// the team pairing, then the overall label distribution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerClassifier {
    exact: BTreeMap<String, LabelCounts>,
    pairing: BTreeMap<String, LabelCounts>,
    prior: LabelCounts,
}

impl WinnerClassifier {
    pub fn fit(features: &[EncodedFeatureVector], labels: &[u32]) -> Self {
        let mut model = Self::default();
        for (x, y) in features.iter().zip(labels) {
            *model.exact.entry(exact_key(x)).or_default().entry(*y).or_default() += 1;
            *model.pairing.entry(pairing_key(x)).or_default().entry(*y).or_default() += 1;
            *model.prior.entry(*y).or_default() += 1;
        }
        model
    }

    pub fn predict(&self, x: &EncodedFeatureVector) -> Option<u32> {
        self.exact
            .get(&exact_key(x))
            .and_then(majority)
            .or_else(|| self.pairing.get(&pairing_key(x)).and_then(majority))
            .or_else(|| majority(&self.prior))
    }

    pub fn is_trained(&self) -> bool {
        !self.prior.is_empty()
    }
}

fn exact_key(x: &EncodedFeatureVector) -> String {
    format!("{}:{}:{}:{}", x.team1, x.team2, x.toss_winner, x.toss_decision)
}

fn pairing_key(x: &EncodedFeatureVector) -> String {
    format!("{}:{}", x.team1, x.team2)
}

/// Most frequent label; equal counts go to the smaller code.
fn majority(counts: &LabelCounts) -> Option<u32> {
    counts
        .iter()
        .max_by(|(la, ca), (lb, cb)| ca.cmp(cb).then(lb.cmp(la)))
        .map(|(label, _)| *label)
}

pub fn accuracy(model: &WinnerClassifier, features: &[EncodedFeatureVector], labels: &[u32]) -> f64 {
    if features.is_empty() {
        return 0.0;
    }
    let correct = features
        .iter()
        .zip(labels)
        .filter(|(x, y)| model.predict(x) == Some(**y))
        .count();
    correct as f64 / features.len() as f64
}

/// Shuffle `0..n` with a seeded RNG and cut off the test share.
/// Returns `(train, test)` index lists.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut idx: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    idx.shuffle(&mut rng);
    let fraction = test_fraction.clamp(0.0, 1.0);
    let n_test = ((n as f64) * fraction).ceil() as usize;
    let n_test = n_test.min(n.saturating_sub(1));
    let test = idx.split_off(n - n_test);
    (idx, test)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: u32,
    pub generated_at: String,
    #[serde(default)]
    pub dataset_digest: Option<String>,
    pub train_samples: usize,
    pub test_samples: usize,
    pub test_accuracy: f64,
    pub encoder: FeatureEncoder,
    pub classifier: WinnerClassifier,
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub rows: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub test_accuracy: f64,
}

/// Encode the rows with a fitted encoder, split, fit, and score.
pub fn train_winner_model(
    encoder: FeatureEncoder,
    rows: &[FeatureRow],
    test_fraction: f64,
    seed: u64,
    dataset_digest: Option<String>,
) -> Result<(ModelArtifact, TrainingReport)> {
    let mut features = Vec::with_capacity(rows.len());
    let mut labels = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(winner) = row.winner.as_deref() else {
            continue;
        };
        features.push(encoder.encode(row)?);
        labels.push(encoder.encode_label(winner)?);
    }

    let (train_idx, test_idx) = train_test_split(features.len(), test_fraction, seed);
    let pick = |idx: &[usize]| -> (Vec<EncodedFeatureVector>, Vec<u32>) {
        idx.iter().map(|i| (features[*i], labels[*i])).unzip()
    };
    let (train_x, train_y) = pick(&train_idx);
    let (test_x, test_y) = pick(&test_idx);

    let classifier = WinnerClassifier::fit(&train_x, &train_y);
    let test_accuracy = accuracy(&classifier, &test_x, &test_y);

    let report = TrainingReport {
        rows: features.len(),
        train_samples: train_x.len(),
        test_samples: test_x.len(),
        test_accuracy,
    };
    let artifact = ModelArtifact {
        version: MODEL_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        dataset_digest,
        train_samples: report.train_samples,
        test_samples: report.test_samples,
        test_accuracy,
        encoder,
        classifier,
    };
    Ok((artifact, report))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub winner: String,
    pub features: EncodedFeatureVector,
}

/// Predict the winner of an upcoming fixture. Any value outside the fitted
/// encoder's domain for its column fails with [`StatsError::UnknownCategory`].
/// A pair without a pairwise record has no shared history: zero counts.
pub fn predict_fixture(
    artifact: &ModelArtifact,
    pairwise: &[PairwiseStatsRecord],
    team1: &str,
    team2: &str,
    toss_winner: &str,
    toss_decision: TossDecision,
) -> Result<Prediction> {
    let row = match find_pair(pairwise, team1, team2) {
        Some(pair) => FeatureRow::for_fixture(pair, toss_winner, toss_decision),
        None => FeatureRow {
            team1: team1.to_string(),
            team2: team2.to_string(),
            toss_winner: toss_winner.to_string(),
            toss_decision,
            matches: 0,
            toss_wins: 0,
            winner: None,
        },
    };
    let features = artifact.encoder.encode(&row)?;
    let winner = artifact
        .classifier
        .predict(&features)
        .and_then(|code| artifact.encoder.decode_label(code))
        .ok_or_else(|| StatsError::UnknownCategory {
            field: "winner",
            value: format!("{team1} vs {team2}"),
        })?
        .to_string();
    Ok(Prediction { winner, features })
}

pub fn save_artifact(path: &Path, artifact: &ModelArtifact) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(artifact)?;
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

pub fn load_artifact(path: &Path) -> Result<ModelArtifact> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

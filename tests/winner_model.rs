use std::path::PathBuf;

use wpl_stats::dataset::{dataset_digest, load_match_table};
use wpl_stats::feature_encoder::{FeatureRow, build_feature_rows, fit_feature_encoder};
use wpl_stats::pairwise_stats::{PairwiseStatsRecord, build_pairwise_stats};
use wpl_stats::winner_model::{
    DEFAULT_SPLIT_SEED, MODEL_VERSION, ModelArtifact, load_artifact, predict_fixture,
    save_artifact, train_winner_model,
};
use wpl_stats::{StatsError, TossDecision};

fn training_inputs() -> (Vec<PairwiseStatsRecord>, Vec<FeatureRow>) {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("wpl_sample.csv");
    let (table, _) = load_match_table(&path).expect("fixture should load");
    let pairwise = build_pairwise_stats(&table);
    let rows = build_feature_rows(&table, &pairwise);
    (pairwise, rows)
}

fn trained(test_fraction: f64) -> (Vec<PairwiseStatsRecord>, ModelArtifact) {
    let (pairwise, rows) = training_inputs();
    let encoder = fit_feature_encoder(&rows);
    let (artifact, _) =
        train_winner_model(encoder, &rows, test_fraction, DEFAULT_SPLIT_SEED, None).unwrap();
    (pairwise, artifact)
}

#[test]
fn training_reports_split_sizes() {
    let (_, rows) = training_inputs();
    let encoder = fit_feature_encoder(&rows);
    let digest = Some(dataset_digest(b"sample"));
    let (artifact, report) =
        train_winner_model(encoder, &rows, 0.2, DEFAULT_SPLIT_SEED, digest.clone()).unwrap();

    assert_eq!(report.rows, 9);
    assert_eq!(report.test_samples, 2);
    assert_eq!(report.train_samples, 7);
    assert!((0.0..=1.0).contains(&report.test_accuracy));
    assert_eq!(artifact.version, MODEL_VERSION);
    assert_eq!(artifact.dataset_digest, digest);
    assert!(artifact.classifier.is_trained());
}

#[test]
fn training_is_deterministic_for_a_seed() {
    let (_, rows) = training_inputs();
    let encoder = fit_feature_encoder(&rows);
    let (a, _) = train_winner_model(encoder.clone(), &rows, 0.3, 11, None).unwrap();
    let (b, _) = train_winner_model(encoder, &rows, 0.3, 11, None).unwrap();
    assert_eq!(a.classifier, b.classifier);
    assert_eq!(a.test_accuracy, b.test_accuracy);
}

#[test]
fn predicts_the_head_to_head_favourite() {
    let (pairwise, artifact) = trained(0.2);
    let prediction = predict_fixture(
        &artifact,
        &pairwise,
        "Delhi Capitals",
        "Mumbai Indians",
        "Delhi Capitals",
        TossDecision::Bat,
    )
    .unwrap();
    assert_eq!(prediction.winner, "Mumbai Indians");
    assert_eq!(prediction.features.matches, 4);
}

#[test]
fn unknown_team_is_reported_not_panicked() {
    let (pairwise, artifact) = trained(0.0);
    let err = predict_fixture(
        &artifact,
        &pairwise,
        "UP Warriorz",
        "Mumbai Indians",
        "UP Warriorz",
        TossDecision::Field,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        StatsError::UnknownCategory { field: "team1", ref value } if value == "UP Warriorz"
    ));
}

#[test]
fn predicts_when_each_column_saw_its_value() {
    let (pairwise, artifact) = trained(0.0);
    // Gujarat Giants only ever appears as team1 in decisive matches.
    let prediction = predict_fixture(
        &artifact,
        &pairwise,
        "Gujarat Giants",
        "Mumbai Indians",
        "Gujarat Giants",
        TossDecision::Field,
    )
    .unwrap();
    assert_eq!(prediction.winner, "Mumbai Indians");
    assert_eq!(prediction.features.matches, 2);

    let err = predict_fixture(
        &artifact,
        &pairwise,
        "Mumbai Indians",
        "Gujarat Giants",
        "Mumbai Indians",
        TossDecision::Field,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        StatsError::UnknownCategory { field: "team2", ref value } if value == "Gujarat Giants"
    ));
}

#[test]
fn artifact_survives_disk_round_trip() {
    let (pairwise, artifact) = trained(0.0);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("models").join("winner.json");
    save_artifact(&path, &artifact).unwrap();
    assert!(!path.with_extension("json.tmp").exists());

    let loaded = load_artifact(&path).unwrap();
    assert_eq!(loaded.encoder, artifact.encoder);
    assert_eq!(loaded.classifier, artifact.classifier);
    assert_eq!(loaded.train_samples, 9);
    assert_eq!(loaded.test_samples, 0);

    let a = predict_fixture(
        &artifact,
        &pairwise,
        "Mumbai Indians",
        "Delhi Capitals",
        "Mumbai Indians",
        TossDecision::Bat,
    )
    .unwrap();
    let b = predict_fixture(
        &loaded,
        &pairwise,
        "Mumbai Indians",
        "Delhi Capitals",
        "Mumbai Indians",
        TossDecision::Bat,
    )
    .unwrap();
    assert_eq!(a, b);
    assert_eq!(a.winner, "Delhi Capitals");
}

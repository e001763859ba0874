use anyhow::{Context, Result, anyhow};
use tracing::info;

use wpl_stats::config::{AppConfig, arg_value, init_tracing};
use wpl_stats::dataset::{file_digest, load_match_table_with};
use wpl_stats::feature_encoder::{build_feature_rows, fit_feature_encoder};
use wpl_stats::pairwise_stats::build_pairwise_stats;
use wpl_stats::winner_model::{
    DEFAULT_SPLIT_SEED, DEFAULT_TEST_FRACTION, save_artifact, train_winner_model,
};

fn main() -> Result<()> {
    init_tracing();
    let cfg = AppConfig::from_env_and_args().context("invalid configuration")?;
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let seed = parse_or(&args, "--seed", DEFAULT_SPLIT_SEED)?;
    let test_fraction = parse_or(&args, "--test-fraction", DEFAULT_TEST_FRACTION)?;

    let (table, _) = load_match_table_with(&cfg.data_path, cfg.row_policy)
        .with_context(|| format!("failed to load {}", cfg.data_path.display()))?;
    let digest = file_digest(&cfg.data_path).ok();

    let pairwise = build_pairwise_stats(&table);
    let rows = build_feature_rows(&table, &pairwise);
    if rows.is_empty() {
        return Err(anyhow!("no decisive matches to train on"));
    }
    let encoder = fit_feature_encoder(&rows);
    info!(
        rows = rows.len(),
        teams = encoder.team1.len(),
        "fitted feature encoder"
    );

    let (artifact, report) = train_winner_model(encoder, &rows, test_fraction, seed, digest)
        .context("training failed")?;
    save_artifact(&cfg.model_path, &artifact)
        .with_context(|| format!("failed to save model to {}", cfg.model_path.display()))?;

    println!("Winner model trained");
    println!("Rows: {}", report.rows);
    println!(
        "Split: {} train / {} test (seed {seed})",
        report.train_samples, report.test_samples
    );
    println!("Test accuracy: {:.3}", report.test_accuracy);
    println!("Model: {}", cfg.model_path.display());
    Ok(())
}

fn parse_or<T: std::str::FromStr>(args: &[String], name: &str, default: T) -> Result<T> {
    match arg_value(args, name) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow!("invalid {name} value {raw:?}")),
        None => Ok(default),
    }
}

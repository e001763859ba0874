use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use wpl_stats::config::{AppConfig, arg_value, init_tracing};
use wpl_stats::dataset::{file_digest, load_match_table_with};
use wpl_stats::export::{read_pairwise_table, view_file_name};
use wpl_stats::pairwise_stats::{PairwiseStatsRecord, build_pairwise_stats};
use wpl_stats::winner_model::{load_artifact, predict_fixture};
use wpl_stats::{SeasonFilter, StatsError, TossDecision};

fn main() -> Result<()> {
    init_tracing();
    let cfg = AppConfig::from_env_and_args().context("invalid configuration")?;
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let team1 = required_arg(&args, "--team1")?;
    let team2 = required_arg(&args, "--team2")?;
    let toss_winner = required_arg(&args, "--toss-winner")?;
    let raw_decision = required_arg(&args, "--toss-decision")?;
    let toss_decision = TossDecision::parse(&raw_decision)
        .ok_or_else(|| anyhow!("toss decision must be bat or field, got {raw_decision:?}"))?;
    if toss_winner != team1 && toss_winner != team2 {
        return Err(anyhow!("toss winner must be {team1} or {team2}"));
    }

    let artifact = load_artifact(&cfg.model_path)
        .with_context(|| format!("failed to load model {}", cfg.model_path.display()))?;
    if let (Some(trained_on), Ok(current)) = (&artifact.dataset_digest, file_digest(&cfg.data_path))
        && *trained_on != current
    {
        warn!(
            data = %cfg.data_path.display(),
            "match data differs from the dataset the model was trained on"
        );
    }
    let pairwise = load_pairwise(&args, &cfg)?;

    match predict_fixture(&artifact, &pairwise, &team1, &team2, &toss_winner, toss_decision) {
        Ok(prediction) => {
            println!("{team1} vs {team2}");
            println!("Toss: {toss_winner} chose to {toss_decision}");
            println!("Predicted winner: {}", prediction.winner);
            Ok(())
        }
        Err(StatsError::UnknownCategory { field, value }) => {
            eprintln!("cannot predict for unknown team: {value} ({field})");
            std::process::exit(2);
        }
        Err(err) => Err(err).context("prediction failed"),
    }
}

fn required_arg(args: &[String], name: &str) -> Result<String> {
    arg_value(args, name).ok_or_else(|| anyhow!("missing required flag {name}"))
}

/// Persisted pairwise CSV when present, otherwise rebuilt from the raw matches.
fn load_pairwise(args: &[String], cfg: &AppConfig) -> Result<Vec<PairwiseStatsRecord>> {
    let path = arg_value(args, "--pairwise").map(PathBuf::from).unwrap_or_else(|| {
        cfg.output_dir
            .join(view_file_name("pairwise_stats", SeasonFilter::Overall))
    });
    if path.exists() {
        let records = read_pairwise_table(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        info!(path = %path.display(), pairs = records.len(), "loaded pairwise table");
        return Ok(records);
    }

    info!(path = %path.display(), "pairwise table not found; rebuilding from match data");
    let (table, _) = load_match_table_with(&cfg.data_path, cfg.row_policy)
        .with_context(|| format!("failed to load {}", cfg.data_path.display()))?;
    Ok(build_pairwise_stats(&table))
}

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use crate::error::{Result, StatsError};
use crate::match_record::SeasonFilter;
use crate::normalize::RowPolicy;

pub const DEFAULT_DATA_PATH: &str = "data/raw/wpl_matches.csv";
pub const DEFAULT_OUTPUT_DIR: &str = "data/wpl";
pub const DEFAULT_MODEL_PATH: &str = "models/wpl_winner_model.json";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub output_dir: PathBuf,
    pub season: SeasonFilter,
    pub model_path: PathBuf,
    /// Also write every view into one workbook at this path.
    pub workbook_path: Option<PathBuf>,
    /// `Skip` only with `--skip-invalid-rows` or `WPL_SKIP_INVALID_ROWS=1`.
    pub row_policy: RowPolicy,
}

impl AppConfig {
    /// Flags from the process arguments, then the process environment.
    pub fn from_env_and_args() -> Result<Self> {
        load_env_files();
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::resolve(&args, |key| std::env::var(key).ok())
    }

    /// CLI flag, then environment variable, then default.
    pub fn resolve<F>(args: &[String], env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_value = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let data_path = arg_value(args, "--data")
            .or_else(|| env_value("WPL_DATA_PATH"))
            .or_else(|| env_value("DATA_PATH"))
            .unwrap_or_else(|| DEFAULT_DATA_PATH.to_string());
        let output_dir = arg_value(args, "--out")
            .or_else(|| env_value("WPL_OUTPUT_DIR"))
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
        let model_path = arg_value(args, "--model")
            .or_else(|| env_value("WPL_MODEL_PATH"))
            .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string());

        let season = match arg_value(args, "--season").or_else(|| env_value("WPL_SEASON")) {
            Some(raw) => raw.parse::<SeasonFilter>().map_err(|_| StatsError::Config {
                key: "season",
                value: raw.clone(),
            })?,
            None => SeasonFilter::Overall,
        };

        let skip_rows = args.iter().any(|a| a == "--skip-invalid-rows")
            || env_value("WPL_SKIP_INVALID_ROWS")
                .is_some_and(|v| matches!(v.trim(), "1" | "true" | "yes"));
        let row_policy = if skip_rows {
            RowPolicy::Skip
        } else {
            RowPolicy::Reject
        };

        Ok(Self {
            data_path: PathBuf::from(data_path),
            output_dir: PathBuf::from(output_dir),
            season,
            model_path: PathBuf::from(model_path),
            workbook_path: arg_value(args, "--xlsx").map(PathBuf::from),
            row_policy,
        })
    }
}

/// Value of `--name=value` or `--name value`; blank values are ignored.
pub fn arg_value(args: &[String], name: &str) -> Option<String> {
    let prefix = format!("{name}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == name
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
            && !next.starts_with("--")
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

pub fn load_env_files() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

/// `RUST_LOG` wins; otherwise `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flags_beat_env_and_defaults() {
        let env = |key: &str| match key {
            "WPL_DATA_PATH" => Some("env.csv".to_string()),
            "WPL_OUTPUT_DIR" => Some("env_out".to_string()),
            "WPL_SEASON" => Some("2023".to_string()),
            _ => None,
        };
        let cfg = AppConfig::resolve(&args(&["--data=cli.csv", "--season", "2024"]), env).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("cli.csv"));
        assert_eq!(cfg.output_dir, PathBuf::from("env_out"));
        assert_eq!(cfg.season, SeasonFilter::Season(2024));
        assert_eq!(cfg.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(cfg.workbook_path, None);
        assert_eq!(cfg.row_policy, RowPolicy::Reject);
    }

    #[test]
    fn skipping_invalid_rows_is_opt_in() {
        let cfg = AppConfig::resolve(&args(&["--skip-invalid-rows"]), |_| None).unwrap();
        assert_eq!(cfg.row_policy, RowPolicy::Skip);
        let env = |key: &str| (key == "WPL_SKIP_INVALID_ROWS").then(|| "1".to_string());
        assert_eq!(AppConfig::resolve(&[], env).unwrap().row_policy, RowPolicy::Skip);
        let env = |key: &str| (key == "WPL_SKIP_INVALID_ROWS").then(|| "0".to_string());
        assert_eq!(AppConfig::resolve(&[], env).unwrap().row_policy, RowPolicy::Reject);
    }

    #[test]
    fn data_path_falls_back_to_generic_env() {
        let env = |key: &str| (key == "DATA_PATH").then(|| "generic.csv".to_string());
        let cfg = AppConfig::resolve(&[], env).unwrap();
        assert_eq!(cfg.data_path, PathBuf::from("generic.csv"));
        assert_eq!(cfg.season, SeasonFilter::Overall);
    }

    #[test]
    fn bad_season_is_a_config_error() {
        let err = AppConfig::resolve(&args(&["--season=soon"]), |_| None).unwrap_err();
        assert!(matches!(err, StatsError::Config { key: "season", .. }));
    }

    #[test]
    fn flag_without_value_is_ignored() {
        assert_eq!(arg_value(&args(&["--out", "--season=2023"]), "--out"), None);
        assert_eq!(arg_value(&args(&["--out", "dir"]), "--out"), Some("dir".to_string()));
    }
}

use anyhow::{Context, Result};
use tracing::info;

use wpl_stats::SeasonFilter;
use wpl_stats::config::{AppConfig, init_tracing};
use wpl_stats::dataset::load_match_table_with;
use wpl_stats::export::{DerivedViews, write_views, write_workbook};

fn main() -> Result<()> {
    init_tracing();
    let cfg = AppConfig::from_env_and_args().context("invalid configuration")?;

    let (table, report) = load_match_table_with(&cfg.data_path, cfg.row_policy)
        .with_context(|| format!("failed to load {}", cfg.data_path.display()))?;

    let scopes = match cfg.season {
        SeasonFilter::Overall => table.scopes(),
        season => vec![season],
    };
    let views = DerivedViews::for_scopes(&table, &scopes);
    info!(
        scopes = views.scopes.len(),
        pairs = views.pairwise.len(),
        "derived views"
    );

    let written = write_views(&cfg.output_dir, &views)
        .with_context(|| format!("failed to write views to {}", cfg.output_dir.display()))?;
    if let Some(path) = &cfg.workbook_path {
        write_workbook(path, &views)
            .with_context(|| format!("failed to write workbook {}", path.display()))?;
    }

    println!("WPL statistics complete");
    println!("Input: {}", cfg.data_path.display());
    println!(
        "Rows: {} kept / {} read ({} skipped)",
        report.rows_kept, report.rows_in, report.rows_skipped
    );
    println!("Teams: {}", table.teams().len());
    println!("Seasons: {:?}", table.seasons());
    println!("Output: {}", cfg.output_dir.display());
    println!("Files written: {} ({} rows)", written.files.len(), written.rows);
    if let Some(path) = &cfg.workbook_path {
        println!("Workbook: {}", path.display());
    }

    Ok(())
}

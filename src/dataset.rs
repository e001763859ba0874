use std::fs;
use std::io::Read;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::error::Result;
use crate::match_record::MatchTable;
use crate::normalize::{NormalizeReport, RawTable, RowPolicy, normalize_with};

pub fn read_raw_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);
    let headers = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok(RawTable::new(headers, rows))
}

pub fn load_raw_table(path: &Path) -> Result<RawTable> {
    let file = fs::File::open(path)?;
    read_raw_table(file)
}

/// Load and normalize the match file in one step. This is the single place a
/// run reads its input; every aggregator then borrows the returned table.
pub fn load_match_table(path: &Path) -> Result<(MatchTable, NormalizeReport)> {
    load_match_table_with(path, RowPolicy::Reject)
}

pub fn load_match_table_with(
    path: &Path,
    policy: RowPolicy,
) -> Result<(MatchTable, NormalizeReport)> {
    let raw = load_raw_table(path)?;
    let (table, report) = normalize_with(&raw, policy)?;
    info!(
        path = %path.display(),
        rows_in = report.rows_in,
        rows_kept = report.rows_kept,
        "loaded match table"
    );
    if report.rows_skipped > 0 {
        warn!(rows_skipped = report.rows_skipped, "some match rows were skipped");
    }
    if report.venue_defaulted {
        warn!("input has no venue column; every match is assigned the unknown venue");
    }
    Ok((table, report))
}

/// Base64 SHA-256 of the raw input bytes, stored with trained models.
pub fn dataset_digest(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    STANDARD.encode(digest)
}

pub fn file_digest(path: &Path) -> Result<String> {
    let bytes = fs::read(path)?;
    Ok(dataset_digest(&bytes))
}

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StatsError>;

#[derive(Debug, Error)]
pub enum StatsError {
    /// A hard-required column is absent from the raw input.
    #[error("missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A data row (1-based, header excluded) cannot describe a fixture.
    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    /// The encoder was asked about a value it never saw while fitting.
    #[error("unknown {field} value {value:?}")]
    UnknownCategory { field: &'static str, value: String },

    /// A configuration flag or environment variable could not be parsed.
    #[error("invalid {key} value {value:?}")]
    Config { key: &'static str, value: String },

    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("workbook: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}

impl StatsError {
    pub fn is_unknown_category(&self) -> bool {
        matches!(self, StatsError::UnknownCategory { .. })
    }
}

/// Non-fatal: an aggregator found no rows for its scope and returns an empty
/// table. Callers read an empty table as "no data for this view".
pub(crate) fn warn_empty_input(view: &'static str, scope: crate::match_record::SeasonFilter) {
    tracing::warn!(view, scope = %scope, "no matches in scope; view is empty");
}

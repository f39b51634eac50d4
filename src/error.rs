//! Error types for loading, joining and exporting alert map data.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a load or an export.
#[derive(Debug, Error)]
pub enum MapError {
    /// A required column could not be resolved from the sheet headers.
    #[error("invalid {table} table: missing {missing}. Columns found: {columns:?}")]
    Validation {
        table: &'static str,
        missing: String,
        columns: Vec<String>,
    },

    /// The spreadsheet could not be opened or a sheet could not be read.
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    /// The workbook contains no sheets at all.
    #[error("workbook has no sheets")]
    EmptyWorkbook,

    #[error("failed to read {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error in {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl MapError {
    pub(crate) fn validation(table: &'static str, missing: &[&str], columns: &[String]) -> Self {
        Self::Validation {
            table,
            missing: missing.join(", "),
            columns: columns.to_vec(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapError>;

/// Non-fatal conditions surfaced to the operator while processing continues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A join or filter stage produced zero rows.
    EmptyResult { stage: &'static str },
    /// A chain-code filter was requested but the alert sheet has no chain column.
    MissingChainColumn,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::EmptyResult { stage } => write!(f, "{stage} produced no rows"),
            Warning::MissingChainColumn => {
                write!(f, "the alert sheet has no chain code (Lant) column")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_columns() {
        let err = MapError::validation(
            "locations",
            &["latitude", "longitude"],
            &["Cod Site".to_string(), "Name".to_string()],
        );
        let msg = err.to_string();
        assert!(msg.contains("missing latitude, longitude"));
        assert!(msg.contains("\"Cod Site\""));
        assert!(msg.contains("\"Name\""));
    }

    #[test]
    fn warning_display() {
        let w = Warning::EmptyResult { stage: "issue filter" };
        assert_eq!(w.to_string(), "issue filter produced no rows");
        assert!(Warning::MissingChainColumn.to_string().contains("Lant"));
    }
}

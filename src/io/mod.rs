//! CSV reading of telemetry tables and writing of results.

use std::path::PathBuf;

use thiserror::Error;

pub mod export;
pub mod import;

/// Failure reading or writing a CSV file.
#[derive(Debug, Error)]
pub enum TableIoError {
    #[error("cannot open \"{}\": {source}", path.display())]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

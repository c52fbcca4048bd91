//! Telemetry table import from flattened CSV dumps.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use super::TableIoError;
use crate::table::TelemetryTable;

/// Reads a headed CSV file into a [`TelemetryTable`].
///
/// # Errors
///
/// Returns `TableIoError::Open` if the file cannot be opened, or
/// `TableIoError::Csv` for malformed content.
pub fn read_table_from_path(path: &Path) -> Result<TelemetryTable, TableIoError> {
    let file = File::open(path).map_err(|source| TableIoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_table(BufReader::new(file))?;
    debug!(path = %path.display(), rows = table.len(), "telemetry table loaded");
    Ok(table)
}

/// Reads a headed CSV stream into a [`TelemetryTable`].
///
/// Every record must have as many fields as the header row.
///
/// # Errors
///
/// Returns `TableIoError::Csv` for malformed content or ragged records.
pub fn read_table(reader: impl Read) -> Result<TelemetryTable, TableIoError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut table = TelemetryTable::new(rdr.headers()?.iter());
    for record in rdr.records() {
        table.push_record(record?.iter());
    }
    Ok(table)
}

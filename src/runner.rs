//! Multi-plant runs: load each plant's table, calculate, collect.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::engine::calculate;
use crate::engine::summary::AvailabilitySummary;
use crate::engine::types::{Calculation, CalculationParams};
use crate::error::{AvailabilityError, ConfigurationError};
use crate::io::import::read_table_from_path;
use crate::table::TelemetryTable;

/// Where to find one plant's flattened telemetry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlantSource {
    /// Display name, e.g. `Coca Cola Faisalabad`.
    pub name: String,
    /// CSV file with the plant's flattened telemetry.
    pub path: PathBuf,
}

impl PlantSource {
    /// Builds a source from a file, naming the plant after the file stem
    /// with underscores shown as spaces.
    pub fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        Some(Self {
            name: stem.replace('_', " "),
            path: path.to_path_buf(),
        })
    }
}

/// One plant's telemetry, ready for the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantInput {
    pub name: String,
    pub table: TelemetryTable,
}

/// Successful calculation for one plant.
#[derive(Debug, Clone, PartialEq)]
pub struct PlantReport {
    pub plant: String,
    pub calculation: Calculation,
    pub summary: AvailabilitySummary,
}

/// A plant that produced no records, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPlant {
    pub plant: String,
    pub error: AvailabilityError,
}

/// Outcome of a multi-plant run, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub params: CalculationParams,
    pub reports: Vec<PlantReport>,
    pub skipped: Vec<SkippedPlant>,
}

impl RunOutcome {
    /// Total availability records across all plants.
    pub fn record_count(&self) -> usize {
        self.reports
            .iter()
            .map(|r| r.calculation.records.len())
            .sum()
    }
}

/// Lists every `*.csv` file in `dir` as a plant source, sorted by name.
///
/// # Errors
///
/// Returns an `io::Error` if the directory cannot be read.
pub fn discover_plants(dir: &Path) -> io::Result<Vec<PlantSource>> {
    let mut sources = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
        if !is_csv {
            continue;
        }
        if let Some(source) = PlantSource::from_path(&path) {
            sources.push(source);
        }
    }
    sources.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(sources)
}

/// Loads every source's CSV; unreadable files are logged and left out.
pub fn load_plants(sources: &[PlantSource]) -> Vec<PlantInput> {
    sources
        .iter()
        .filter_map(|source| match read_table_from_path(&source.path) {
            Ok(table) => Some(PlantInput {
                name: source.name.clone(),
                table,
            }),
            Err(e) => {
                error!(plant = %source.name, error = %e, "failed to load telemetry");
                None
            }
        })
        .collect()
}

/// Runs the engine once per plant, in parallel.
///
/// Plants with no data are logged as warnings and skipped; plants whose
/// tables lack a required column are logged as errors and skipped. Neither
/// stops the remaining plants.
///
/// # Errors
///
/// Returns the `ConfigurationError` if `params` is invalid; no plant is
/// processed in that case.
pub fn run_plants(
    inputs: &[PlantInput],
    params: &CalculationParams,
) -> Result<RunOutcome, ConfigurationError> {
    params.validate()?;

    let results: Vec<(String, Result<Calculation, AvailabilityError>)> = inputs
        .par_iter()
        .map(|input| {
            info!(plant = %input.name, granularity = %params.level, "processing plant");
            (input.name.clone(), calculate(&input.table, &input.name, params))
        })
        .collect();

    let mut reports = Vec::new();
    let mut skipped = Vec::new();
    for (plant, result) in results {
        match result {
            Ok(calculation) => {
                let summary = AvailabilitySummary::from_records(&calculation.records);
                reports.push(PlantReport {
                    plant,
                    calculation,
                    summary,
                });
            }
            Err(e) => {
                if e.is_recoverable() {
                    warn!(plant = %plant, error = %e, "skipping plant");
                } else {
                    error!(plant = %plant, error = %e, "skipping plant");
                }
                skipped.push(SkippedPlant { plant, error: e });
            }
        }
    }

    Ok(RunOutcome {
        params: *params,
        reports,
        skipped,
    })
}

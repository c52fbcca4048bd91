//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::RunConfig;
use crate::runner::PlantSource;

#[derive(Debug, Parser)]
#[command(name = "plant-availability")]
#[command(version, about = "Daily availability for solar plants from flattened telemetry")]
#[command(
    long_about = "Computes daily availability at plant, inverter, MPPT or string level.\n\
    \nFormula A counts operational hours against potential hours; formula B\n\
    weights each hour by its irradiance.\n\
    \nExamples:\n  \
    plant-availability --input-dir data/ --level inverter\n  \
    plant-availability --input \"Metro DHA=metro.csv\" --formula B\n  \
    plant-availability --config run.toml --output results.csv"
)]
pub struct CliOptions {
    /// TOML run configuration; command-line flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Plant telemetry as NAME=PATH (repeatable)
    #[arg(short, long = "input", value_name = "NAME=PATH", value_parser = parse_plant_source)]
    pub inputs: Vec<PlantSource>,

    /// Directory of per-plant CSV files, named after the plant
    #[arg(long, conflicts_with = "inputs")]
    pub input_dir: Option<PathBuf>,

    /// plant, inverter, mppt or string
    #[arg(short, long)]
    pub level: Option<String>,

    /// A (time-based) or B (irradiance-weighted)
    #[arg(short, long)]
    pub formula: Option<String>,

    /// Irradiance threshold in kW/m²
    #[arg(long)]
    pub irradiance_threshold: Option<f64>,

    /// Power a reading must exceed to count as operational
    #[arg(long)]
    pub power_threshold: Option<f64>,

    /// Combined results CSV
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for per-plant diagnostic CSVs
    #[arg(long)]
    pub diagnostics_dir: Option<PathBuf>,
}

impl CliOptions {
    /// Overlays every flag that was given onto `cfg`.
    ///
    /// Explicit inputs replace the configured plant list; an input directory
    /// replaces both the list and any configured directory.
    pub fn apply_to(&self, cfg: &mut RunConfig) {
        if let Some(level) = &self.level {
            cfg.calculation.level = level.clone();
        }
        if let Some(formula) = &self.formula {
            cfg.calculation.formula = formula.clone();
        }
        if let Some(t) = self.irradiance_threshold {
            cfg.calculation.irradiance_threshold = t;
        }
        if let Some(t) = self.power_threshold {
            cfg.calculation.power_threshold = t;
        }
        if !self.inputs.is_empty() {
            cfg.input.plants = self.inputs.clone();
            cfg.input.directory = None;
        }
        if let Some(dir) = &self.input_dir {
            cfg.input.directory = Some(dir.clone());
            cfg.input.plants.clear();
        }
        if let Some(path) = &self.output {
            cfg.output.results = Some(path.clone());
        }
        if let Some(dir) = &self.diagnostics_dir {
            cfg.output.diagnostics_dir = Some(dir.clone());
        }
    }
}

fn parse_plant_source(arg: &str) -> Result<PlantSource, String> {
    let (name, path) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got \"{arg}\""))?;
    let name = name.trim();
    if name.is_empty() || path.trim().is_empty() {
        return Err(format!("expected NAME=PATH, got \"{arg}\""));
    }
    Ok(PlantSource {
        name: name.to_string(),
        path: PathBuf::from(path.trim()),
    })
}

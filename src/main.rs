//! Plant availability entry point: CLI wiring, config, multi-plant run, export.

use std::fs;
use std::path::Path;
use std::process;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use plant_availability::cli::CliOptions;
use plant_availability::config::RunConfig;
use plant_availability::io::export::{
    availability_header, export_availability_csv, export_diagnostics_csv,
};
use plant_availability::runner::{RunOutcome, discover_plants, load_plants, run_plants};

/// Rows of the combined table echoed to stdout.
const PREVIEW_ROWS: usize = 10;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("plant_availability=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &CliOptions) -> Result<RunConfig> {
    let mut cfg = match &cli.config {
        Some(path) => RunConfig::from_toml_file(path).map_err(|e| anyhow::anyhow!("{e}"))?,
        None => RunConfig::default(),
    };
    cli.apply_to(&mut cfg);

    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        bail!("invalid configuration ({} errors)", errors.len());
    }
    Ok(cfg)
}

fn print_outcome(outcome: &RunOutcome) {
    for report in &outcome.reports {
        println!("{}: {}", report.plant, report.summary);
    }
    for skipped in &outcome.skipped {
        println!("{}: skipped ({})", skipped.plant, skipped.error);
    }

    println!();
    println!("{}", availability_header(&outcome.params).join(" | "));
    let rows = outcome
        .reports
        .iter()
        .flat_map(|r| r.calculation.records.iter().map(move |rec| (&r.plant, rec)));
    for (plant, rec) in rows.take(PREVIEW_ROWS) {
        let entity = rec
            .entity_id
            .as_deref()
            .map(|e| format!("{e} | "))
            .unwrap_or_default();
        println!(
            "{} | {plant} | {entity}{} | {} | {}",
            rec.date, rec.numerator, rec.denominator, rec.availability
        );
    }
    let total = outcome.record_count();
    if total > PREVIEW_ROWS {
        println!("... {} more rows", total - PREVIEW_ROWS);
    }
}

fn export_diagnostics(outcome: &RunOutcome, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("cannot create diagnostics directory {}", dir.display()))?;
    for report in &outcome.reports {
        let file = dir.join(format!(
            "{}_{}_diagnostics.csv",
            report.plant.replace(' ', "_"),
            outcome.params.level
        ));
        export_diagnostics_csv(report, &outcome.params, &file)
            .with_context(|| format!("failed to write {}", file.display()))?;
        info!(plant = %report.plant, path = %file.display(), "diagnostics written");
    }
    Ok(())
}

fn run(cli: &CliOptions) -> Result<()> {
    let cfg = load_config(cli)?;
    let params = cfg.calculation_params()?;

    let (sources, discovered) = match &cfg.input.directory {
        Some(dir) => (
            discover_plants(dir)
                .with_context(|| format!("cannot scan input directory {}", dir.display()))?,
            true,
        ),
        None => (cfg.input.plants.clone(), false),
    };
    if sources.is_empty() {
        bail!("no plant inputs given; use --input NAME=PATH or --input-dir DIR");
    }

    let inputs = load_plants(&sources);
    if inputs.len() < sources.len() {
        warn!(
            loaded = inputs.len(),
            requested = sources.len(),
            "some plant files could not be read"
        );
    }
    let outcome = run_plants(&inputs, &params)?;
    print_outcome(&outcome);

    if outcome.record_count() == 0 {
        bail!("no availability records produced");
    }

    let names: Vec<String> = sources.iter().map(|s| s.name.clone()).collect();
    let path = cfg.output.results_path(&names, discovered, &params);
    export_availability_csv(&outcome.reports, &params, &path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("Results written to {}", path.display());

    if let Some(dir) = &cfg.output.diagnostics_dir {
        export_diagnostics(&outcome, dir)?;
    }
    Ok(())
}

fn main() {
    init_tracing();
    let cli = CliOptions::parse();
    if let Err(e) = run(&cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

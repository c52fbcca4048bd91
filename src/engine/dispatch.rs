//! Pipeline entry point: resolve, filter, evaluate, aggregate, score.

use tracing::{debug, info};

use crate::error::{AvailabilityError, Result};
use crate::table::TelemetryTable;

use super::aggregate::aggregate;
use super::condition::evaluate;
use super::summary::AvailabilitySummary;
use super::types::{CalculationParams, Calculation, EvaluatedRow};

/// Computes daily availability for one plant's table.
///
/// Runs the level resolver, the level's row filter, the condition evaluator,
/// the aggregator and the selected formula, in that order. Parameters are
/// validated before any row is touched, so a bad threshold never produces
/// partial output.
///
/// # Arguments
///
/// * `table` - Flattened telemetry for one plant and period
/// * `plant` - Plant name, used when the table has no `Plant` column
/// * `params` - Level, formula and thresholds for this invocation
///
/// # Errors
///
/// * `Configuration` for invalid thresholds
/// * `EmptyInput` when the table has no rows, or none survive the level filter
/// * `MissingColumn` when a required column is absent
///
/// # Examples
///
/// ```
/// use plant_availability::engine::dispatch::calculate;
/// use plant_availability::engine::formula::Formula;
/// use plant_availability::engine::level::Level;
/// use plant_availability::engine::types::{Availability, CalculationParams};
/// use plant_availability::table::TelemetryTable;
///
/// let mut table = TelemetryTable::new([
///     "timestamp",
///     "dataItemMap.inverter_power",
///     "dataItemMap.radiation_intensity",
/// ]);
/// table.push_record(["2024-06-01 10:00:00", "35.0", "0.40"]);
/// table.push_record(["2024-06-01 11:00:00", "0.0", "0.55"]);
///
/// let params = CalculationParams::new(Level::Plant, Formula::A);
/// let calc = calculate(&table, "Metro DHA", &params).expect("valid input");
/// assert_eq!(calc.records.len(), 1);
/// assert_eq!(calc.records[0].availability, Availability::Percent(50.0));
/// ```
pub fn calculate(
    table: &TelemetryTable,
    plant: &str,
    params: &CalculationParams,
) -> Result<Calculation> {
    params.validate()?;
    let level = params.level;
    let empty = || AvailabilityError::EmptyInput {
        plant: plant.to_string(),
        level: level.as_str(),
    };

    if table.is_empty() {
        return Err(empty());
    }

    let layout = level.layout();
    let projection = layout.project(table, plant)?;
    let columns = projection.columns;
    debug!(
        plant,
        granularity = %level,
        rows = projection.rows.len(),
        power_column = projection.columns.power_column,
        irradiance_column = projection.columns.irradiance_column,
        "projected telemetry"
    );

    let diagnostics: Vec<EvaluatedRow> = projection
        .rows
        .into_iter()
        .filter(|row| layout.keeps(row))
        .map(|row| {
            let entity_id = layout.entity_id(&row);
            evaluate(row, entity_id, params)
        })
        .collect();

    if diagnostics.is_empty() {
        return Err(empty());
    }

    let records: Vec<_> = aggregate(&diagnostics)
        .into_iter()
        .map(|((date, entity_id), group)| params.formula.record(date, entity_id, &group))
        .collect();

    let summary = AvailabilitySummary::from_records(&records);
    info!(
        plant,
        granularity = %level,
        formula = %params.formula,
        records = summary.total_records,
        unavailable = summary.unavailable_records,
        mean = ?summary.mean_pct,
        "availability calculated"
    );

    Ok(Calculation {
        records,
        diagnostics,
        power_column: columns.power_column,
        irradiance_column: columns.irradiance_column,
    })
}

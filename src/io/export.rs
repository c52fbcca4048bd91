//! CSV export for availability results and per-row diagnostics.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use super::TableIoError;
use crate::engine::formula::Formula;
use crate::engine::level::PLANT_COLUMN;
use crate::engine::types::{AvailabilityRecord, CalculationParams};
use crate::runner::PlantReport;

const DATE_COLUMN: &str = "Date";
const AVAILABILITY_COLUMN: &str = "Availability";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Column header for the combined availability table.
///
/// `Date`, `Plant`, the level's entity column (omitted at plant level), the
/// formula's numerator and denominator columns, then `Availability`.
pub fn availability_header(params: &CalculationParams) -> Vec<&'static str> {
    let (num, den) = params.formula.strategy().column_names();
    let mut header = vec![DATE_COLUMN, PLANT_COLUMN];
    header.extend(params.level.layout().entity_column_name);
    header.extend([num, den, AVAILABILITY_COLUMN]);
    header
}

/// Exports the combined availability table of several plants to `path`.
///
/// # Errors
///
/// Returns a `TableIoError` if file creation or writing fails.
pub fn export_availability_csv(
    reports: &[PlantReport],
    params: &CalculationParams,
    path: &Path,
) -> Result<(), TableIoError> {
    let file = File::create(path).map_err(|source| TableIoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    write_availability_csv(reports, params, io::BufWriter::new(file))
}

/// Writes the combined availability table to any writer.
///
/// Rows appear plant by plant in report order, and within a plant by date
/// then entity. Produces identical bytes for identical inputs.
///
/// # Errors
///
/// Returns a `TableIoError` if writing fails.
pub fn write_availability_csv(
    reports: &[PlantReport],
    params: &CalculationParams,
    writer: impl Write,
) -> Result<(), TableIoError> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    let has_entity = params.level.layout().entity_column_name.is_some();

    wtr.write_record(availability_header(params))?;

    for report in reports {
        for r in &report.calculation.records {
            let mut row = vec![r.date.to_string(), report.plant.clone()];
            if has_entity {
                row.push(r.entity_id.clone().unwrap_or_default());
            }
            let (num, den) = format_ratio(params.formula, r);
            row.extend([num, den, r.availability.to_string()]);
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Exports one plant's evaluated rows to `path`.
///
/// # Errors
///
/// Returns a `TableIoError` if file creation or writing fails.
pub fn export_diagnostics_csv(
    report: &PlantReport,
    params: &CalculationParams,
    path: &Path,
) -> Result<(), TableIoError> {
    let file = File::create(path).map_err(|source| TableIoError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    write_diagnostics_csv(report, params, io::BufWriter::new(file))
}

/// Writes one plant's evaluated rows, in input order.
///
/// Power and irradiance are headed by the columns they were actually read
/// from, so a plant-level fallback stays visible.
///
/// # Errors
///
/// Returns a `TableIoError` if writing fails.
pub fn write_diagnostics_csv(
    report: &PlantReport,
    params: &CalculationParams,
    writer: impl Write,
) -> Result<(), TableIoError> {
    let layout = params.level.layout();
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    let mut header = vec![PLANT_COLUMN];
    header.extend(layout.entity_column_name);
    header.extend([
        "timestamp",
        report.calculation.power_column,
        report.calculation.irradiance_column,
        "Condition_Numerator",
        "Condition_Denominator",
        "Potential_Weight",
        "Actual_Weight",
    ]);
    wtr.write_record(&header)?;

    for d in &report.calculation.diagnostics {
        let mut row = vec![d.row.plant_id.clone()];
        if layout.entity_column_name.is_some() {
            row.push(d.entity_id.clone().unwrap_or_default());
        }
        row.extend([
            d.row.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            d.row.power.to_string(),
            d.row.irradiance.to_string(),
            u8::from(d.is_operational_numerator).to_string(),
            u8::from(d.is_potential_denominator).to_string(),
            d.weight.to_string(),
            d.weighted_numerator.to_string(),
        ]);
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Counts print as integers, weights with four decimals.
fn format_ratio(formula: Formula, record: &AvailabilityRecord) -> (String, String) {
    match formula {
        Formula::A => (
            format!("{:.0}", record.numerator),
            format!("{:.0}", record.denominator),
        ),
        Formula::B => (
            format!("{:.4}", record.numerator),
            format!("{:.4}", record.denominator),
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::engine::level::Level;
    use crate::engine::summary::AvailabilitySummary;
    use crate::engine::types::{Availability, Calculation};

    fn record(
        day: u32,
        entity: Option<&str>,
        num: f64,
        den: f64,
        a: Availability,
    ) -> AvailabilityRecord {
        AvailabilityRecord {
            date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap_or_default(),
            entity_id: entity.map(str::to_string),
            numerator: num,
            denominator: den,
            availability: a,
        }
    }

    fn report(plant: &str, records: Vec<AvailabilityRecord>) -> PlantReport {
        let summary = AvailabilitySummary::from_records(&records);
        PlantReport {
            plant: plant.to_string(),
            calculation: Calculation {
                records,
                diagnostics: Vec::new(),
                power_column: "dataItemMap.inverter_power",
                irradiance_column: "dataItemMap.radiation_intensity",
            },
            summary,
        }
    }

    fn render(reports: &[PlantReport], params: &CalculationParams) -> String {
        let mut buf = Vec::new();
        write_availability_csv(reports, params, &mut buf).ok();
        String::from_utf8(buf).unwrap_or_default()
    }

    #[test]
    fn plant_level_header_has_no_entity_column() {
        let params = CalculationParams::new(Level::Plant, Formula::A);
        assert_eq!(
            availability_header(&params),
            vec![
                "Date",
                "Plant",
                "Condition_Numerator",
                "Condition_Denominator",
                "Availability"
            ]
        );
    }

    #[test]
    fn string_level_weighted_header() {
        let params = CalculationParams::new(Level::String, Formula::B);
        assert_eq!(
            availability_header(&params),
            vec![
                "Date",
                "Plant",
                "string_id",
                "Actual_Weight",
                "Potential_Weight",
                "Availability"
            ]
        );
    }

    #[test]
    fn formula_a_rows_print_counts_and_sentinel() {
        let params = CalculationParams::new(Level::Plant, Formula::A);
        let reports = vec![report(
            "Metro DHA",
            vec![
                record(1, None, 11.0, 12.0, Availability::Percent(91.67)),
                record(2, None, 0.0, 0.0, Availability::Unavailable),
            ],
        )];
        let out = render(&reports, &params);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "2024-06-01,Metro DHA,11,12,91.67");
        assert_eq!(lines[2], "2024-06-02,Metro DHA,0,0,Data Unavailable");
    }

    #[test]
    fn formula_b_rows_print_weights() {
        let params = CalculationParams::new(Level::Inverter, Formula::B);
        let reports = vec![report(
            "Metro",
            vec![record(1, Some("Metro_SN1"), 2.25, 3.0, Availability::Percent(75.0))],
        )];
        let out = render(&reports, &params);
        assert_eq!(
            out.lines().nth(1),
            Some("2024-06-01,Metro,Metro_SN1,2.2500,3.0000,75.00")
        );
    }

    #[test]
    fn diagnostics_header_names_fallback_columns() {
        let mut table = crate::table::TelemetryTable::new([
            "timestamp",
            "sn",
            "dataItemMap.inverter_power",
            "dataItemMap.radiation_intensity",
        ]);
        table.push_record(["2024-06-01 10:00:00", "SN1", "12.5", "0.4"]);
        let params = CalculationParams::new(Level::Inverter, Formula::A);
        let calculation =
            crate::engine::calculate(&table, "Metro", &params).expect("plant-level fallback");
        let summary = AvailabilitySummary::from_records(&calculation.records);
        let report = PlantReport {
            plant: "Metro".to_string(),
            calculation,
            summary,
        };

        let mut buf = Vec::new();
        write_diagnostics_csv(&report, &params, &mut buf).ok();
        let out = String::from_utf8(buf).unwrap_or_default();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(
            lines.first().copied(),
            Some(
                "Plant,sn_id,timestamp,dataItemMap.inverter_power,\
                 dataItemMap.radiation_intensity,Condition_Numerator,\
                 Condition_Denominator,Potential_Weight,Actual_Weight"
            )
        );
        assert_eq!(
            lines.get(1).copied(),
            Some("Metro,Metro_SN1,2024-06-01 10:00:00,12.5,0.4,1,1,0.4,0.4")
        );
    }

    #[test]
    fn deterministic_output() {
        let params = CalculationParams::new(Level::Plant, Formula::A);
        let reports = vec![report(
            "Metro",
            vec![record(1, None, 3.0, 4.0, Availability::Percent(75.0))],
        )];
        assert_eq!(render(&reports, &params), render(&reports, &params));
    }

    #[test]
    fn round_trip_parseable() {
        let params = CalculationParams::new(Level::Mppt, Formula::A);
        let reports = vec![report(
            "Metro",
            vec![
                record(1, Some("Metro_SN1_1"), 5.0, 10.0, Availability::Percent(50.0)),
                record(1, Some("Metro_SN1_2"), 10.0, 10.0, Availability::Percent(100.0)),
            ],
        )];
        let out = render(&reports, &params);
        let mut rdr = csv::ReaderBuilder::new().from_reader(out.as_bytes());
        assert_eq!(rdr.headers().map(csv::StringRecord::len).ok(), Some(6));
        let mut count = 0;
        for rec in rdr.records() {
            let rec = rec.ok();
            let pct = rec.as_ref().and_then(|r| r.get(5)).map(str::parse::<f64>);
            assert!(matches!(pct, Some(Ok(_))), "availability should parse");
            count += 1;
        }
        assert_eq!(count, 2);
    }
}

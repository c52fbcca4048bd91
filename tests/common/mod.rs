//! Shared telemetry fixtures for integration tests.

#![allow(dead_code)]

use plant_availability::table::TelemetryTable;

/// Plant-level power column.
pub const PLANT_POWER: &str = "dataItemMap.inverter_power";
/// Plant-level irradiance column.
pub const PLANT_IRRADIANCE: &str = "dataItemMap.radiation_intensity";

/// Hour of the first daylight reading in [`sunny_day`].
pub const SUNRISE_HOUR: u32 = 6;
/// Number of daylight readings in [`sunny_day`].
pub const DAYLIGHT_HOURS: u32 = 12;

/// One hourly plant-level reading.
#[derive(Debug, Clone, Copy)]
pub struct Reading {
    pub hour: u32,
    pub power: f64,
    pub irradiance: f64,
}

/// 24 hourly readings: 12 daylight hours at 0.6 kW/m² and 40 kW, night at zero.
pub fn sunny_day() -> Vec<Reading> {
    (0..24)
        .map(|hour| {
            let daylight = (SUNRISE_HOUR..SUNRISE_HOUR + DAYLIGHT_HOURS).contains(&hour);
            Reading {
                hour,
                power: if daylight { 40.0 } else { 0.0 },
                irradiance: if daylight { 0.6 } else { 0.0 },
            }
        })
        .collect()
}

/// Builds a plant-level table for `date` (`YYYY-MM-DD`).
pub fn plant_table(date: &str, readings: &[Reading]) -> TelemetryTable {
    let mut table = TelemetryTable::new(["timestamp", PLANT_POWER, PLANT_IRRADIANCE]);
    append_plant_day(&mut table, date, readings);
    table
}

/// Appends one day of plant-level readings to an existing table.
pub fn append_plant_day(table: &mut TelemetryTable, date: &str, readings: &[Reading]) {
    for r in readings {
        table.push_record([
            format!("{date} {:02}:00:00", r.hour),
            r.power.to_string(),
            r.irradiance.to_string(),
        ]);
    }
}

/// One string-level reading.
#[derive(Debug, Clone, Copy)]
pub struct StringReading<'a> {
    pub hour: u32,
    pub sn: &'a str,
    pub mppt: u32,
    pub string: u32,
    pub watts: f64,
    pub irradiance: f64,
    pub configured: bool,
}

/// Builds a string-level table with a `Plant` column.
pub fn string_table(plant: &str, date: &str, readings: &[StringReading<'_>]) -> TelemetryTable {
    let mut table = TelemetryTable::new([
        "Day_Hour",
        "Plant",
        "sn",
        "MPPT",
        "Strings",
        "Watt/String",
        "radiation_intensity",
        "String_Configured",
    ]);
    for r in readings {
        table.push_record([
            format!("{date} {:02}", r.hour),
            plant.to_string(),
            r.sn.to_string(),
            r.mppt.to_string(),
            r.string.to_string(),
            r.watts.to_string(),
            r.irradiance.to_string(),
            r.configured.to_string(),
        ]);
    }
    table
}

/// Serializes a table as CSV text.
pub fn to_csv(table: &TelemetryTable) -> String {
    let mut out = table.headers().join(",");
    out.push('\n');
    for record in table.records() {
        out.push_str(&record.join(","));
        out.push('\n');
    }
    out
}

//! Level resolution: which columns feed a level and how its rows are keyed.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::{AvailabilityError, ConfigurationError, Result};
use crate::table::{TelemetryTable, parse_flag, parse_numeric, parse_timestamp};

use super::types::TelemetryRow;

/// Primary timestamp column.
pub const TIMESTAMP_COLUMN: &str = "timestamp";
/// Hourly bucket column used by string-level collections (`YYYY-MM-DD HH`).
pub const DAY_HOUR_COLUMN: &str = "Day_Hour";
/// Plant name column added by the flatten layer.
pub const PLANT_COLUMN: &str = "Plant";
/// String provisioning flag.
pub const CONFIGURED_COLUMN: &str = "String_Configured";

const PLANT_POWER_COLUMN: &str = "dataItemMap.inverter_power";
const PLANT_IRRADIANCE_COLUMN: &str = "dataItemMap.radiation_intensity";
const DEVICE_IRRADIANCE_COLUMN: &str = "radiation_intensity";
const ENTITY_SEPARATOR: &str = "_";

/// Granularity of an availability calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Plant,
    Inverter,
    Mppt,
    String,
}

impl Level {
    pub const ALL: [Self; 4] = [Self::Plant, Self::Inverter, Self::Mppt, Self::String];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plant => "plant",
            Self::Inverter => "inverter",
            Self::Mppt => "mppt",
            Self::String => "string",
        }
    }

    /// Fixed column layout for this level.
    pub fn layout(&self) -> LevelLayout {
        match self {
            Self::Plant => LevelLayout {
                level: *self,
                power_column: PLANT_POWER_COLUMN,
                irradiance_column: PLANT_IRRADIANCE_COLUMN,
                inverter_column: None,
                mppt_column: None,
                string_column: None,
                entity_column_name: None,
                configured_column: None,
                uses_shared_source: false,
            },
            Self::Inverter => LevelLayout {
                level: *self,
                power_column: "InverterPower",
                irradiance_column: DEVICE_IRRADIANCE_COLUMN,
                inverter_column: Some("sn"),
                mppt_column: None,
                string_column: None,
                entity_column_name: Some("sn_id"),
                configured_column: None,
                uses_shared_source: true,
            },
            Self::Mppt => LevelLayout {
                level: *self,
                power_column: "mppt_Power",
                irradiance_column: DEVICE_IRRADIANCE_COLUMN,
                inverter_column: Some("sn"),
                mppt_column: Some("mpptId"),
                string_column: None,
                entity_column_name: Some("mppt_id"),
                configured_column: None,
                uses_shared_source: true,
            },
            Self::String => LevelLayout {
                level: *self,
                power_column: "Watt/String",
                irradiance_column: DEVICE_IRRADIANCE_COLUMN,
                inverter_column: Some("sn"),
                mppt_column: Some("MPPT"),
                string_column: Some("Strings"),
                entity_column_name: Some("string_id"),
                configured_column: Some(CONFIGURED_COLUMN),
                uses_shared_source: false,
            },
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigurationError::UnknownLevel(s.to_string()))
    }
}

/// Column names and keying rules for one level.
///
/// Inverter and MPPT levels are currently fed the plant-level collection
/// (`uses_shared_source`): when their own power or irradiance column is
/// missing the plant-level column stands in, and the entity id is built
/// from whatever identifier columns the table carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelLayout {
    pub level: Level,
    pub power_column: &'static str,
    pub irradiance_column: &'static str,
    pub inverter_column: Option<&'static str>,
    pub mppt_column: Option<&'static str>,
    pub string_column: Option<&'static str>,
    /// Output column holding the entity id; `None` at plant level.
    pub entity_column_name: Option<&'static str>,
    /// Only rows with this flag set take part (string level).
    pub configured_column: Option<&'static str>,
    pub uses_shared_source: bool,
}

impl LevelLayout {
    /// Row filter: unprovisioned strings never reach aggregation.
    pub fn keeps(&self, row: &TelemetryRow) -> bool {
        match self.configured_column {
            Some(_) => row.configured == Some(true),
            None => true,
        }
    }

    /// Grouping key beyond the date; `None` at plant level.
    ///
    /// Sub-plant ids join the plant id and the present entity components
    /// with `_`; spaces are replaced so ids stay single tokens.
    pub fn entity_id(&self, row: &TelemetryRow) -> Option<String> {
        self.entity_column_name?;
        let parts: Vec<&str> = std::iter::once(row.plant_id.as_str())
            .chain(row.inverter_sn.as_deref())
            .chain(row.mppt_index.as_deref())
            .chain(row.string_index.as_deref())
            .collect();
        Some(parts.join(ENTITY_SEPARATOR).replace(' ', ENTITY_SEPARATOR))
    }

    /// Locates this layout's columns in `table`.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn` naming the first required column that is
    /// absent (timestamp, power, irradiance, and at string level the
    /// configuration flag and entity identifiers).
    pub fn resolve(&self, table: &TelemetryTable) -> Result<ResolvedColumns> {
        let timestamp = table
            .column_index(TIMESTAMP_COLUMN)
            .or_else(|| table.column_index(DAY_HOUR_COLUMN))
            .ok_or_else(|| self.missing(TIMESTAMP_COLUMN))?;

        let (power, power_column) =
            self.resolve_measurement(table, self.power_column, PLANT_POWER_COLUMN)?;
        let (irradiance, irradiance_column) =
            self.resolve_measurement(table, self.irradiance_column, PLANT_IRRADIANCE_COLUMN)?;

        let configured = self
            .configured_column
            .map(|name| table.column_index(name).ok_or_else(|| self.missing(name)))
            .transpose()?;

        let entity = |column: Option<&'static str>| -> Result<Option<usize>> {
            let Some(name) = column else {
                return Ok(None);
            };
            match table.column_index(name) {
                Some(idx) => Ok(Some(idx)),
                None if self.uses_shared_source => Ok(None),
                None => Err(self.missing(name)),
            }
        };

        Ok(ResolvedColumns {
            timestamp,
            power,
            power_column,
            irradiance,
            irradiance_column,
            plant: table.column_index(PLANT_COLUMN),
            inverter: entity(self.inverter_column)?,
            mppt: entity(self.mppt_column)?,
            string: entity(self.string_column)?,
            configured,
        })
    }

    /// Projects table records into typed rows.
    ///
    /// Records whose timestamp cannot be parsed are dropped and counted;
    /// `plant_name` stands in when the table has no `Plant` cell.
    pub fn project(&self, table: &TelemetryTable, plant_name: &str) -> Result<Projection> {
        let cols = self.resolve(table)?;
        let mut rows = Vec::with_capacity(table.len());
        let mut dropped = 0_usize;

        for record in table.records() {
            let Some(timestamp) = parse_timestamp(&record[cols.timestamp]) else {
                dropped += 1;
                continue;
            };
            let cell = |idx: Option<usize>| {
                idx.map(|i| record[i].trim())
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            };
            rows.push(TelemetryRow {
                timestamp,
                plant_id: cell(cols.plant).unwrap_or_else(|| plant_name.to_string()),
                inverter_sn: cell(cols.inverter),
                mppt_index: cell(cols.mppt),
                string_index: cell(cols.string),
                power: parse_numeric(&record[cols.power]),
                irradiance: parse_numeric(&record[cols.irradiance]),
                configured: cols.configured.map(|i| parse_flag(&record[i])),
            });
        }

        if dropped > 0 {
            warn!(
                granularity = %self.level,
                plant = plant_name,
                dropped,
                "dropped rows with unparseable timestamps"
            );
        }

        Ok(Projection {
            rows,
            dropped_timestamps: dropped,
            columns: cols,
        })
    }

    fn resolve_measurement(
        &self,
        table: &TelemetryTable,
        own: &'static str,
        plant_fallback: &'static str,
    ) -> Result<(usize, &'static str)> {
        if let Some(idx) = table.column_index(own) {
            return Ok((idx, own));
        }
        let fallback = if self.uses_shared_source {
            table.column_index(plant_fallback)
        } else {
            None
        };
        if let Some(idx) = fallback {
            warn!(
                granularity = %self.level,
                column = own,
                fallback = plant_fallback,
                "level column absent, using plant-level data source"
            );
            return Ok((idx, plant_fallback));
        }
        Err(self.missing(own))
    }

    fn missing(&self, column: &str) -> AvailabilityError {
        AvailabilityError::MissingColumn {
            column: column.to_string(),
            level: self.level.as_str(),
        }
    }
}

/// Column positions a layout resolved against one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub timestamp: usize,
    pub power: usize,
    /// Name of the column actually used for power (may be a fallback).
    pub power_column: &'static str,
    pub irradiance: usize,
    pub irradiance_column: &'static str,
    pub plant: Option<usize>,
    pub inverter: Option<usize>,
    pub mppt: Option<usize>,
    pub string: Option<usize>,
    pub configured: Option<usize>,
}

/// Typed rows projected from a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub rows: Vec<TelemetryRow>,
    pub dropped_timestamps: usize,
    pub columns: ResolvedColumns,
}

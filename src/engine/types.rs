//! Core engine types: parameters, per-row data, groups, and output records.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ConfigurationError;

use super::formula::Formula;
use super::level::Level;

/// Default irradiance threshold (kW/m²) above which a plant could produce.
pub const DEFAULT_IRRADIANCE_THRESHOLD: f64 = 0.05;

/// Default power threshold; a reading must exceed it to count as operational.
pub const DEFAULT_POWER_THRESHOLD: f64 = 0.0;

/// Marker written in place of a percentage when no potential time exists.
pub const UNAVAILABLE_MARKER: &str = "Data Unavailable";

/// Parameters for one engine invocation.
///
/// Passed explicitly into every call so concurrent per-plant invocations
/// with different thresholds stay independent.
///
/// # Examples
///
/// ```
/// use plant_availability::engine::formula::Formula;
/// use plant_availability::engine::level::Level;
/// use plant_availability::engine::types::CalculationParams;
///
/// let params = CalculationParams::new(Level::String, Formula::A);
/// assert_eq!(params.irradiance_threshold, 0.05);
/// assert_eq!(params.power_threshold, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CalculationParams {
    pub level: Level,
    pub formula: Formula,
    /// Irradiance (kW/m²) a reading must exceed to count as potential time.
    pub irradiance_threshold: f64,
    /// Power a potential reading must exceed to count as operational time.
    pub power_threshold: f64,
}

impl CalculationParams {
    /// Creates parameters with the default thresholds.
    pub fn new(level: Level, formula: Formula) -> Self {
        Self {
            level,
            formula,
            irradiance_threshold: DEFAULT_IRRADIANCE_THRESHOLD,
            power_threshold: DEFAULT_POWER_THRESHOLD,
        }
    }

    pub fn with_irradiance_threshold(mut self, threshold: f64) -> Self {
        self.irradiance_threshold = threshold;
        self
    }

    pub fn with_power_threshold(mut self, threshold: f64) -> Self {
        self.power_threshold = threshold;
        self
    }

    /// Rejects non-finite or negative thresholds.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for (name, value) in [
            ("irradiance_threshold", self.irradiance_threshold),
            ("power_threshold", self.power_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigurationError::InvalidThreshold { name, value });
            }
        }
        Ok(())
    }
}

/// One reading instant for one entity, projected out of a telemetry table.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRow {
    pub timestamp: NaiveDateTime,
    pub plant_id: String,
    pub inverter_sn: Option<String>,
    pub mppt_index: Option<String>,
    pub string_index: Option<String>,
    /// Power reading; unit depends on the level (NaN if unreadable).
    pub power: f64,
    /// Irradiance in kW/m² (NaN if unreadable).
    pub irradiance: f64,
    /// Provisioning flag, only read at string level.
    pub configured: Option<bool>,
}

impl TelemetryRow {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// A telemetry row with its operational conditions and weights.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedRow {
    pub row: TelemetryRow,
    /// Grouping entity; `None` at plant level.
    pub entity_id: Option<String>,
    /// Irradiance above threshold, regardless of power.
    pub is_potential_denominator: bool,
    /// Potential and producing power.
    pub is_operational_numerator: bool,
    /// Irradiance when potential, else 0.
    pub weight: f64,
    /// Irradiance when operational, else 0.
    pub weighted_numerator: f64,
}

/// Aggregation key: date first, then entity (absent at plant level).
pub type GroupKey = (NaiveDate, Option<String>);

/// Summed contributions for one (date, entity) group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AggregateGroup {
    pub numerator_count: u32,
    pub denominator_count: u32,
    pub weight_sum: f64,
    pub weighted_numerator_sum: f64,
}

impl AggregateGroup {
    /// Adds one evaluated row's contributions.
    pub fn add(&mut self, row: &EvaluatedRow) {
        self.numerator_count += u32::from(row.is_operational_numerator);
        self.denominator_count += u32::from(row.is_potential_denominator);
        self.weight_sum += row.weight;
        self.weighted_numerator_sum += row.weighted_numerator;
    }
}

/// Daily availability: a percentage or the "no potential time" sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Availability {
    /// Percentage in [0, 100], rounded to two decimals.
    Percent(f64),
    /// The denominator was zero; nothing to compute from.
    Unavailable,
}

impl Availability {
    pub fn percent(&self) -> Option<f64> {
        match self {
            Self::Percent(p) => Some(*p),
            Self::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percent(p) => write!(f, "{p:.2}"),
            Self::Unavailable => f.write_str(UNAVAILABLE_MARKER),
        }
    }
}

/// Final output row.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityRecord {
    pub date: NaiveDate,
    /// `None` at plant level.
    pub entity_id: Option<String>,
    /// Operational count (A) or actual weight (B).
    pub numerator: f64,
    /// Potential count (A) or potential weight (B).
    pub denominator: f64,
    pub availability: Availability,
}

/// Result of one engine invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Calculation {
    /// One record per (date, entity), ascending.
    pub records: Vec<AvailabilityRecord>,
    /// Every row that took part in aggregation, in input order.
    pub diagnostics: Vec<EvaluatedRow>,
    /// Power column the readings were taken from (a plant-level fallback
    /// when the level shares the plant source).
    pub power_column: &'static str,
    /// Irradiance column the readings were taken from.
    pub irradiance_column: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_validate() {
        let params = CalculationParams::new(Level::Plant, Formula::A);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn negative_threshold_rejected() {
        let params = CalculationParams::new(Level::Plant, Formula::A).with_irradiance_threshold(-0.1);
        assert_eq!(
            params.validate(),
            Err(ConfigurationError::InvalidThreshold {
                name: "irradiance_threshold",
                value: -0.1
            })
        );
    }

    #[test]
    fn nan_power_threshold_rejected() {
        let params = CalculationParams::new(Level::Plant, Formula::B).with_power_threshold(f64::NAN);
        assert!(params.validate().is_err());
    }

    #[test]
    fn availability_display() {
        assert_eq!(Availability::Percent(91.67).to_string(), "91.67");
        assert_eq!(Availability::Percent(100.0).to_string(), "100.00");
        assert_eq!(Availability::Unavailable.to_string(), "Data Unavailable");
    }
}

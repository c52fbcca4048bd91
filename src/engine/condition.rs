//! Per-row operational conditions and weights.

use super::types::{CalculationParams, EvaluatedRow, TelemetryRow};

/// Evaluates one row against the configured thresholds.
///
/// A row is *potential* when irradiance exceeds the irradiance threshold and
/// *operational* when it is potential and power exceeds the power threshold.
/// Weights carry the irradiance only while their condition holds, so the
/// operational set is always a subset of the potential set.
///
/// # Arguments
///
/// * `row` - Projected telemetry reading
/// * `entity_id` - Grouping entity resolved for this row (`None` at plant level)
/// * `params` - Thresholds for this invocation
pub fn evaluate(
    row: TelemetryRow,
    entity_id: Option<String>,
    params: &CalculationParams,
) -> EvaluatedRow {
    let is_potential_denominator = row.irradiance > params.irradiance_threshold;
    let is_operational_numerator = is_potential_denominator && row.power > params.power_threshold;

    let weight = if is_potential_denominator {
        row.irradiance
    } else {
        0.0
    };
    let weighted_numerator = if is_operational_numerator {
        row.irradiance
    } else {
        0.0
    };

    EvaluatedRow {
        row,
        entity_id,
        is_potential_denominator,
        is_operational_numerator,
        weight,
        weighted_numerator,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::engine::formula::Formula;
    use crate::engine::level::Level;

    fn reading(power: f64, irradiance: f64) -> TelemetryRow {
        TelemetryRow {
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 1)
                .and_then(|d| d.and_hms_opt(11, 0, 0))
                .unwrap_or_default(),
            plant_id: "Metro".to_string(),
            inverter_sn: None,
            mppt_index: None,
            string_index: None,
            power,
            irradiance,
            configured: None,
        }
    }

    fn params() -> CalculationParams {
        CalculationParams::new(Level::Plant, Formula::A)
    }

    #[test]
    fn producing_in_sunlight_is_operational() {
        let row = evaluate(reading(40.0, 0.6), None, &params());
        assert!(row.is_potential_denominator);
        assert!(row.is_operational_numerator);
        assert_eq!(row.weight, 0.6);
        assert_eq!(row.weighted_numerator, 0.6);
    }

    #[test]
    fn idle_in_sunlight_is_potential_only() {
        let row = evaluate(reading(0.0, 0.6), None, &params());
        assert!(row.is_potential_denominator);
        assert!(!row.is_operational_numerator);
        assert_eq!(row.weight, 0.6);
        assert_eq!(row.weighted_numerator, 0.0);
    }

    #[test]
    fn threshold_is_exclusive() {
        let row = evaluate(reading(40.0, 0.05), None, &params());
        assert!(!row.is_potential_denominator);
        assert!(!row.is_operational_numerator);
        assert_eq!(row.weight, 0.0);
    }

    #[test]
    fn power_at_night_does_not_count() {
        let row = evaluate(reading(5.0, 0.0), None, &params());
        assert!(!row.is_operational_numerator);
        assert_eq!(row.weighted_numerator, 0.0);
    }

    #[test]
    fn unreadable_values_never_count() {
        let row = evaluate(reading(f64::NAN, 0.7), None, &params());
        assert!(row.is_potential_denominator);
        assert!(!row.is_operational_numerator);

        let row = evaluate(reading(10.0, f64::NAN), None, &params());
        assert!(!row.is_potential_denominator);
        assert_eq!(row.weight, 0.0);
    }

    #[test]
    fn power_threshold_raises_the_bar() {
        let p = params().with_power_threshold(2.0);
        assert!(!evaluate(reading(1.5, 0.7), None, &p).is_operational_numerator);
        assert!(evaluate(reading(2.5, 0.7), None, &p).is_operational_numerator);
    }
}

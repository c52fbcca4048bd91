//! Availability formulas and degenerate-group resolution.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::error::ConfigurationError;

use super::types::{AggregateGroup, Availability, AvailabilityRecord};

/// Strategy turning an aggregate group into an availability figure.
///
/// Implementors pick which pair of sums forms the ratio; the shared
/// [`availability`](AvailabilityFormula::availability) method handles
/// scaling, rounding and the zero-denominator sentinel.
pub trait AvailabilityFormula {
    /// Operational side of the ratio.
    fn numerator(&self, group: &AggregateGroup) -> f64;

    /// Potential side of the ratio.
    fn denominator(&self, group: &AggregateGroup) -> f64;

    /// Output column names for (numerator, denominator).
    fn column_names(&self) -> (&'static str, &'static str);

    /// Percentage of potential time that was operational.
    fn availability(&self, group: &AggregateGroup) -> Availability {
        resolve_ratio(self.numerator(group), self.denominator(group))
    }
}

/// Formula A: operational readings over potential readings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimeBased;

impl AvailabilityFormula for TimeBased {
    fn numerator(&self, group: &AggregateGroup) -> f64 {
        f64::from(group.numerator_count)
    }

    fn denominator(&self, group: &AggregateGroup) -> f64 {
        f64::from(group.denominator_count)
    }

    fn column_names(&self) -> (&'static str, &'static str) {
        ("Condition_Numerator", "Condition_Denominator")
    }
}

/// Formula B: operational irradiance over potential irradiance.
#[derive(Debug, Default, Clone, Copy)]
pub struct IrradianceWeighted;

impl AvailabilityFormula for IrradianceWeighted {
    fn numerator(&self, group: &AggregateGroup) -> f64 {
        group.weighted_numerator_sum
    }

    fn denominator(&self, group: &AggregateGroup) -> f64 {
        group.weight_sum
    }

    fn column_names(&self) -> (&'static str, &'static str) {
        ("Actual_Weight", "Potential_Weight")
    }
}

/// Formula selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Formula {
    /// Time-based ratio.
    #[default]
    A,
    /// Irradiance-weighted ratio.
    B,
}

impl Formula {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
        }
    }

    /// The strategy this selector stands for.
    pub fn strategy(&self) -> &'static dyn AvailabilityFormula {
        match self {
            Self::A => &TimeBased,
            Self::B => &IrradianceWeighted,
        }
    }

    /// Builds the output record for one group.
    ///
    /// Degenerate groups (zero denominator) carry the sentinel and emit 0/0.
    pub fn record(
        &self,
        date: NaiveDate,
        entity_id: Option<String>,
        group: &AggregateGroup,
    ) -> AvailabilityRecord {
        let strategy = self.strategy();
        let availability = strategy.availability(group);
        let (numerator, denominator) = if availability.is_unavailable() {
            (0.0, 0.0)
        } else {
            (strategy.numerator(group), strategy.denominator(group))
        };
        AvailabilityRecord {
            date,
            entity_id,
            numerator,
            denominator,
            availability,
        }
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Formula {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            _ => Err(ConfigurationError::InvalidFormula(s.to_string())),
        }
    }
}

/// Edge-case resolver: a zero (or unusable) denominator yields the sentinel,
/// anything else a percentage rounded to two decimals within [0, 100].
pub fn resolve_ratio(numerator: f64, denominator: f64) -> Availability {
    if !denominator.is_finite() || denominator <= 0.0 || !numerator.is_finite() {
        return Availability::Unavailable;
    }
    let pct = (100.0 * numerator / denominator).clamp(0.0, 100.0);
    Availability::Percent((pct * 100.0).round() / 100.0)
}

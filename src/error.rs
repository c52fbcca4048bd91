//! Error taxonomy for availability calculations.

use thiserror::Error;

/// Invalid calculation parameters. Always fatal, never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("unknown level \"{0}\", expected one of: plant, inverter, mppt, string")]
    UnknownLevel(String),

    #[error("invalid formula \"{0}\", expected \"A\" or \"B\"")]
    InvalidFormula(String),

    #[error("invalid {name}: {value} (must be a finite, non-negative number)")]
    InvalidThreshold { name: &'static str, value: f64 },
}

/// Failure of a single engine invocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AvailabilityError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("no {level}-level data for plant \"{plant}\"")]
    EmptyInput { plant: String, level: &'static str },

    #[error("missing column \"{column}\" required at {level} level")]
    MissingColumn { column: String, level: &'static str },
}

impl AvailabilityError {
    /// True when the caller may log and move on to the next plant.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::EmptyInput { .. })
    }
}

pub type Result<T> = std::result::Result<T, AvailabilityError>;

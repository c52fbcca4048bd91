//! TOML-based run configuration.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::formula::Formula;
use crate::engine::level::Level;
use crate::engine::types::{CalculationParams, DEFAULT_IRRADIANCE_THRESHOLD, DEFAULT_POWER_THRESHOLD};
use crate::error::ConfigurationError;
use crate::runner::PlantSource;

/// Top-level run configuration parsed from TOML.
///
/// All fields have defaults; an empty file is a valid plant-level,
/// formula-A run with no inputs. Load from TOML with
/// [`RunConfig::from_toml_file`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Level, formula and thresholds.
    #[serde(default)]
    pub calculation: CalculationConfig,
    /// Plant telemetry sources.
    #[serde(default)]
    pub input: InputConfig,
    /// Result and diagnostic destinations.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Calculation knobs read by the engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalculationConfig {
    /// `"plant"`, `"inverter"`, `"mppt"` or `"string"`.
    pub level: String,
    /// `"A"` (time-based) or `"B"` (irradiance-weighted).
    pub formula: String,
    /// Irradiance threshold (kW/m²).
    pub irradiance_threshold: f64,
    /// Power a reading must exceed to count as operational.
    pub power_threshold: f64,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        Self {
            level: Level::Plant.as_str().to_string(),
            formula: Formula::A.as_str().to_string(),
            irradiance_threshold: DEFAULT_IRRADIANCE_THRESHOLD,
            power_threshold: DEFAULT_POWER_THRESHOLD,
        }
    }
}

/// Plant telemetry sources.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    /// Directory scanned for `*.csv` files, one per plant.
    pub directory: Option<PathBuf>,
    /// Explicitly listed plants.
    pub plants: Vec<PlantSource>,
}

/// Result and diagnostic destinations.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Combined results file; derived from plants, level and formula if unset.
    pub results: Option<PathBuf>,
    /// Directory for per-plant diagnostic CSVs; none written if unset.
    pub diagnostics_dir: Option<PathBuf>,
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"calculation.level"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl RunConfig {
    /// Parses a run configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "config".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a run configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let c = &self.calculation;

        if let Err(e) = c.level.parse::<Level>() {
            errors.push(ConfigError {
                field: "calculation.level".into(),
                message: e.to_string(),
            });
        }
        if let Err(e) = c.formula.parse::<Formula>() {
            errors.push(ConfigError {
                field: "calculation.formula".into(),
                message: e.to_string(),
            });
        }
        if !c.irradiance_threshold.is_finite() || c.irradiance_threshold < 0.0 {
            errors.push(ConfigError {
                field: "calculation.irradiance_threshold".into(),
                message: "must be a finite number >= 0".into(),
            });
        }
        if !c.power_threshold.is_finite() || c.power_threshold < 0.0 {
            errors.push(ConfigError {
                field: "calculation.power_threshold".into(),
                message: "must be a finite number >= 0".into(),
            });
        }

        for (i, plant) in self.input.plants.iter().enumerate() {
            if plant.name.trim().is_empty() {
                errors.push(ConfigError {
                    field: format!("input.plants[{i}].name"),
                    message: "must not be empty".into(),
                });
            }
        }

        errors
    }

    /// Typed engine parameters.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigurationError` among level, formula and thresholds.
    pub fn calculation_params(&self) -> Result<CalculationParams, ConfigurationError> {
        let c = &self.calculation;
        let params = CalculationParams::new(c.level.parse()?, c.formula.parse()?)
            .with_irradiance_threshold(c.irradiance_threshold)
            .with_power_threshold(c.power_threshold);
        params.validate()?;
        Ok(params)
    }
}

impl OutputConfig {
    /// Results path: the configured one, or
    /// `{plants}_{level}_{formula}_availability.csv`.
    ///
    /// `{plants}` is `all_plants` for a discovered directory, `multiple_plants`
    /// for several listed plants, otherwise the single plant's name with
    /// spaces replaced by underscores.
    pub fn results_path(
        &self,
        plant_names: &[String],
        discovered: bool,
        params: &CalculationParams,
    ) -> PathBuf {
        if let Some(path) = &self.results {
            return path.clone();
        }
        let plant_part = match plant_names {
            _ if discovered => "all_plants".to_string(),
            [single] => single.replace(' ', "_"),
            _ => "multiple_plants".to_string(),
        };
        PathBuf::from(format!(
            "{plant_part}_{}_{}_availability.csv",
            params.level, params.formula
        ))
    }
}

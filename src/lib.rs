//! Daily operational-availability calculation for solar plants.

pub mod cli;
pub mod config;
/// Availability engine: level resolution, conditions, aggregation, formulas.
pub mod engine;
pub mod error;
/// CSV input and output.
pub mod io;
pub mod runner;
pub mod table;

pub use error::{AvailabilityError, ConfigurationError};

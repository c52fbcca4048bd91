/// Daily grouping of evaluated rows.
pub mod aggregate;
pub mod condition;
pub mod dispatch;
/// Formula strategies and the zero-denominator sentinel.
pub mod formula;
/// Level column layouts and row projection.
pub mod level;
pub mod summary;
pub mod types;

pub use dispatch::calculate;
pub use formula::Formula;
pub use level::Level;
pub use types::{Availability, AvailabilityRecord, CalculationParams, Calculation, EvaluatedRow};

//! Post-hoc summary statistics over availability records.

use std::fmt;

use super::types::AvailabilityRecord;

/// Overview of one calculation's records.
///
/// Computed from the final records so the summary can never disagree with
/// what gets written out. Sentinel records count toward the total but not
/// toward the mean, min, or max.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilitySummary {
    /// Number of (date, entity) records.
    pub total_records: usize,
    /// Records with a numeric availability.
    pub numeric_records: usize,
    /// Records carrying the "Data Unavailable" sentinel.
    pub unavailable_records: usize,
    /// Mean of numeric availabilities (%), `None` when there are none.
    pub mean_pct: Option<f64>,
    pub min_pct: Option<f64>,
    pub max_pct: Option<f64>,
}

impl AvailabilitySummary {
    pub fn from_records(records: &[AvailabilityRecord]) -> Self {
        let values: Vec<f64> = records
            .iter()
            .filter_map(|r| r.availability.percent())
            .collect();

        let (mean_pct, min_pct, max_pct) = if values.is_empty() {
            (None, None, None)
        } else {
            let sum: f64 = values.iter().sum();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            (Some(sum / values.len() as f64), Some(min), Some(max))
        };

        Self {
            total_records: records.len(),
            numeric_records: values.len(),
            unavailable_records: records.len() - values.len(),
            mean_pct,
            min_pct,
            max_pct,
        }
    }
}

impl fmt::Display for AvailabilitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} records", self.total_records)?;
        if let (Some(mean), Some(min), Some(max)) = (self.mean_pct, self.min_pct, self.max_pct) {
            write!(f, " | Avg: {mean:.1}% | Range: {min:.1}%-{max:.1}%")?;
        }
        if self.unavailable_records > 0 {
            write!(f, " | {} without potential time", self.unavailable_records)?;
        }
        Ok(())
    }
}

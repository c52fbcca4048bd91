//! Flattened telemetry table handed to the engine by the fetch/flatten layer.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Column-named table of raw string cells.
///
/// Cells stay untyped until a level layout projects them into
/// [`TelemetryRow`](crate::engine::types::TelemetryRow)s, so the same table
/// can be fed to any level.
///
/// # Examples
///
/// ```
/// use plant_availability::table::TelemetryTable;
///
/// let mut table = TelemetryTable::new(["timestamp", "radiation_intensity"]);
/// table.push_record(["2024-06-01 10:00:00", "0.42"]);
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.column_index("radiation_intensity"), Some(1));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryTable {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl TelemetryTable {
    /// Creates an empty table with the given column names.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    /// Appends one record.
    ///
    /// Short records are padded with empty cells and surplus cells are
    /// dropped, so every stored record has exactly one cell per header.
    pub fn push_record<I, S>(&mut self, record: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells: Vec<String> = record
            .into_iter()
            .take(self.headers.len())
            .map(Into::into)
            .collect();
        cells.resize(self.headers.len(), String::new());
        self.records.push(cells);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Position of the first column named `name`.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn records(&self) -> impl Iterator<Item = &[String]> {
        self.records.iter().map(Vec::as_slice)
    }
}

/// Coerces a cell to a number; anything unparseable or non-finite
/// (`inf`, `NaN`) becomes NaN.
///
/// NaN fails every `>` comparison, so a garbled reading never counts as
/// potential or operational time.
pub fn parse_numeric(cell: &str) -> f64 {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

/// Parses a reading timestamp.
///
/// Accepts RFC 3339 (offset dropped, wall-clock kept), `YYYY-MM-DD HH:MM[:SS]`
/// with either a space or `T`, the hourly `YYYY-MM-DD HH` bucket form, and a
/// bare date (midnight).
pub fn parse_timestamp(cell: &str) -> Option<NaiveDateTime> {
    let cell = cell.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.naive_local());
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cell, format) {
            return Some(dt);
        }
    }
    if let Some((date, hour)) = cell.split_once(' ') {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        let hour = hour.trim().parse::<u32>().ok()?;
        return date.and_hms_opt(hour, 0, 0);
    }
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Interprets a provisioning flag cell (`1`, `1.0`, `true`, `yes`).
pub fn parse_flag(cell: &str) -> bool {
    let cell = cell.trim();
    if cell.eq_ignore_ascii_case("true") || cell.eq_ignore_ascii_case("yes") {
        return true;
    }
    cell.parse::<f64>().is_ok_and(|v| v == 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_records_are_padded() {
        let mut table = TelemetryTable::new(["a", "b", "c"]);
        table.push_record(["1"]);
        let first = table.records().next().map(<[String]>::to_vec);
        assert_eq!(
            first,
            Some(vec!["1".to_string(), String::new(), String::new()])
        );
    }

    #[test]
    fn surplus_cells_are_dropped() {
        let mut table = TelemetryTable::new(["a"]);
        table.push_record(["1", "2", "3"]);
        assert_eq!(table.records().next().map(<[String]>::len), Some(1));
    }

    #[test]
    fn numeric_coercion_falls_back_to_nan() {
        assert_eq!(parse_numeric(" 0.25 "), 0.25);
        assert!(parse_numeric("").is_nan());
        assert!(parse_numeric("n/a").is_nan());
    }

    #[test]
    fn infinite_readings_are_treated_as_garbled() {
        assert!(parse_numeric("inf").is_nan());
        assert!(parse_numeric("-Infinity").is_nan());
        assert!(parse_numeric("NaN").is_nan());
        assert_eq!(parse_numeric("1e3"), 1000.0);
    }

    #[test]
    fn timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1).and_then(|d| d.and_hms_opt(13, 0, 0));
        assert_eq!(parse_timestamp("2024-06-01 13:00:00"), expected);
        assert_eq!(parse_timestamp("2024-06-01T13:00:00"), expected);
        assert_eq!(parse_timestamp("2024-06-01 13:00"), expected);
        assert_eq!(parse_timestamp("2024-06-01 13"), expected);
        assert_eq!(parse_timestamp("2024-06-01T13:00:00+05:00"), expected);
    }

    #[test]
    fn bare_date_is_midnight() {
        let midnight = NaiveDate::from_ymd_opt(2024, 6, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
        assert_eq!(parse_timestamp("2024-06-01"), midnight);
    }

    #[test]
    fn garbage_timestamp_is_none() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-06-01 25"), None);
    }

    #[test]
    fn flag_accepts_numeric_and_boolean_forms() {
        assert!(parse_flag("1"));
        assert!(parse_flag("1.0"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("2"));
    }
}

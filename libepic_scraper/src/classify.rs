use super::table::SeriesTable;

/// Column-name fragments identifying pressure channels (ion gauges,
/// Bayard-Alpert MIGs, Penning gauges).
pub const PRESSURE_PATTERNS: &[&str] = &["IG", "MIG", "PG"];
/// Column-name fragments identifying temperature channels (PID loops and
/// pyrometers).
pub const TEMPERATURE_PATTERNS: &[&str] = &["PID", "Pyro"];

/// What kind of series a log file holds, decided once from its column names
/// and count and threaded through the pipeline from there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesClass {
    /// Reduced on relative change
    PressureLike,
    /// Reduced on absolute change
    TemperatureLike,
    /// Wide text-bearing table (event log, shutter states); carries the
    /// data column count since time-based aggregation dispatches on it
    CategoricalLog(usize),
    Unclassified,
}

/// Classify a series by case-sensitive substring match on its column names,
/// first match wins. Sampling preserves column names and count, so a series
/// classifies the same before and after reduction.
pub fn classify(table: &SeriesTable) -> SeriesClass {
    if table.any_column_contains(PRESSURE_PATTERNS) {
        return SeriesClass::PressureLike;
    }
    if table.any_column_contains(TEMPERATURE_PATTERNS) {
        return SeriesClass::TemperatureLike;
    }
    if table.column_count() >= 3 {
        return SeriesClass::CategoricalLog(table.column_count());
    }
    SeriesClass::Unclassified
}

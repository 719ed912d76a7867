use super::table::{Cell, SeriesTable};

/// How two numeric samples are compared. Pressure gauges span decades, so
/// their channels are reduced on relative (fractional) change; thermocouple
/// and pyrometer channels are reduced on absolute difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeMode {
    Relative,
    Absolute,
}

impl ChangeMode {
    fn change(&self, value: f64, baseline: f64) -> f64 {
        match self {
            ChangeMode::Relative => (value - baseline) / baseline,
            ChangeMode::Absolute => value - baseline,
        }
    }
}

/// The threshold the orchestrator applies before accumulated sampling.
/// Low on purpose: it thins the row count enough to keep the row-by-row
/// accumulated pass cheap without discarding real structure.
pub const PRE_SAMPLE_THRESHOLD: f64 = 0.01;

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Retain only rows that differ enough from the immediately preceding row.
///
/// Per column the change against the previous raw row is computed in the
/// given mode. A row is retained when at least one column changed at all and
/// the magnitude of the change in the primary (first) column reaches
/// `threshold_value`. A change that cannot be computed is substituted with
/// `threshold_value + 1`, which is why the first row, whose change is
/// undefined, always passes.
///
/// The output carries the original value columns only; an input where no row
/// reaches the threshold yields an empty table, which is valid.
pub fn threshold_sampling(
    table: &SeriesTable,
    mode: ChangeMode,
    threshold_value: f64,
) -> SeriesTable {
    let mut sampled = SeriesTable::new(table.columns.clone());
    let sentinel = threshold_value + 1.0;
    for (index, row) in table.rows.iter().enumerate() {
        let changes: Vec<Option<f64>> = if index == 0 {
            vec![None; row.cells.len()]
        } else {
            let previous = &table.rows[index - 1];
            row.cells
                .iter()
                .zip(previous.cells.iter())
                .map(|(cell, prev)| match (cell.as_number(), prev.as_number()) {
                    (Some(value), Some(base)) => Some(mode.change(value, base)),
                    _ => None,
                })
                .collect()
        };

        let any_nonzero = changes.iter().any(|change| change.map_or(true, |v| v != 0.0));
        let primary = changes.first().copied().flatten().unwrap_or(sentinel);
        if any_nonzero && primary.abs() >= threshold_value {
            sampled.push_row(row.timestamp, row.cells.clone());
        }
    }
    sampled
}

/// Retain rows whose primary value drifted enough from the last *retained*
/// row.
///
/// Comparing adjacent rows alone misses slow monotonic drift: a channel
/// stepping 10.1, 10.2, 10.3, ... never trips a 2% adjacent-row threshold
/// even though it walks arbitrarily far. Here the baseline is the last row
/// that was kept, so cumulative drift is caught exactly when it crosses the
/// threshold.
///
/// The first input row is always retained as the seed baseline. Relative
/// mode compares the percent change rounded to one decimal; absolute mode
/// the rounded difference. Rows without a usable primary value are dropped.
pub fn accumulated_sampling(
    table: &SeriesTable,
    mode: ChangeMode,
    threshold_value: f64,
) -> SeriesTable {
    // Some EPIC logs are empty; nothing to seed the baseline with.
    if table.is_empty() {
        return table.clone();
    }

    let mut sampled = SeriesTable::new(table.columns.clone());
    let seed = &table.rows[0];
    sampled.push_row(seed.timestamp, seed.cells.clone());
    let mut baseline = seed.cells.first().and_then(Cell::as_number);

    for row in table.rows.iter().skip(1) {
        let value = match row.cells.first().and_then(Cell::as_number) {
            Some(value) => value,
            None => continue,
        };
        let base = match baseline {
            Some(base) => base,
            None => continue,
        };
        let magnitude = match mode {
            ChangeMode::Relative => round_one_decimal((mode.change(value, base) * 100.0).abs()),
            ChangeMode::Absolute => round_one_decimal(mode.change(value, base).abs()),
        };
        if magnitude >= threshold_value {
            sampled.push_row(row.timestamp, row.cells.clone());
            baseline = Some(value);
        }
    }
    sampled
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use time::Duration;

    fn pressure_table(values: &[f64]) -> SeriesTable {
        let mut table = SeriesTable::new(vec![String::from("MIG_2")]);
        let start = datetime!(2024-03-02 10:00:00);
        for (index, value) in values.iter().enumerate() {
            table.push_row(
                start + Duration::seconds(index as i64),
                vec![Cell::Number(*value)],
            );
        }
        table
    }

    fn primary_values(table: &SeriesTable) -> Vec<f64> {
        table
            .rows
            .iter()
            .map(|row| row.cells[0].as_number().unwrap())
            .collect()
    }

    #[test]
    fn test_threshold_first_row_always_passes() {
        let table = pressure_table(&[5.0, 5.0, 5.0]);
        let sampled = threshold_sampling(&table, ChangeMode::Relative, 0.01);
        // Repeated values never change, so only the sentinel row survives
        assert_eq!(primary_values(&sampled), vec![5.0]);
        assert_eq!(sampled.rows[0].timestamp, table.rows[0].timestamp);
    }

    #[test]
    fn test_threshold_relative() {
        let table = pressure_table(&[10.0, 10.001, 12.0, 12.0]);
        let sampled = threshold_sampling(&table, ChangeMode::Relative, 0.01);
        // 10.001 is a 0.01% step, 12.0 is ~20%; the trailing repeat is zero change
        assert_eq!(primary_values(&sampled), vec![10.0, 12.0]);
    }

    #[test]
    fn test_threshold_absolute() {
        let table = pressure_table(&[700.0, 700.05, 703.0, 700.0]);
        let sampled = threshold_sampling(&table, ChangeMode::Absolute, 0.2);
        // The downward step must count too
        assert_eq!(primary_values(&sampled), vec![700.0, 703.0, 700.0]);
    }

    #[test]
    fn test_threshold_monotonicity() {
        let table = pressure_table(&[1.0, 1.2, 1.5, 1.9, 2.4, 3.0]);
        let mut previous_len = usize::MAX;
        for threshold in [0.0, 0.05, 0.1, 0.2, 0.5] {
            let sampled = threshold_sampling(&table, ChangeMode::Relative, threshold);
            assert!(sampled.rows.len() <= previous_len);
            previous_len = sampled.rows.len();
        }
    }

    #[test]
    fn test_threshold_empty_input() {
        let table = pressure_table(&[]);
        let sampled = threshold_sampling(&table, ChangeMode::Relative, 0.01);
        assert!(sampled.is_empty());
        assert_eq!(sampled.columns, table.columns);
    }

    #[test]
    fn test_accumulated_seed_invariant() {
        let table = pressure_table(&[42.0, 42.0, 42.0]);
        let sampled = accumulated_sampling(&table, ChangeMode::Absolute, 1000.0);
        assert_eq!(sampled.rows[0], table.rows[0]);
        assert_eq!(sampled.rows.len(), 1);
    }

    #[test]
    fn test_accumulated_catches_slow_drift() {
        // 2% relative cut: 10.05 is 0.5% from the seed, 10.5 is 5% and
        // becomes the new baseline, 11.0 is ~4.8% from 10.5
        let table = pressure_table(&[10.0, 10.05, 10.5, 11.0]);
        let sampled = accumulated_sampling(&table, ChangeMode::Relative, 2.0);
        assert_eq!(primary_values(&sampled), vec![10.0, 10.5, 11.0]);
    }

    #[test]
    fn test_accumulated_absolute() {
        let table = pressure_table(&[700.0, 700.1, 700.16, 700.3]);
        let sampled = accumulated_sampling(&table, ChangeMode::Absolute, 0.2);
        // 700.16 is 0.2 away from 700.0 once rounded to one decimal
        assert_eq!(primary_values(&sampled), vec![700.0, 700.16]);
    }

    #[test]
    fn test_accumulated_empty_returned_unchanged() {
        let table = pressure_table(&[]);
        let sampled = accumulated_sampling(&table, ChangeMode::Relative, 2.0);
        assert_eq!(sampled, table);
    }

    #[test]
    fn test_accumulated_drops_unusable_rows() {
        let mut table = pressure_table(&[10.0, 20.0]);
        table.push_row(
            datetime!(2024-03-02 10:00:02),
            vec![Cell::Text(String::from("n/a"))],
        );
        let sampled = accumulated_sampling(&table, ChangeMode::Relative, 2.0);
        assert_eq!(primary_values(&sampled), vec![10.0, 20.0]);
    }
}

use time::Duration;

use super::classify::{classify, SeriesClass};
use super::config::Config;
use super::error::ResampleError;
use super::sampler::{
    accumulated_sampling, threshold_sampling, ChangeMode, PRE_SAMPLE_THRESHOLD,
};
use super::table::{Cell, LogSeries, SeriesTable};
use super::timestamp::{floor_to_period, parse_period};

/// How cells are folded into a time bucket.
enum Aggregate {
    /// Last valid value in the bucket (event logs, shutter states)
    Last,
    /// Arithmetic mean of the numeric values in the bucket
    Mean,
}

/// Aggregate a table into contiguous fixed-width time buckets labeled by
/// bucket start. Buckets without rows are emitted with Empty cells so that a
/// later forward-fill can persist state through them.
fn aggregate_by_period(table: &SeriesTable, period: Duration, agg: Aggregate) -> SeriesTable {
    let mut bucketed = SeriesTable::new(table.columns.clone());
    if table.is_empty() {
        return bucketed;
    }

    let column_count = table.column_count();
    let last_stamp = table.rows[table.rows.len() - 1].timestamp;
    let mut bucket_start = floor_to_period(table.rows[0].timestamp, period);
    let mut row_index = 0;

    loop {
        let bucket_end = bucket_start + period;
        let mut cells: Vec<Cell> = vec![Cell::Empty; column_count];
        let mut sums = vec![(0.0_f64, 0_u32); column_count];

        while row_index < table.rows.len() && table.rows[row_index].timestamp < bucket_end {
            let row = &table.rows[row_index];
            for (column, cell) in row.cells.iter().enumerate() {
                match agg {
                    Aggregate::Last => {
                        if !cell.is_empty() {
                            cells[column] = cell.clone();
                        }
                    }
                    Aggregate::Mean => {
                        if let Some(value) = cell.as_number() {
                            sums[column].0 += value;
                            sums[column].1 += 1;
                        }
                    }
                }
            }
            row_index += 1;
        }

        if let Aggregate::Mean = agg {
            for (column, (sum, count)) in sums.iter().enumerate() {
                if *count > 0 {
                    cells[column] = Cell::Number(sum / f64::from(*count));
                }
            }
        }

        bucketed.push_row(bucket_start, cells);
        if bucket_end > last_stamp {
            break;
        }
        bucket_start = bucket_end;
    }
    bucketed
}

/// Carry the last seen value of each column into empty cells below it.
/// Shutter states persist until the next transition, so an empty bucket
/// means "unchanged", not "unknown".
fn forward_fill(table: &mut SeriesTable) {
    let column_count = table.column_count();
    let mut carried: Vec<Cell> = vec![Cell::Empty; column_count];
    for row in &mut table.rows {
        for (column, cell) in row.cells.iter_mut().enumerate() {
            if cell.is_empty() {
                *cell = carried[column].clone();
            } else {
                carried[column] = cell.clone();
            }
        }
    }
}

/// Reduce one series according to the configured method.
///
/// Change-based mode ("diff") runs the threshold and accumulated samplers,
/// and only on narrow series (timestamp plus one or two data columns);
/// wide categorical logs pass through untouched. Time-based mode buckets
/// every series over `resampling_period`: the 3-column event log and the
/// 11-column shutter table keep the last value per bucket (the latter
/// forward-filled), everything else is averaged.
pub fn resample_series(series: &LogSeries, config: &Config) -> Result<LogSeries, ResampleError> {
    let class = classify(&series.table);

    if config.is_change_based() {
        if series.table.column_count() < 3 {
            match class {
                SeriesClass::PressureLike => {
                    let thinned = threshold_sampling(
                        &series.table,
                        ChangeMode::Relative,
                        PRE_SAMPLE_THRESHOLD,
                    );
                    let sampled =
                        accumulated_sampling(&thinned, ChangeMode::Relative, config.percent_cut);
                    return Ok(series.with_table(sampled));
                }
                SeriesClass::TemperatureLike => {
                    let thinned = threshold_sampling(
                        &series.table,
                        ChangeMode::Absolute,
                        PRE_SAMPLE_THRESHOLD,
                    );
                    let sampled =
                        accumulated_sampling(&thinned, ChangeMode::Absolute, config.value_cut);
                    return Ok(series.with_table(sampled));
                }
                _ => {}
            }
        }
        return Ok(series.clone());
    }

    let period = parse_period(&config.resampling_period)?;
    let aggregated = match class {
        SeriesClass::CategoricalLog(3) => aggregate_by_period(&series.table, period, Aggregate::Last),
        SeriesClass::CategoricalLog(11) => {
            let mut bucketed = aggregate_by_period(&series.table, period, Aggregate::Last);
            forward_fill(&mut bucketed);
            bucketed
        }
        _ => aggregate_by_period(&series.table, period, Aggregate::Mean),
    };
    Ok(series.with_table(aggregated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn config_with(method: &str, period: &str) -> Config {
        Config {
            resample_method: String::from(method),
            resampling_period: String::from(period),
            percent_cut: 2.0,
            value_cut: 0.2,
            ..Config::default()
        }
    }

    fn series_from(columns: &[&str], rows: &[(time::PrimitiveDateTime, Vec<Cell>)]) -> LogSeries {
        let mut table = SeriesTable::new(columns.iter().map(|name| name.to_string()).collect());
        for (stamp, cells) in rows {
            table.push_row(*stamp, cells.clone());
        }
        LogSeries::new(String::from("test"), String::from("comment"), table)
    }

    #[test]
    fn test_diff_mode_samples_pressure_series() {
        let start = datetime!(2024-03-02 10:00:00);
        let rows: Vec<_> = [10.0, 10.05, 10.5, 11.0]
            .iter()
            .enumerate()
            .map(|(index, value)| {
                (
                    start + Duration::seconds(index as i64),
                    vec![Cell::Number(*value)],
                )
            })
            .collect();
        let series = series_from(&["MIG_2"], &rows);
        let resampled = resample_series(&series, &config_with("diff", "30S")).unwrap();
        let kept: Vec<f64> = resampled
            .table
            .rows
            .iter()
            .map(|row| row.cells[0].as_number().unwrap())
            .collect();
        assert_eq!(kept, vec![10.0, 10.5, 11.0]);
        assert_eq!(resampled.name, "test");
        assert_eq!(resampled.comment, "comment");
    }

    #[test]
    fn test_diff_mode_leaves_wide_series_untouched() {
        let series = series_from(
            &["CallerID", "Message", "Color"],
            &[(
                datetime!(2024-03-02 10:00:00),
                vec![
                    Cell::Number(1.0),
                    Cell::Text(String::from("holder moved from storage to GC")),
                    Cell::Number(0.0),
                ],
            )],
        );
        let resampled = resample_series(&series, &config_with("diff", "30S")).unwrap();
        assert_eq!(resampled.table, series.table);
    }

    #[test]
    fn test_time_mode_last_aggregation() {
        let series = series_from(
            &["CallerID", "Message", "Color"],
            &[
                (
                    datetime!(2024-03-02 10:00:05),
                    vec![
                        Cell::Number(1.0),
                        Cell::Text(String::from("first")),
                        Cell::Number(0.0),
                    ],
                ),
                (
                    datetime!(2024-03-02 10:00:20),
                    vec![
                        Cell::Number(2.0),
                        Cell::Text(String::from("second")),
                        Cell::Number(0.0),
                    ],
                ),
                (
                    datetime!(2024-03-02 10:01:10),
                    vec![
                        Cell::Number(3.0),
                        Cell::Text(String::from("third")),
                        Cell::Number(0.0),
                    ],
                ),
            ],
        );
        let resampled = resample_series(&series, &config_with("time", "30S")).unwrap();
        // Buckets: 10:00:00 (two rows, last wins), 10:00:30 (empty), 10:01:00
        assert_eq!(resampled.table.rows.len(), 3);
        assert_eq!(
            resampled.table.rows[0].timestamp,
            datetime!(2024-03-02 10:00:00)
        );
        assert_eq!(
            resampled.table.rows[0].cells[1],
            Cell::Text(String::from("second"))
        );
        assert!(resampled.table.rows[1].cells[1].is_empty());
        assert_eq!(
            resampled.table.rows[2].cells[1],
            Cell::Text(String::from("third"))
        );
    }

    #[test]
    fn test_time_mode_mean_aggregation() {
        let series = series_from(
            &["Voltage"],
            &[
                (datetime!(2024-03-02 10:00:05), vec![Cell::Number(1.0)]),
                (datetime!(2024-03-02 10:00:10), vec![Cell::Number(3.0)]),
                (datetime!(2024-03-02 10:00:40), vec![Cell::Number(5.0)]),
            ],
        );
        let resampled = resample_series(&series, &config_with("time", "30S")).unwrap();
        assert_eq!(resampled.table.rows[0].cells[0], Cell::Number(2.0));
        assert_eq!(resampled.table.rows[1].cells[0], Cell::Number(5.0));
    }

    #[test]
    fn test_time_mode_shutters_forward_filled() {
        let columns: Vec<String> = (0..11).map(|index| format!("Shutter_{index}")).collect();
        let mut table = SeriesTable::new(columns);
        let open_row: Vec<Cell> = (0..11).map(|_| Cell::Text(String::from("open"))).collect();
        table.push_row(datetime!(2024-03-02 10:00:00), open_row.clone());
        let closed_row: Vec<Cell> = (0..11).map(|_| Cell::Text(String::from("closed"))).collect();
        table.push_row(datetime!(2024-03-02 10:02:00), closed_row);
        let series = LogSeries::new(String::from("Shutters"), String::new(), table);

        let resampled = resample_series(&series, &config_with("time", "30S")).unwrap();
        // 10:00:30, 10:01:00 and 10:01:30 have no samples; the open state persists
        assert_eq!(resampled.table.rows.len(), 5);
        for row in &resampled.table.rows[0..4] {
            assert_eq!(row.cells[0], Cell::Text(String::from("open")));
        }
        assert_eq!(
            resampled.table.rows[4].cells[0],
            Cell::Text(String::from("closed"))
        );
    }

    #[test]
    fn test_time_mode_bad_period() {
        let series = series_from(&["Voltage"], &[]);
        assert!(resample_series(&series, &config_with("time", "soon")).is_err());
    }
}

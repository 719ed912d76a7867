use std::path::Path;

use fxhash::{FxHashMap, FxHashSet};
use rust_xlsxwriter::{Workbook, Worksheet};
use time::PrimitiveDateTime;

use super::error::ExportError;
use super::table::{Cell, LogSeries, SeriesTable};
use super::timestamp::format_timestamp;

/// Sheet name used for the merged export, mirroring the EPIC convention.
const MERGED_SHEET_NAME: &str = "epic_log_data";
/// Hard limit imposed by the xlsx format.
const MAX_SHEET_NAME_LEN: usize = 31;

fn sheet_name(name: &str) -> String {
    name.chars().take(MAX_SHEET_NAME_LEN).collect()
}

fn write_table(worksheet: &mut Worksheet, table: &SeriesTable) -> Result<(), ExportError> {
    worksheet.write_string(0, 0, "Date")?;
    for (column, name) in table.columns.iter().enumerate() {
        worksheet.write_string(0, (column + 1) as u16, name)?;
    }
    for (index, row) in table.rows.iter().enumerate() {
        let sheet_row = (index + 1) as u32;
        worksheet.write_string(sheet_row, 0, format_timestamp(&row.timestamp))?;
        for (column, cell) in row.cells.iter().enumerate() {
            let sheet_column = (column + 1) as u16;
            match cell {
                Cell::Number(value) => {
                    worksheet.write_number(sheet_row, sheet_column, *value)?;
                }
                Cell::Text(text) => {
                    worksheet.write_string(sheet_row, sheet_column, text)?;
                }
                Cell::Empty => {}
            }
        }
    }
    Ok(())
}

/// Export one worksheet per series, sheet name = series name.
pub fn write_workbook(path: &Path, series_list: &[LogSeries]) -> Result<(), ExportError> {
    if series_list.is_empty() {
        return Err(ExportError::NoSeries);
    }
    let mut workbook = Workbook::new();
    for series in series_list {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(&series.name))?;
        write_table(worksheet, &series.table)?;
    }
    workbook.save(path)?;
    Ok(())
}

/// Outer-join all series on timestamp into one table.
///
/// Row identity is (timestamp, occurrence index), so a timestamp the
/// instrument logged twice in one series joins positionally against the
/// other series instead of multiplying rows. Column names colliding across
/// series are disambiguated with the owning series name.
pub fn combine(series_list: &[LogSeries]) -> SeriesTable {
    let mut name_counts: FxHashMap<&str, usize> = FxHashMap::default();
    for series in series_list {
        for column in &series.table.columns {
            *name_counts.entry(column.as_str()).or_insert(0) += 1;
        }
    }

    let mut columns: Vec<String> = Vec::new();
    let mut offsets: Vec<usize> = Vec::with_capacity(series_list.len());
    for series in series_list {
        offsets.push(columns.len());
        for column in &series.table.columns {
            if name_counts[column.as_str()] > 1 {
                columns.push(format!("{}_{}", series.name, column));
            } else {
                columns.push(column.clone());
            }
        }
    }

    let mut keys: Vec<(PrimitiveDateTime, usize)> = Vec::new();
    let mut seen: FxHashSet<(PrimitiveDateTime, usize)> = FxHashSet::default();
    for series in series_list {
        let mut occurrences: FxHashMap<PrimitiveDateTime, usize> = FxHashMap::default();
        for row in &series.table.rows {
            let counter = occurrences.entry(row.timestamp).or_insert(0);
            let key = (row.timestamp, *counter);
            *counter += 1;
            if seen.insert(key) {
                keys.push(key);
            }
        }
    }
    keys.sort();

    let key_index: FxHashMap<(PrimitiveDateTime, usize), usize> = keys
        .iter()
        .enumerate()
        .map(|(index, key)| (*key, index))
        .collect();
    let mut cells: Vec<Vec<Cell>> = vec![vec![Cell::Empty; columns.len()]; keys.len()];
    for (series_index, series) in series_list.iter().enumerate() {
        let mut occurrences: FxHashMap<PrimitiveDateTime, usize> = FxHashMap::default();
        for row in &series.table.rows {
            let counter = occurrences.entry(row.timestamp).or_insert(0);
            let row_slot = key_index[&(row.timestamp, *counter)];
            *counter += 1;
            for (column, cell) in row.cells.iter().enumerate() {
                cells[row_slot][offsets[series_index] + column] = cell.clone();
            }
        }
    }

    let mut combined = SeriesTable::new(columns);
    for ((timestamp, _), row_cells) in keys.into_iter().zip(cells) {
        combined.push_row(timestamp, row_cells);
    }
    combined
}

/// Export the combined table to a single sheet.
pub fn write_combined(path: &Path, table: &SeriesTable) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(MERGED_SHEET_NAME)?;
    write_table(worksheet, table)?;
    workbook.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn series(name: &str, column: &str, rows: &[(PrimitiveDateTime, f64)]) -> LogSeries {
        let mut table = SeriesTable::new(vec![String::from(column)]);
        for (stamp, value) in rows {
            table.push_row(*stamp, vec![Cell::Number(*value)]);
        }
        LogSeries::new(String::from(name), String::new(), table)
    }

    #[test]
    fn test_combine_outer_join() {
        let first = series(
            "MIG_2",
            "MIG_2_Pressure",
            &[
                (datetime!(2024-03-02 10:00:00), 1.0),
                (datetime!(2024-03-02 10:00:02), 2.0),
            ],
        );
        let second = series(
            "Pyro",
            "Pyro_head",
            &[
                (datetime!(2024-03-02 10:00:01), 650.0),
                (datetime!(2024-03-02 10:00:02), 651.0),
            ],
        );
        let combined = combine(&[first, second]);
        assert_eq!(
            combined.columns,
            vec![String::from("MIG_2_Pressure"), String::from("Pyro_head")]
        );
        assert_eq!(combined.rows.len(), 3);
        // Shared timestamp lands in one row with both cells populated
        assert_eq!(combined.rows[2].cells[0], Cell::Number(2.0));
        assert_eq!(combined.rows[2].cells[1], Cell::Number(651.0));
        // Unshared timestamps leave the other side empty
        assert!(combined.rows[0].cells[1].is_empty());
        assert!(combined.rows[1].cells[0].is_empty());
    }

    #[test]
    fn test_combine_round_trip_timestamps() {
        let first = series(
            "MIG_2",
            "MIG_2_Pressure",
            &[
                (datetime!(2024-03-02 10:00:00), 1.0),
                (datetime!(2024-03-02 10:00:00), 1.5),
                (datetime!(2024-03-02 10:00:05), 2.0),
            ],
        );
        let second = series(
            "Pyro",
            "Pyro_head",
            &[
                (datetime!(2024-03-02 10:00:00), 650.0),
                (datetime!(2024-03-02 10:00:07), 651.0),
            ],
        );
        let combined = combine(&[first.clone(), second.clone()]);
        // Duplicate timestamps join positionally: they are neither multiplied
        // nor collapsed
        assert_eq!(combined.rows.len(), 4);
        let first_stamps: Vec<PrimitiveDateTime> = combined
            .rows
            .iter()
            .filter(|row| !row.cells[0].is_empty())
            .map(|row| row.timestamp)
            .collect();
        let original: Vec<PrimitiveDateTime> =
            first.table.rows.iter().map(|row| row.timestamp).collect();
        assert_eq!(first_stamps, original);
        let second_stamps: Vec<PrimitiveDateTime> = combined
            .rows
            .iter()
            .filter(|row| !row.cells[1].is_empty())
            .map(|row| row.timestamp)
            .collect();
        let expected: Vec<PrimitiveDateTime> =
            second.table.rows.iter().map(|row| row.timestamp).collect();
        assert_eq!(second_stamps, expected);
    }

    #[test]
    fn test_combine_prefixes_colliding_columns() {
        let first = series("MIG_2", "Value", &[(datetime!(2024-03-02 10:00:00), 1.0)]);
        let second = series("Pyro", "Value", &[(datetime!(2024-03-02 10:00:00), 2.0)]);
        let combined = combine(&[first, second]);
        assert_eq!(
            combined.columns,
            vec![String::from("MIG_2_Value"), String::from("Pyro_Value")]
        );
    }

    #[test]
    fn test_sheet_name_truncation() {
        let long = "a_very_long_series_name_well_over_the_limit";
        assert_eq!(sheet_name(long).chars().count(), 31);
        assert_eq!(sheet_name("short"), "short");
    }
}

use std::path::{Path, PathBuf};

use super::error::{BatchError, LogFileError};
use super::table::{Cell, LogSeries, SeriesTable};
use super::timestamp::parse_timestamp;

/// All series loaded for one date folder, with the total input size so the
/// caller can report how much data the samplers have to reduce.
#[derive(Debug)]
pub struct LoadedBatch {
    pub series: Vec<LogSeries>,
    pub total_size_bytes: u64,
}

/// Replace the characters EPIC sprinkles into column names and file names
/// with underscores so they survive as identifiers downstream.
fn sanitize(raw: &str) -> String {
    raw.replace(['\'', '`'], "").replace(['.', ' '], "_")
}

/// Import one log file from the EPIC control program.
///
/// The first line is a free-text comment; the second is the column header
/// line; the rest are delimited records keyed by a day-first Date column.
pub fn read_series(path: &Path) -> Result<LogSeries, LogFileError> {
    if !path.exists() {
        return Err(LogFileError::BadFilePath(path.to_path_buf()));
    }
    let name = sanitize(
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
            .as_str(),
    );
    let contents = std::fs::read_to_string(path)?;
    parse_series(&name, &contents)
}

/// Parse the raw text of one EPIC log into a series.
///
/// Split out from [`read_series`] so the format can be exercised without
/// touching the filesystem.
pub fn parse_series(name: &str, contents: &str) -> Result<LogSeries, LogFileError> {
    let (comment_line, data) = match contents.split_once('\n') {
        Some(parts) => parts,
        None => return Err(LogFileError::MissingHeader(name.to_string())),
    };
    // The comment line opens with a marker character the operators never
    // read back; EPIC convention is to drop it.
    let mut comment_chars = comment_line.chars();
    comment_chars.next();
    let comment = comment_chars.as_str().trim().replace('.', "_");

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(data.as_bytes());

    // Older EPIC builds header the timestamp as Date&Time, newer ones as
    // Date. Normalize to Date before looking it up.
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| {
            let sanitized = sanitize(header);
            if sanitized == "Date&Time" {
                String::from("Date")
            } else {
                sanitized
            }
        })
        .collect();

    let date_index = headers
        .iter()
        .position(|header| header == "Date")
        .ok_or(LogFileError::MissingDateColumn)?;

    let columns: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != date_index)
        .map(|(_, header)| header.clone())
        .collect();

    let mut table = SeriesTable::new(columns);
    for record in reader.records() {
        let record = record?;
        let raw_stamp = record.get(date_index).unwrap_or("");
        let timestamp = parse_timestamp(raw_stamp)?;
        let cells: Vec<Cell> = record
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != date_index)
            .map(|(_, field)| Cell::parse(field))
            .collect();
        table.push_row(timestamp, cells);
    }

    Ok(LogSeries::new(name.to_string(), comment, table))
}

/// Collect every .txt log under the date folder, sorted by name.
fn get_file_stack(parent_path: &Path) -> Result<(Vec<PathBuf>, u64), BatchError> {
    let mut file_list: Vec<PathBuf> = Vec::new();
    let mut total_size: u64 = 0;
    for item in parent_path.read_dir()? {
        let item_path = item?.path();
        if item_path.extension().is_some_and(|ext| ext == "txt") {
            total_size += item_path.metadata()?.len();
            file_list.push(item_path);
        }
    }

    if file_list.is_empty() {
        return Err(BatchError::NoMatchingFiles(parent_path.to_path_buf()));
    }

    file_list.sort();
    Ok((file_list, total_size))
}

/// Import all logs for one experiment date from `<data_path>/<date>/*.txt`.
pub fn read_batch(date: &str, data_path: &Path) -> Result<LoadedBatch, BatchError> {
    let parent_path = data_path.join(date);
    let (file_list, total_size_bytes) = get_file_stack(&parent_path)?;
    let mut series = Vec::with_capacity(file_list.len());
    for path in &file_list {
        series.push(read_series(path)?);
    }
    Ok(LoadedBatch {
        series,
        total_size_bytes,
    })
}

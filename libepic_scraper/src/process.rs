use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use super::config::Config;
use super::error::{ConfigError, ProcessorError};
use super::export;
use super::growth::extract_growth;
use super::loader;
use super::resample::resample_series;
use super::table::LogSeries;

/// What one batch produced: the series that were written, the aggregated
/// data-quality diagnostics, and where the workbook landed.
#[derive(Debug)]
pub struct ProcessSummary {
    pub series_names: Vec<String>,
    pub diagnostics: Vec<String>,
    pub output_path: PathBuf,
}

/// The main loop of epic_scraper.
///
/// Takes a config (and a progress fraction for the UI to poll) and runs the
/// full pipeline for one experiment date: load every log, reduce each
/// series, detect growth events, export the workbook. Growth anomalies are
/// collected as diagnostics and never abort the batch; the operator reviews
/// them against the exported sheets.
pub fn process(config: Config, status: Arc<Mutex<f32>>) -> Result<ProcessSummary, ProcessorError> {
    if !config.are_cuts_valid() {
        return Err(ConfigError::BadThreshold(format!(
            "percent_cut {} / value_cut {} must be finite and non-negative",
            config.percent_cut, config.value_cut
        ))
        .into());
    }

    let batch = loader::read_batch(&config.date, &config.data_path)?;
    log::info!(
        "Loaded {} logs for {} with total size: {}",
        batch.series.len(),
        config.date,
        human_bytes::human_bytes(batch.total_size_bytes as f64)
    );

    let total = batch.series.len();
    let mut processed: Vec<LogSeries> = Vec::with_capacity(total);
    let mut diagnostics: Vec<String> = Vec::new();

    for (index, series) in batch.series.into_iter().enumerate() {
        let rows_before = series.table.rows.len();
        let resampled = resample_series(&series, &config)?;
        log::info!(
            "Series {}: {} rows reduced to {}.",
            resampled.name,
            rows_before,
            resampled.table.rows.len()
        );

        let (finished, report) = extract_growth(&resampled);
        diagnostics.push(format!("{}: {}", finished.name, report.status));
        diagnostics.extend(report.lines.iter().cloned());
        processed.push(finished);

        match status.lock() {
            Ok(mut fraction) => *fraction = (index + 1) as f32 / total as f32,
            Err(e) => log::error!("{e}"),
        }
    }

    let output_path = config.get_output_file_name();
    if config.write_sheet_per_series() {
        export::write_workbook(&output_path, &processed)?;
    } else {
        let combined = export::combine(&processed);
        export::write_combined(&output_path, &combined)?;
    }
    log::info!("Exported workbook to {}.", output_path.to_string_lossy());

    Ok(ProcessSummary {
        series_names: processed.iter().map(|series| series.name.clone()).collect(),
        diagnostics,
        output_path,
    })
}

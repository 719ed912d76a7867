use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("Could not parse {0} as an EPIC day-first timestamp")]
    BadTimestamp(String),
    #[error("Could not parse {0} as a resampling period; expected a number followed by S, T, H or D")]
    BadPeriod(String),
}

#[derive(Debug, Error)]
pub enum LogFileError {
    #[error("Could not open EPIC log because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("EPIC log {0} is missing the comment or header line")]
    MissingHeader(String),
    #[error("EPIC log has no Date column after header normalization")]
    MissingDateColumn,
    #[error("EPIC log contains a bad timestamp: {0}")]
    BadTimestamp(#[from] TimestampError),
    #[error("Failed to parse EPIC log records: {0}")]
    CsvError(#[from] csv::Error),
    #[error("EPIC log failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Batch loader failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Batch loader did not find any .txt logs in directory {0:?}")]
    NoMatchingFiles(PathBuf),
    #[error("Batch loader failed due to log file error: {0}")]
    FileError(#[from] LogFileError),
}

#[derive(Debug, Error)]
pub enum ResampleError {
    #[error("Resampler failed due to bad period: {0}")]
    BadPeriod(#[from] TimestampError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Exporter failed due to xlsx error: {0}")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),
    #[error("Exporter was given no series to write")]
    NoSeries,
    #[error("Exporter failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Configuration has an invalid threshold: {0}")]
    BadThreshold(String),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor failed due to Batch error: {0}")]
    BatchError(#[from] BatchError),
    #[error("Processor failed due to Resample error: {0}")]
    ResampleError(#[from] ResampleError),
    #[error("Processor failed due to Export error: {0}")]
    ExportError(#[from] ExportError),
    #[error("Processor failed due to Config error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("Processor failed due to IO error: {0}")]
    IoError(#[from] std::io::Error),
}

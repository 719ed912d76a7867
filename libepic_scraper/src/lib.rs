//! # epic_scraper
//!
//! epic_scraper imports the time-series log files written by EPIC, the custom
//! control program of the molecular beam epitaxy setup, and condenses one
//! experiment date into a single Excel workbook. Pressure-like and
//! temperature-like channels are reduced with change-based sampling
//! (threshold sampling against the previous row plus accumulated sampling
//! against the last retained row, which catches slow drift), or alternatively
//! aggregated over fixed time intervals. The free-text event log is scanned
//! for sample-holder movements and paired into growth start/end intervals,
//! with the pairing validated for unique names and matched counts.
//!
//! ## Building & Install
//!
//! To build and install the CLI use `cargo install --path ./epic_scraper_cli`
//! from the top level epic_scraper repository. The binary will be installed
//! to your cargo install location (typically something like `~/.cargo/bin/`).
//!
//! ## Configuration
//!
//! A configuration file is a YAML document:
//!
//! ```yml
//! date: '2024-03-02'
//! data_path: /data/epic
//! resampling_period: 30S
//! percent_cut: 0.5
//! value_cut: 0.2
//! resample_method: diff
//! write_method: true
//! ```
//!
//! - `date`: the folder under `data_path` holding that day's `.txt` logs,
//!   also the suffix of the output file name
//! - `data_path`: the root folder of the EPIC log archive
//! - `resampling_period`: bucket width for time-based mode, a number
//!   followed by S/T/H/D (seconds/minutes/hours/days)
//! - `percent_cut`: accumulated-sampling threshold for pressure channels,
//!   in percent relative change
//! - `value_cut`: accumulated-sampling threshold for temperature channels,
//!   as an absolute difference
//! - `resample_method`: `diff` selects change-based sampling (the default);
//!   any other value selects time-based aggregation
//! - `write_method`: `true` writes one sheet per log file, `false` merges
//!   everything into a single `epic_log_data` sheet joined on timestamp
//!
//! A template can be generated with the CLI `new` subcommand.
//!
//! ## Input format
//!
//! Each EPIC log starts with a one-line free-text comment, followed by a
//! delimited header line and data records. The timestamp column (`Date` or
//! `Date&Time` depending on the EPIC build) is day-first. Column names are
//! normalized on import: quotes removed, dots and spaces replaced with
//! underscores.
//!
//! ## Output
//!
//! The workbook is written to `<data_path>/mbe_data_<date>.xlsx`. Growth
//! detection results (single/multiple growths, their boundaries, or the
//! data-quality problems that prevented pairing) are logged and attached to
//! each series as a status; malformed growth logs are exported as-is so the
//! operator can inspect them.
pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod growth;
pub mod loader;
pub mod process;
pub mod resample;
pub mod sampler;
pub mod table;
pub mod timestamp;

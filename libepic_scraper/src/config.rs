use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::error::ConfigError;

/// Structure representing the application configuration. Contains pathing and
/// resampling information for one experiment date.
/// Configs are serializable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub date: String,
    pub data_path: PathBuf,
    pub resampling_period: String,
    pub percent_cut: f64,
    pub value_cut: f64,
    pub resample_method: String,
    pub write_method: bool,
}

impl Default for Config {
    /// Generate a new Config object with the thresholds the operators
    /// typically start from. Paths will be empty/invalid
    fn default() -> Self {
        Self {
            date: String::from(""),
            data_path: PathBuf::from("None"),
            resampling_period: String::from("30S"),
            percent_cut: 0.5,
            value_cut: 0.2,
            resample_method: String::from("diff"),
            write_method: true,
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// The folder holding all log files for the configured date
    pub fn get_date_directory(&self) -> PathBuf {
        self.data_path.join(&self.date)
    }

    /// Check that the date folder exists before starting a batch
    pub fn does_date_exist(&self) -> bool {
        self.get_date_directory().exists()
    }

    /// Get the path to the output workbook
    pub fn get_output_file_name(&self) -> PathBuf {
        self.data_path.join(format!("mbe_data_{}.xlsx", self.date))
    }

    /// "diff" selects the change-based samplers; any other value selects
    /// time-based aggregation over `resampling_period`
    pub fn is_change_based(&self) -> bool {
        self.resample_method == "diff"
    }

    pub fn are_cuts_valid(&self) -> bool {
        self.percent_cut.is_finite()
            && self.percent_cut >= 0.0
            && self.value_cut.is_finite()
            && self.value_cut >= 0.0
    }

    /// true writes one sheet per series; false merges everything into a
    /// single `epic_log_data` sheet
    pub fn write_sheet_per_series(&self) -> bool {
        self.write_method
    }
}

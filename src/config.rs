//! Configuration and constants for the analysis binaries.
//!
//! Every analysis runs against fixed directories and column names. The
//! constants below are the defaults; an optional `subnet-charts.json` in the
//! working directory can override them.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "subnet-charts.json";

// Input locations
pub const CSV_DIR: &str = "csv";
pub const OPTIMAL_CSV_DIR: &str = "csv/optimal";
pub const NON_OPTIMAL_CSV_DIR: &str = "csv/non-optimal";
pub const CSV_SUFFIX: &str = ".csv";

/// Where rendered charts land
pub const OUTPUT_DIR: &str = "plots";

// Column names used by the experiment CSVs
pub const COPIER_MARGIN_COL: &str = "Copier Margin";
pub const BLACK_BOX_AGE_COL: &str = "Black Box Age";
pub const WINDOW_LENGTH_COL: &str = "Encryption Window Length";
pub const WINDOW_COL: &str = "Encryption Window";
pub const GINI_COL: &str = "Gini Coefficient";

/// Margin value the single-margin analyses restrict themselves to
pub const BASELINE_MARGIN: f64 = 0.0;

// Output file names
pub const AVERAGE_BY_SUBNET_PNG: &str = "average_black_box_age_by_subnet.png";
pub const MARGIN_SWEEP_PNG: &str = "avg_black_box_age_vs_copier_margin.png";
pub const GINI_HEATMAP_PNG: &str = "balanced_gini_window_heatmap.png";
pub const OPTIMAL_COMPARISON_PNG: &str = "optimal_vs_non_optimal_subnet_comparison.png";

/// Centered moving average width applied along the heatmap window axis
pub const HEATMAP_SMOOTHING_WINDOW: usize = 3;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Directories, columns and file names shared by all analyses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct AnalysisConfig {
    pub csv_dir: PathBuf,
    pub optimal_dir: PathBuf,
    pub non_optimal_dir: PathBuf,
    pub csv_suffix: String,
    pub output_dir: PathBuf,
    pub margin_column: String,
    pub baseline_margin: f64,
    pub age_column: String,
    pub window_length_column: String,
    pub window_column: String,
    pub gini_column: String,
    pub smoothing_window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            csv_dir: PathBuf::from(CSV_DIR),
            optimal_dir: PathBuf::from(OPTIMAL_CSV_DIR),
            non_optimal_dir: PathBuf::from(NON_OPTIMAL_CSV_DIR),
            csv_suffix: CSV_SUFFIX.to_string(),
            output_dir: PathBuf::from(OUTPUT_DIR),
            margin_column: COPIER_MARGIN_COL.to_string(),
            baseline_margin: BASELINE_MARGIN,
            age_column: BLACK_BOX_AGE_COL.to_string(),
            window_length_column: WINDOW_LENGTH_COL.to_string(),
            window_column: WINDOW_COL.to_string(),
            gini_column: GINI_COL.to_string(),
            smoothing_window: HEATMAP_SMOOTHING_WINDOW,
        }
    }
}

impl AnalysisConfig {
    /// Read a config file. Missing keys fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Use `subnet-charts.json` from the working directory if it exists.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Path::new(CONFIG_FILE_NAME);
        if path.is_file() {
            log::info!("Using config from {}", path.display());
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "csv_dir": "data", "smoothing_window": 5 }}"#).unwrap();

        let config = AnalysisConfig::from_file(file.path()).unwrap();
        assert_eq!(config.csv_dir, PathBuf::from("data"));
        assert_eq!(config.smoothing_window, 5);
        assert_eq!(config.margin_column, COPIER_MARGIN_COL);
        assert_eq!(config.output_dir, PathBuf::from(OUTPUT_DIR));
    }

    #[test]
    fn malformed_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = AnalysisConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}

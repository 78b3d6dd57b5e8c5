//! CSV Data Loader Module
//! Loads a directory of per-subnet CSV files using Polars.

use super::model::Dataset;
use log::{debug, trace};
use polars::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Rows scanned before Polars settles on a column type.
const INFER_SCHEMA_ROWS: usize = 10_000;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV {path}: {source}")]
    Csv { path: PathBuf, source: PolarsError },
    #[error("Failed to read directory {path}: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("No numeric subnet suffix in file name: {0}")]
    InvalidSubnet(String),
    #[error("Subnet {subnet} appears in both {first} and {second}")]
    DuplicateSubnet {
        subnet: u32,
        first: PathBuf,
        second: PathBuf,
    },
}

/// Extract the subnet id from a file name.
///
/// The id is the text after the last `_` and before the first `.` that
/// follows it, so `results_run_12.csv` yields 12. A name without an
/// underscore is read from its start.
pub fn subnet_from_filename(file_name: &str) -> Result<u32, LoaderError> {
    let tail = file_name.rsplit('_').next().unwrap_or(file_name);
    let digits = tail.split('.').next().unwrap_or(tail).trim();
    digits
        .parse::<u32>()
        .map_err(|_| LoaderError::InvalidSubnet(file_name.to_string()))
}

/// Handles CSV file loading with Polars.
pub struct DataLoader {
    suffix: String,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new(crate::config::CSV_SUFFIX)
    }
}

impl DataLoader {
    /// Loader that picks up files whose name ends with `suffix`.
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
        }
    }

    /// Load a single CSV file, header row first.
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame, LoaderError> {
        let csv_err = |source| LoaderError::Csv {
            path: path.to_path_buf(),
            source,
        };

        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .finish()
            .map_err(csv_err)?
            .collect()
            .map_err(csv_err)
    }

    /// Paths of all files in `dir` matching the suffix, sorted by name.
    pub fn matching_files(&self, dir: &Path) -> Result<Vec<PathBuf>, LoaderError> {
        let dir_err = |source| LoaderError::Directory {
            path: dir.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(dir_err)? {
            let path = entry.map_err(dir_err)?.path();
            let matches = path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.ends_with(&self.suffix));
            if matches {
                files.push(path);
            } else {
                trace!("Skipping {}", path.display());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Load every matching file in `dir`, keyed by subnet.
    pub fn load_directory(&self, dir: &Path) -> Result<BTreeMap<u32, Dataset>, LoaderError> {
        let mut datasets: BTreeMap<u32, Dataset> = BTreeMap::new();

        for path in self.matching_files(dir)? {
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default();
            let subnet = subnet_from_filename(file_name)?;

            if let Some(existing) = datasets.get(&subnet) {
                return Err(LoaderError::DuplicateSubnet {
                    subnet,
                    first: existing.path().to_path_buf(),
                    second: path,
                });
            }

            let df = self.load_csv(&path)?;
            debug!(
                "Loaded {} ({} rows) as subnet {}",
                path.display(),
                df.height(),
                subnet
            );
            datasets.insert(subnet, Dataset::new(subnet, path, df));
        }

        Ok(datasets)
    }
}

//! Core data types: per-file datasets and orderable parameter values.

use polars::prelude::DataFrame;
use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

/// All rows of one CSV file, tagged with the subnet encoded in its name.
#[derive(Debug, Clone)]
pub struct Dataset {
    subnet: u32,
    path: PathBuf,
    df: DataFrame,
}

impl Dataset {
    pub fn new(subnet: u32, path: impl Into<PathBuf>, df: DataFrame) -> Self {
        Self {
            subnet,
            path: path.into(),
            df,
        }
    }

    pub fn subnet(&self) -> u32 {
        self.subnet
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }
}

/// A float usable as an ordered map key.
///
/// Ordering follows `f64::total_cmp`, so `-0.0 < 0.0` and NaN sorts last.
#[derive(Debug, Clone, Copy)]
pub struct ParamValue(pub f64);

impl ParamValue {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ParamValue {}

impl PartialOrd for ParamValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ParamValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn param_values_sort_numerically() {
        let mut map = BTreeMap::new();
        for v in [10.0, 0.5, 2.0, 0.0] {
            map.insert(ParamValue(v), v);
        }
        let keys: Vec<f64> = map.keys().map(|k| k.value()).collect();
        assert_eq!(keys, vec![0.0, 0.5, 2.0, 10.0]);
    }
}

//! Data Processor Module
//! Row filtering and grouped means over per-subnet datasets.

use super::model::{Dataset, ParamValue};
use log::warn;
use polars::prelude::*;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Column '{column}' not found in {path}")]
    MissingColumn { column: String, path: PathBuf },
    #[error("Column '{column}' in {path} is not numeric: {source}")]
    NonNumeric {
        column: String,
        path: PathBuf,
        source: PolarsError,
    },
    #[error("{count} missing value(s) in column '{column}' of {path}")]
    MissingValue {
        column: String,
        count: usize,
        path: PathBuf,
    },
    #[error("Query over {path} failed: {source}")]
    Query { path: PathBuf, source: PolarsError },
}

/// Keep only rows where `column == value`.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFilter {
    pub column: String,
    pub value: f64,
}

impl RowFilter {
    pub fn new(column: &str, value: f64) -> Self {
        Self {
            column: column.to_string(),
            value,
        }
    }
}

/// What to average and how to group it.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateSpec {
    /// Column whose mean is computed
    pub target: String,
    pub filter: Option<RowFilter>,
    /// Secondary grouping column; rows are always grouped by subnet first
    pub group_by: Option<String>,
}

impl AggregateSpec {
    pub fn mean_of(target: &str) -> Self {
        Self {
            target: target.to_string(),
            filter: None,
            group_by: None,
        }
    }

    pub fn where_eq(mut self, column: &str, value: f64) -> Self {
        self.filter = Some(RowFilter::new(column, value));
        self
    }

    pub fn grouped_by(mut self, column: &str) -> Self {
        self.group_by = Some(column.to_string());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupKey {
    pub subnet: u32,
    pub param: Option<ParamValue>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupMean {
    pub mean: f64,
    pub count: usize,
}

/// Grouped means, ordered by subnet then parameter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    groups: BTreeMap<GroupKey, GroupMean>,
}

impl Aggregate {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn get(&self, key: &GroupKey) -> Option<&GroupMean> {
        self.groups.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, &GroupMean)> {
        self.groups.iter()
    }

    /// Distinct subnets in ascending order.
    pub fn subnets(&self) -> Vec<u32> {
        let mut subnets: Vec<u32> = self.groups.keys().map(|k| k.subnet).collect();
        subnets.dedup();
        subnets
    }

    /// Means of an aggregate grouped by subnet alone.
    pub fn by_subnet(&self) -> BTreeMap<u32, f64> {
        self.groups
            .iter()
            .filter(|(key, _)| key.param.is_none())
            .map(|(key, group)| (key.subnet, group.mean))
            .collect()
    }

    /// `(param, mean)` points per subnet, sorted by param.
    pub fn series(&self) -> BTreeMap<u32, Vec<(f64, f64)>> {
        let mut series: BTreeMap<u32, Vec<(f64, f64)>> = BTreeMap::new();
        for (key, group) in &self.groups {
            if let Some(param) = key.param {
                series
                    .entry(key.subnet)
                    .or_default()
                    .push((param.value(), group.mean));
            }
        }
        series
    }
}

/// Output column names of the per-dataset queries.
const VALUE: &str = "value";
const PARAM: &str = "param";
const MEAN: &str = "mean";
const COUNT: &str = "count";

/// Handles filtering and grouped aggregation.
pub struct DataProcessor;

impl DataProcessor {
    /// Compute the grouped mean described by `spec` over every dataset.
    ///
    /// Groups with no matching rows are left out of the result.
    pub fn aggregate(
        datasets: &BTreeMap<u32, Dataset>,
        spec: &AggregateSpec,
    ) -> Result<Aggregate, AggregateError> {
        let mut groups = BTreeMap::new();

        for dataset in datasets.values() {
            let rows = Self::matching_rows(dataset, spec)?;
            if rows.height() == 0 {
                warn!(
                    "Subnet {} has no rows for '{}' in {}",
                    dataset.subnet(),
                    spec.target,
                    dataset.path().display()
                );
                continue;
            }

            let query = Self::query_failed(dataset);
            let stats = [
                col(VALUE).mean().alias(MEAN),
                len().cast(DataType::UInt64).alias(COUNT),
            ];
            let grouped = match spec.group_by {
                Some(_) => rows.lazy().group_by([col(PARAM)]).agg(stats),
                None => rows.lazy().select(stats),
            }
            .collect()
            .map_err(&query)?;

            let means = grouped.column(MEAN).and_then(|c| c.f64()).map_err(&query)?;
            let counts = grouped.column(COUNT).and_then(|c| c.u64()).map_err(&query)?;
            let params: Vec<Option<ParamValue>> = match spec.group_by {
                Some(_) => grouped
                    .column(PARAM)
                    .and_then(|c| c.f64())
                    .map_err(&query)?
                    .into_iter()
                    .map(|p| p.map(ParamValue))
                    .collect(),
                None => vec![None; grouped.height()],
            };

            for ((param, mean), count) in params.into_iter().zip(means).zip(counts) {
                if let (Some(mean), Some(count)) = (mean, count) {
                    let key = GroupKey {
                        subnet: dataset.subnet(),
                        param,
                    };
                    groups.insert(
                        key,
                        GroupMean {
                            mean,
                            count: count as usize,
                        },
                    );
                }
            }
        }

        Ok(Aggregate { groups })
    }

    /// Target values per subnet for rows passing `filter`.
    ///
    /// Unlike [`DataProcessor::aggregate`], subnets without matching rows
    /// are kept with an empty vector.
    pub fn collect_values(
        datasets: &BTreeMap<u32, Dataset>,
        target: &str,
        filter: Option<&RowFilter>,
    ) -> Result<BTreeMap<u32, Vec<f64>>, AggregateError> {
        let spec = AggregateSpec {
            target: target.to_string(),
            filter: filter.cloned(),
            group_by: None,
        };

        datasets
            .iter()
            .map(|(&subnet, dataset)| {
                let rows = Self::matching_rows(dataset, &spec)?;
                let values: Vec<f64> = rows
                    .column(VALUE)
                    .and_then(|c| c.f64())
                    .map_err(Self::query_failed(dataset))?
                    .into_no_null_iter()
                    .collect();
                Ok((subnet, values))
            })
            .collect()
    }

    /// Rows of `dataset` passing the filter, reduced to a `value` column
    /// (and a `param` column when grouping) of `Float64` with no nulls.
    fn matching_rows(dataset: &Dataset, spec: &AggregateSpec) -> Result<DataFrame, AggregateError> {
        Self::numeric_column(dataset, &spec.target)?;
        if let Some(group) = &spec.group_by {
            Self::numeric_column(dataset, group)?;
        }

        let mut lf = dataset.dataframe().clone().lazy();
        if let Some(filter) = &spec.filter {
            let column = Self::numeric_column(dataset, &filter.column)?;
            Self::require_no_nulls(dataset, &filter.column, column.null_count())?;
            lf = lf.filter(
                col(filter.column.as_str())
                    .cast(DataType::Float64)
                    .eq(lit(filter.value)),
            );
        }

        let mut selected = vec![col(spec.target.as_str())
            .cast(DataType::Float64)
            .alias(VALUE)];
        if let Some(group) = &spec.group_by {
            selected.push(col(group.as_str()).cast(DataType::Float64).alias(PARAM));
        }
        let rows = lf
            .select(selected)
            .collect()
            .map_err(Self::query_failed(dataset))?;

        let query = Self::query_failed(dataset);
        let values = rows.column(VALUE).map_err(&query)?;
        Self::require_no_nulls(dataset, &spec.target, values.null_count())?;
        if let Some(group) = &spec.group_by {
            let params = rows.column(PARAM).map_err(&query)?;
            Self::require_no_nulls(dataset, group, params.null_count())?;
        }

        Ok(rows)
    }

    /// Look up a column, failing when it is absent or holds unparsable text.
    fn numeric_column<'a>(dataset: &'a Dataset, name: &str) -> Result<&'a Column, AggregateError> {
        let column = dataset
            .dataframe()
            .column(name)
            .map_err(|_| AggregateError::MissingColumn {
                column: name.to_string(),
                path: dataset.path().to_path_buf(),
            })?;

        column
            .strict_cast(&DataType::Float64)
            .map_err(|source| AggregateError::NonNumeric {
                column: name.to_string(),
                path: dataset.path().to_path_buf(),
                source,
            })?;

        Ok(column)
    }

    fn require_no_nulls(dataset: &Dataset, column: &str, nulls: usize) -> Result<(), AggregateError> {
        if nulls == 0 {
            return Ok(());
        }
        Err(AggregateError::MissingValue {
            column: column.to_string(),
            count: nulls,
            path: dataset.path().to_path_buf(),
        })
    }

    fn query_failed(dataset: &Dataset) -> impl Fn(PolarsError) -> AggregateError + '_ {
        move |source| AggregateError::Query {
            path: dataset.path().to_path_buf(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dataset(subnet: u32, margins: &[f64], lengths: &[f64]) -> Dataset {
        let df = DataFrame::new(vec![
            Column::new("Copier Margin".into(), margins.to_vec()),
            Column::new("Encryption Window Length".into(), lengths.to_vec()),
        ])
        .unwrap();
        Dataset::new(subnet, format!("run_{subnet}.csv"), df)
    }

    fn two_subnets() -> BTreeMap<u32, Dataset> {
        BTreeMap::from([
            (1, dataset(1, &[0.0, 0.0, 1.0], &[10.0, 20.0, 100.0])),
            (2, dataset(2, &[0.0], &[30.0])),
        ])
    }

    #[test]
    fn filtered_mean_by_subnet() {
        let spec =
            AggregateSpec::mean_of("Encryption Window Length").where_eq("Copier Margin", 0.0);
        let agg = DataProcessor::aggregate(&two_subnets(), &spec).unwrap();

        assert_eq!(agg.by_subnet(), BTreeMap::from([(1, 15.0), (2, 30.0)]));
        let key = GroupKey {
            subnet: 1,
            param: None,
        };
        assert_eq!(agg.get(&key).map(|g| g.count), Some(2));
    }

    #[test]
    fn grouped_by_secondary_column() {
        let spec = AggregateSpec::mean_of("Encryption Window Length").grouped_by("Copier Margin");
        let agg = DataProcessor::aggregate(&two_subnets(), &spec).unwrap();

        let series = agg.series();
        assert_eq!(series[&1], vec![(0.0, 15.0), (1.0, 100.0)]);
        assert_eq!(series[&2], vec![(0.0, 30.0)]);
        assert!(agg.by_subnet().is_empty());
        assert_eq!(agg.subnets(), vec![1, 2]);
    }

    #[test]
    fn empty_groups_are_omitted() {
        let spec =
            AggregateSpec::mean_of("Encryption Window Length").where_eq("Copier Margin", 5.0);
        let agg = DataProcessor::aggregate(&two_subnets(), &spec).unwrap();
        assert!(agg.is_empty());

        let values = DataProcessor::collect_values(
            &two_subnets(),
            "Encryption Window Length",
            spec.filter.as_ref(),
        )
        .unwrap();
        assert_eq!(values, BTreeMap::from([(1, vec![]), (2, vec![])]));
    }

    #[test]
    fn missing_column_is_an_error() {
        let spec = AggregateSpec::mean_of("Black Box Age");
        let err = DataProcessor::aggregate(&two_subnets(), &spec).unwrap_err();
        assert!(matches!(err, AggregateError::MissingColumn { ref column, .. } if column == "Black Box Age"));
    }

    #[test]
    fn null_target_in_matching_row_is_an_error() {
        let df = DataFrame::new(vec![
            Column::new("Copier Margin".into(), vec![Some(0.0), Some(1.0)]),
            Column::new("Black Box Age".into(), vec![None, Some(4.0)]),
        ])
        .unwrap();
        let datasets = BTreeMap::from([(3, Dataset::new(3, "run_3.csv", df))]);

        let spec = AggregateSpec::mean_of("Black Box Age").where_eq("Copier Margin", 0.0);
        let err = DataProcessor::aggregate(&datasets, &spec).unwrap_err();
        assert!(matches!(err, AggregateError::MissingValue { count: 1, .. }));

        // The null row is filtered out here, so it is never read.
        let spec = AggregateSpec::mean_of("Black Box Age").where_eq("Copier Margin", 1.0);
        let agg = DataProcessor::aggregate(&datasets, &spec).unwrap();
        assert_eq!(agg.by_subnet(), BTreeMap::from([(3, 4.0)]));
    }

    #[test]
    fn grouped_counts_follow_the_filter() {
        let spec = AggregateSpec::mean_of("Encryption Window Length")
            .where_eq("Copier Margin", 0.0)
            .grouped_by("Copier Margin");
        let agg = DataProcessor::aggregate(&two_subnets(), &spec).unwrap();

        let counts: Vec<(u32, usize)> = agg.iter().map(|(k, g)| (k.subnet, g.count)).collect();
        assert_eq!(counts, vec![(1, 2), (2, 1)]);
        assert_eq!(agg.series()[&1], vec![(0.0, 15.0)]);
    }

    #[test]
    fn null_in_filter_column_is_an_error() {
        let df = DataFrame::new(vec![
            Column::new("Copier Margin".into(), vec![None, Some(0.0)]),
            Column::new("Black Box Age".into(), vec![Some(2.0), Some(4.0)]),
        ])
        .unwrap();
        let datasets = BTreeMap::from([(5, Dataset::new(5, "run_5.csv", df))]);

        let spec = AggregateSpec::mean_of("Black Box Age").where_eq("Copier Margin", 0.0);
        let err = DataProcessor::aggregate(&datasets, &spec).unwrap_err();
        assert!(matches!(
            err,
            AggregateError::MissingValue { ref column, count: 1, .. } if column == "Copier Margin"
        ));
    }

    #[test]
    fn integer_columns_are_cast_to_float() {
        let df = DataFrame::new(vec![
            Column::new("Copier Margin".into(), vec![0i64, 0, 2]),
            Column::new("Encryption Window".into(), vec![3i64, 3, 1]),
            Column::new("Gini Coefficient".into(), vec![0.2, 0.4, 0.9]),
        ])
        .unwrap();
        let datasets = BTreeMap::from([(7, Dataset::new(7, "run_7.csv", df))]);

        let spec = AggregateSpec::mean_of("Gini Coefficient")
            .where_eq("Copier Margin", 0.0)
            .grouped_by("Encryption Window");
        let series = DataProcessor::aggregate(&datasets, &spec).unwrap().series();
        assert_eq!(series[&7].len(), 1);
        assert_eq!(series[&7][0].0, 3.0);
        assert!((series[&7][0].1 - 0.3).abs() < 1e-12);
    }

    #[test]
    fn text_column_is_not_numeric() {
        let df = DataFrame::new(vec![Column::new(
            "Black Box Age".into(),
            vec!["old", "new"],
        )])
        .unwrap();
        let datasets = BTreeMap::from([(1, Dataset::new(1, "run_1.csv", df))]);

        let err = DataProcessor::aggregate(&datasets, &AggregateSpec::mean_of("Black Box Age"))
            .unwrap_err();
        assert!(matches!(err, AggregateError::NonNumeric { .. }));
    }

    #[test]
    fn aggregation_is_deterministic() {
        let spec = AggregateSpec::mean_of("Encryption Window Length").grouped_by("Copier Margin");
        let first = DataProcessor::aggregate(&two_subnets(), &spec).unwrap();
        let second = DataProcessor::aggregate(&two_subnets(), &spec).unwrap();
        assert_eq!(first, second);
    }
}

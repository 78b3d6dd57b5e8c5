//! The analyses run by the binaries: load a CSV directory, aggregate, render.
//!
//! Each analysis is split into a `compute_*` step that only touches the
//! input CSVs and a rendering step that writes the PNG.

use crate::charts::{
    BarChart, HeatmapChart, HeatmapGrid, LineChart, PairedBarChart, RenderError,
    StaticChartRenderer,
};
use crate::config::{
    AnalysisConfig, AVERAGE_BY_SUBNET_PNG, GINI_HEATMAP_PNG, MARGIN_SWEEP_PNG,
    OPTIMAL_COMPARISON_PNG,
};
use crate::data::{
    AggregateError, AggregateSpec, DataLoader, DataProcessor, Dataset, LoaderError, RowFilter,
};
use crate::stats::{StatsCalculator, SummaryStats};
use log::info;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

fn load(config: &AnalysisConfig, dir: &Path) -> Result<BTreeMap<u32, Dataset>, LoaderError> {
    let datasets = DataLoader::new(&config.csv_suffix).load_directory(dir)?;
    info!("Loaded {} subnet file(s) from {}", datasets.len(), dir.display());
    Ok(datasets)
}

fn baseline_filter(config: &AnalysisConfig) -> RowFilter {
    RowFilter::new(&config.margin_column, config.baseline_margin)
}

// ---------------------------------------------------------------------------
// Overall average
// ---------------------------------------------------------------------------

/// Mean black box age over every baseline-margin row of every file.
/// `None` when no row matched.
pub fn overall_average(config: &AnalysisConfig) -> Result<Option<f64>, PipelineError> {
    let datasets = load(config, &config.csv_dir)?;
    let filter = baseline_filter(config);
    let values = DataProcessor::collect_values(&datasets, &config.age_column, Some(&filter))?;
    Ok(StatsCalculator::mean(&StatsCalculator::pool(&values)))
}

// ---------------------------------------------------------------------------
// Average window length by subnet
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SubnetAverages {
    pub means: BTreeMap<u32, f64>,
    /// Summary over all pooled rows; `None` when nothing matched
    pub overall: Option<SummaryStats>,
}

pub fn compute_average_by_subnet(
    config: &AnalysisConfig,
) -> Result<SubnetAverages, PipelineError> {
    let datasets = load(config, &config.csv_dir)?;
    let filter = baseline_filter(config);

    let spec = AggregateSpec {
        target: config.window_length_column.clone(),
        filter: Some(filter.clone()),
        group_by: None,
    };
    let means = DataProcessor::aggregate(&datasets, &spec)?.by_subnet();

    let values =
        DataProcessor::collect_values(&datasets, &config.window_length_column, Some(&filter))?;
    let overall = StatsCalculator::compute_descriptive_stats(&StatsCalculator::pool(&values));

    Ok(SubnetAverages { means, overall })
}

/// Bar chart of the mean window length per subnet. Returns the averages and
/// the written file.
pub fn average_by_subnet(
    config: &AnalysisConfig,
) -> Result<(SubnetAverages, PathBuf), PipelineError> {
    let averages = compute_average_by_subnet(config)?;

    let chart = BarChart::new(
        &format!("Average {} by Subnet", config.window_length_column),
        "Subnet",
        &format!("Average {}", config.window_length_column),
    );
    let img = chart.render(&averages.means)?;
    let path = StaticChartRenderer::save_png(&img, &config.output_dir, AVERAGE_BY_SUBNET_PNG)?;

    Ok((averages, path))
}

// ---------------------------------------------------------------------------
// Margin sweep
// ---------------------------------------------------------------------------

/// `(margin, mean age)` per subnet over all rows.
pub fn compute_margin_sweep(
    config: &AnalysisConfig,
) -> Result<BTreeMap<u32, Vec<(f64, f64)>>, PipelineError> {
    let datasets = load(config, &config.csv_dir)?;
    let spec = AggregateSpec::mean_of(&config.age_column).grouped_by(&config.margin_column);
    Ok(DataProcessor::aggregate(&datasets, &spec)?.series())
}

/// Log-log line chart of mean age against margin, one line per subnet.
pub fn margin_sweep(config: &AnalysisConfig) -> Result<PathBuf, PipelineError> {
    let series = compute_margin_sweep(config)?;

    let chart = LineChart::new(
        &format!("Average {} vs {}", config.age_column, config.margin_column),
        &format!("{} (p)", config.margin_column),
        &format!("Average {}", config.age_column),
    )
    .log_log();
    let img = chart.render(&series)?;

    Ok(StaticChartRenderer::save_png(
        &img,
        &config.output_dir,
        MARGIN_SWEEP_PNG,
    )?)
}

// ---------------------------------------------------------------------------
// Gini heatmap
// ---------------------------------------------------------------------------

/// Grid of mean Gini coefficient per (subnet, window) at the baseline margin.
pub fn compute_gini_grid(config: &AnalysisConfig) -> Result<HeatmapGrid, PipelineError> {
    let datasets = load(config, &config.csv_dir)?;
    let spec = AggregateSpec::mean_of(&config.gini_column)
        .where_eq(&config.margin_column, config.baseline_margin)
        .grouped_by(&config.window_column);
    let series = DataProcessor::aggregate(&datasets, &spec)?.series();

    Ok(HeatmapGrid::from_series(&series, config.smoothing_window)?)
}

pub fn gini_heatmap(config: &AnalysisConfig) -> Result<(HeatmapGrid, PathBuf), PipelineError> {
    let grid = compute_gini_grid(config)?;

    let mut chart = HeatmapChart::new(
        &format!(
            "Balanced {} vs {} Across Subnets",
            config.gini_column, config.window_length_column
        ),
        &config.window_length_column,
        "Subnets",
        &format!("Smoothed {}", config.gini_column),
    );
    chart.description = vec![
        "Data Processing:".to_string(),
        format!(
            "1. Raw {} plotted against {} for each subnet",
            config.gini_column, config.window_length_column
        ),
        format!(
            "2. Light smoothing applied with a centered moving average (window size of {})",
            config.smoothing_window
        ),
        "3. White spaces indicate no data available".to_string(),
        "4. Hatched areas represent interpolated values".to_string(),
        format!("5. Color intensity represents smoothed {} values", config.gini_column),
    ];

    let img = chart.render(&grid)?;
    let path = StaticChartRenderer::save_png(&img, &config.output_dir, GINI_HEATMAP_PNG)?;
    Ok((grid, path))
}

// ---------------------------------------------------------------------------
// Optimal vs non-optimal
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub optimal: BTreeMap<u32, f64>,
    pub non_optimal: BTreeMap<u32, f64>,
}

/// Mean window length per subnet over all rows of each directory.
pub fn compute_optimal_comparison(config: &AnalysisConfig) -> Result<Comparison, PipelineError> {
    let spec = AggregateSpec::mean_of(&config.window_length_column);
    let optimal = DataProcessor::aggregate(&load(config, &config.optimal_dir)?, &spec)?;
    let non_optimal = DataProcessor::aggregate(&load(config, &config.non_optimal_dir)?, &spec)?;

    Ok(Comparison {
        optimal: optimal.by_subnet(),
        non_optimal: non_optimal.by_subnet(),
    })
}

pub fn optimal_comparison(config: &AnalysisConfig) -> Result<PathBuf, PipelineError> {
    let comparison = compute_optimal_comparison(config)?;

    let chart = PairedBarChart::new(
        &format!(
            "Comparison of Average {} by Subnet: Optimal vs Non-Optimal",
            config.window_length_column
        ),
        "Subnet",
        &format!("Average {}", config.window_length_column),
        "Optimal",
        "Non-Optimal",
    );
    let img = chart.render(&comparison.optimal, &comparison.non_optimal)?;

    Ok(StaticChartRenderer::save_png(
        &img,
        &config.output_dir,
        OPTIMAL_COMPARISON_PNG,
    )?)
}

//! Heatmap of the smoothed Gini Coefficient per subnet and encryption window.

use anyhow::{Context, Result};
use env_logger::Env;
use subnet_charts::config::AnalysisConfig;
use subnet_charts::pipelines;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AnalysisConfig::load()?;
    let (grid, path) = pipelines::gini_heatmap(&config)
        .with_context(|| format!("plotting heatmap from {}", config.csv_dir.display()))?;
    println!(
        "Balanced heatmap analysis saved as {} ({:.2}% of {} cells filled)",
        path.display(),
        grid.density_percent(),
        grid.total_cells()
    );
    Ok(())
}

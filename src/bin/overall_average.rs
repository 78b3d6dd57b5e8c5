//! Mean Black Box Age at the baseline copier margin, pooled over every
//! subnet file.

use anyhow::{Context, Result};
use env_logger::Env;
use subnet_charts::config::AnalysisConfig;
use subnet_charts::pipelines;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AnalysisConfig::load()?;
    let average = pipelines::overall_average(&config)
        .with_context(|| format!("averaging CSVs in {}", config.csv_dir.display()))?;

    match average {
        Some(avg) => println!(
            "The average {} (for copier margin {}) is: {:.2}",
            config.age_column, config.baseline_margin, avg
        ),
        None => println!(
            "No rows with copier margin {} found in {}",
            config.baseline_margin,
            config.csv_dir.display()
        ),
    }
    Ok(())
}

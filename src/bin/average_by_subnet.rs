//! Bar chart of the mean Encryption Window Length per subnet, plus overall
//! statistics across all subnets.

use anyhow::{Context, Result};
use env_logger::Env;
use subnet_charts::config::AnalysisConfig;
use subnet_charts::pipelines;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AnalysisConfig::load()?;
    let (averages, path) = pipelines::average_by_subnet(&config)
        .with_context(|| format!("plotting averages from {}", config.csv_dir.display()))?;
    println!("Plot saved as {}", path.display());

    let column = &config.window_length_column;
    match averages.overall {
        Some(stats) => {
            println!("\nOverall statistics:");
            println!("Average {column} across all subnets: {:.2}", stats.mean);
            println!("Median {column} across all subnets: {:.2}", stats.median);
            println!("Maximum {column} across all subnets: {:.2}", stats.max);
            println!("Minimum {column} across all subnets: {:.2}", stats.min);
        }
        None => println!("\nNo {column} values to summarize"),
    }
    Ok(())
}

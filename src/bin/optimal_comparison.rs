//! Paired bar chart comparing mean Encryption Window Length per subnet
//! between optimal and non-optimal runs.

use anyhow::{Context, Result};
use env_logger::Env;
use subnet_charts::config::AnalysisConfig;
use subnet_charts::pipelines;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AnalysisConfig::load()?;
    let path = pipelines::optimal_comparison(&config).with_context(|| {
        format!(
            "comparing {} with {}",
            config.optimal_dir.display(),
            config.non_optimal_dir.display()
        )
    })?;
    println!("Bar plot saved as {}", path.display());
    Ok(())
}

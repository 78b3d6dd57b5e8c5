//! Log-log line chart of mean Black Box Age against Copier Margin, one line
//! per subnet.

use anyhow::{Context, Result};
use env_logger::Env;
use subnet_charts::config::AnalysisConfig;
use subnet_charts::pipelines;

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let config = AnalysisConfig::load()?;
    let path = pipelines::margin_sweep(&config)
        .with_context(|| format!("plotting margin sweep from {}", config.csv_dir.display()))?;
    println!("Plot saved as {}", path.display());
    Ok(())
}

// src/bin/rebuild.rs
//
// Re-export the consolidated table from the per-year JSON files already under
// `<data-dir>/census-json`, without calling the API.

use anyhow::Result;
use censusscraper::{pipeline, Config};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let config = Config::from_env()?;
    info!(dir = %config.json_dir().display(), "rebuilding from cached JSON");

    let summary = pipeline::rebuild(&config)?;
    info!(
        merged = ?summary.merged_years,
        skipped = ?summary.skipped_years,
        rows = summary.rows,
        "rebuild done"
    );
    Ok(())
}

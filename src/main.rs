use anyhow::Result;
use censusscraper::{pipeline, Config};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) configure ────────────────────────────────────────────────
    let config = Config::from_env()?;
    info!(config = %serde_json::to_string(&config)?, "configured");

    // ─── 3) fetch, persist, merge, export ────────────────────────────
    let summary = pipeline::run(&config)?;

    info!(
        merged = summary.merged_years.len(),
        skipped = summary.skipped_years.len(),
        rows = summary.rows,
        "all done"
    );
    Ok(())
}

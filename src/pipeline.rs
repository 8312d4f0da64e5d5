// src/pipeline.rs

use anyhow::Result;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::export;
use crate::fetch::YearFetcher;
use crate::persist;
use crate::process::reshape_year;
use crate::table::ResultTable;

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub merged_years: Vec<i32>,
    /// Years that contributed at least one row to the export.
    pub row_years: Vec<i32>,
    pub skipped_years: Vec<i32>,
    pub rows: usize,
    pub csv_path: PathBuf,
    pub parquet_path: Option<PathBuf>,
}

/// Data rows only; the header row is not counted.
fn record_count(payload: &Value) -> usize {
    payload
        .as_array()
        .map(|rows| rows.len().saturating_sub(1))
        .unwrap_or(0)
}

fn no_records(year: i32, err: &anyhow::Error, skipped: &mut Vec<i32>) {
    warn!(year, error = %format!("{:#}", err), "year skipped");
    info!("Found no records in {}", year);
    skipped.push(year);
}

/// Reshape `payload` and merge it, or note the year as skipped.
fn merge_year(
    table: &mut ResultTable,
    payload: &Value,
    year: i32,
    merged: &mut Vec<i32>,
    skipped: &mut Vec<i32>,
) -> Result<()> {
    match reshape_year(payload, year) {
        Ok(batch) => {
            table.append(batch)?;
            info!("Successfully merged in the {} data", year);
            merged.push(year);
        }
        Err(e) => no_records(year, &e, skipped),
    }
    Ok(())
}

fn finish(config: &Config, table: ResultTable, merged: Vec<i32>, skipped: Vec<i32>) -> Result<RunSummary> {
    let rows = table.num_rows();
    let row_years = table.years().into_iter().collect();
    let batch = export::rename_for_export(&table.finish()?)?;

    let csv_path = config.csv_path();
    export::write_csv(&batch, &csv_path)?;
    info!("Wrote data to {}", csv_path.display());

    let parquet_path = if config.export_parquet {
        let path = config.parquet_path();
        export::write_parquet(&batch, &path)?;
        info!("Wrote data to {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(RunSummary {
        merged_years: merged,
        row_years,
        skipped_years: skipped,
        rows,
        csv_path,
        parquet_path,
    })
}

/// Fetch every configured year, persist the raw payloads and export the
/// merged table.
///
/// A year that fails to fetch, decode or reshape is logged and left out.
/// Filesystem errors end the run.
#[instrument(level = "info", skip(config), fields(first = config.first_year, last = config.last_year))]
pub fn run(config: &Config) -> Result<RunSummary> {
    let fetcher = YearFetcher::new(config)?;
    let json_dir = config.json_dir();
    let stem = config.file_stem();

    let mut table = ResultTable::new();
    let mut merged = Vec::new();
    let mut skipped = Vec::new();

    for year in config.years() {
        let payload = match fetcher.fetch_year(year) {
            Ok(p) => p,
            Err(e) => {
                no_records(year, &e, &mut skipped);
                continue;
            }
        };
        info!("Found {} records in {}", record_count(&payload), year);

        let path = persist::write_year_json(&json_dir, &stem, year, &payload)?;
        info!("Wrote JSON Object to {}", path.display());

        merge_year(&mut table, &payload, year, &mut merged, &mut skipped)?;
    }

    finish(config, table, merged, skipped)
}

/// Rebuild the export from the per-year JSON already on disk, without
/// touching the network. Only files for years in the configured range are
/// used.
#[instrument(level = "info", skip(config))]
pub fn rebuild(config: &Config) -> Result<RunSummary> {
    let files = persist::list_year_files(&config.json_dir(), &config.file_stem())?;
    let range = config.years();

    let mut table = ResultTable::new();
    let mut merged = Vec::new();
    let mut skipped = Vec::new();

    for (year, path) in files.into_iter().filter(|(y, _)| range.contains(y)) {
        let payload = match persist::read_year_json(&path) {
            Ok(p) => p,
            Err(e) => {
                no_records(year, &e, &mut skipped);
                continue;
            }
        };
        info!("Found {} records in {}", record_count(&payload), path.display());
        merge_year(&mut table, &payload, year, &mut merged, &mut skipped)?;
    }

    finish(config, table, merged, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn record_count_excludes_header() {
        assert_eq!(record_count(&json!([["NAME"], ["a"], ["b"]])), 2);
        assert_eq!(record_count(&json!([["NAME"]])), 0);
        assert_eq!(record_count(&json!([])), 0);
    }

    #[test]
    fn failed_reshape_leaves_table_untouched() {
        let mut table = ResultTable::new();
        let (mut merged, mut skipped) = (Vec::new(), Vec::new());
        let bad = json!([
            ["NAME", "B01003_001E", "B19013_001E", "state", "place"],
            ["Adak city, Alaska", "300", "60000", "02", "00065"],
            ["Akhiok city, Alaska", "oops", "40000", "02", "00140"]
        ]);
        merge_year(&mut table, &bad, 2007, &mut merged, &mut skipped).unwrap();
        assert_eq!(table.num_rows(), 0);
        assert!(merged.is_empty());
        assert_eq!(skipped, vec![2007]);
    }
}

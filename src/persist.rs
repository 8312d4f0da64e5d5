// src/persist.rs

use anyhow::{Context, Result};
use glob::{glob, Pattern};
use regex::Regex;
use serde_json::Value;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{trace, warn};

/// `<json_dir>/<stem>-<year>.json`
pub fn year_json_path(json_dir: &Path, stem: &str, year: i32) -> PathBuf {
    json_dir.join(format!("{}-{}.json", stem, year))
}

/// Write the raw payload for `year`, replacing any earlier copy.
pub fn write_year_json(json_dir: &Path, stem: &str, year: i32, payload: &Value) -> Result<PathBuf> {
    fs::create_dir_all(json_dir).with_context(|| format!("creating {:?}", json_dir))?;
    let path = year_json_path(json_dir, stem, year);
    let json = serde_json::to_string(payload).context("serializing JSON")?;
    fs::write(&path, json).with_context(|| format!("writing {:?}", path))?;
    Ok(path)
}

pub fn read_year_json(path: &Path) -> Result<Value> {
    let f = fs::File::open(path).with_context(|| format!("opening {:?}", path))?;
    serde_json::from_reader(std::io::BufReader::new(f))
        .with_context(|| format!("parsing {:?}", path))
}

/// All persisted `<stem>-<YYYY>.json` files under `json_dir`, sorted by year.
pub fn list_year_files(json_dir: &Path, stem: &str) -> Result<Vec<(i32, PathBuf)>> {
    let re = Regex::new(&format!(r"^{}-(\d{{4}})\.json$", regex::escape(stem)))?;
    // the directory and stem are literal; only the year part is a wildcard
    let pattern = format!(
        "{}/{}-*.json",
        Pattern::escape(&json_dir.display().to_string()),
        Pattern::escape(stem)
    );

    let mut out = Vec::new();
    for entry in glob(&pattern).with_context(|| format!("bad glob pattern {}", pattern))? {
        let path = match entry {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "unreadable entry");
                continue;
            }
        };
        let year = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| re.captures(n))
            .and_then(|caps| caps[1].parse::<i32>().ok());
        match year {
            Some(y) => out.push((y, path)),
            None => trace!(path = %path.display(), "not a year file"),
        }
    }
    out.sort_by_key(|(y, _)| *y);
    Ok(out)
}

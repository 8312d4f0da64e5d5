// src/config.rs

use anyhow::{Context, Result};
use serde::Serialize;
use std::{
    fmt, fs,
    ops::RangeInclusive,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

pub const DEFAULT_HOST: &str = "https://api.census.gov/data/";
pub const DEFAULT_DATASET: &str = "acs/acs5";
pub const DEFAULT_DATA_DIR: &str = ".data";
/// Alaska.
pub const DEFAULT_STATE_CODE: &str = "02";
pub const DEFAULT_STATE_ABBREV: &str = "ak";
pub const FIRST_YEAR: i32 = 2001;
pub const LAST_YEAR: i32 = 2021;

const KEY_FILE_NAME: &str = "census-api-key";

/// Query-string suffix carrying the API key, always of the form `&key=...`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(Option<String>);

impl Credential {
    pub fn none() -> Self {
        Self(None)
    }

    /// Accepts `&key=abc`, `key=abc` or a bare `abc`.
    pub fn from_raw(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            Self(None)
        } else if raw.starts_with('&') {
            Self(Some(raw.to_string()))
        } else if raw.contains('=') {
            Self(Some(format!("&{}", raw)))
        } else {
            Self(Some(format!("&key={}", raw)))
        }
    }

    /// Read the credential from `path`; a missing file means no credential.
    pub fn from_file(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(s) => Ok(Self::from_raw(&s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self(None)),
            Err(e) => Err(e).with_context(|| format!("reading credential {:?}", path)),
        }
    }

    pub fn query_suffix(&self) -> &str {
        self.0.as_deref().unwrap_or("")
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Credential(<redacted>)"),
            None => f.write_str("Credential(None)"),
        }
    }
}

/// Everything a run needs. The defaults reproduce the Alaska ACS 5-year pull.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Base URL, ending in `/`; the year is appended directly.
    pub host: String,
    /// Dataset path below the year, e.g. `acs/acs5`.
    pub dataset: String,
    pub state_code: String,
    pub state_abbrev: String,
    pub first_year: i32,
    pub last_year: i32,
    pub data_dir: PathBuf,
    pub export_parquet: bool,
    #[serde(skip)]
    pub credential: Credential,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            dataset: DEFAULT_DATASET.to_string(),
            state_code: DEFAULT_STATE_CODE.to_string(),
            state_abbrev: DEFAULT_STATE_ABBREV.to_string(),
            first_year: FIRST_YEAR,
            last_year: LAST_YEAR,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            export_parquet: false,
            credential: Credential::none(),
        }
    }
}

impl Config {
    /// Build from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any variable lookup:
    /// - `CENSUS_DATA_DIR`, `CENSUS_API_HOST`
    /// - `CENSUS_API_KEY`, else the file named by `CENSUS_API_KEY_FILE`
    ///   (default `<data-dir>/census-api-key`)
    /// - `CENSUS_EXPORT_PARQUET` (`1` / `true`)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();

        if let Some(dir) = lookup("CENSUS_DATA_DIR").filter(|s| !s.trim().is_empty()) {
            cfg.data_dir = PathBuf::from(dir);
        }
        if let Some(host) = lookup("CENSUS_API_HOST").filter(|s| !s.trim().is_empty()) {
            cfg.host = if host.ends_with('/') {
                host
            } else {
                format!("{}/", host)
            };
        }
        cfg.export_parquet = lookup("CENSUS_EXPORT_PARQUET")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        cfg.credential = match lookup("CENSUS_API_KEY") {
            Some(raw) => Credential::from_raw(&raw),
            None => {
                let path = lookup("CENSUS_API_KEY_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| cfg.data_dir.join(KEY_FILE_NAME));
                debug!(path = %path.display(), "loading credential file");
                Credential::from_file(&path)?
            }
        };
        if !cfg.credential.is_set() {
            warn!("no census API key configured; requests go out unauthenticated");
        }

        Ok(cfg)
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.first_year..=self.last_year
    }

    /// Last path segment of the dataset, e.g. `acs5`.
    pub fn dataset_short_name(&self) -> &str {
        self.dataset
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.dataset)
    }

    /// Prefix shared by every per-year JSON file, e.g. `acs5-ak-place`.
    pub fn file_stem(&self) -> String {
        format!("{}-{}-place", self.dataset_short_name(), self.state_abbrev)
    }

    pub fn json_dir(&self) -> PathBuf {
        self.data_dir.join("census-json")
    }

    /// `<data-dir>/us-census-acs5yr-ak.csv` for the defaults.
    pub fn csv_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.csv", self.export_stem()))
    }

    pub fn parquet_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.parquet", self.export_stem()))
    }

    fn export_stem(&self) -> String {
        format!(
            "us-census-{}yr-{}",
            self.dataset_short_name(),
            self.state_abbrev
        )
    }
}

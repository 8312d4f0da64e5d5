// src/fetch/years.rs
use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::debug;

use super::urls::year_url;
use crate::config::Config;

/// Issues one blocking GET per survey year.
pub struct YearFetcher<'a> {
    client: Client,
    config: &'a Config,
}

impl<'a> YearFetcher<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building HTTP client")?;
        Ok(Self { client, config })
    }

    /// Fetch and decode the payload for `year`.
    ///
    /// Network errors, non-success statuses and bodies that are not a JSON
    /// array all come back as `Err`.
    pub fn fetch_year(&self, year: i32) -> Result<Value> {
        let url = year_url(self.config, year)?;
        debug!(year, path = url.path(), "GET");

        // reqwest errors embed the request URL; strip it before it reaches a log line
        let payload: Value = self
            .client
            .get(url.clone())
            .send()
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("GET {} failed", url.path()))?
            .error_for_status()
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Non-success status for {}", year))?
            .json()
            .map_err(reqwest::Error::without_url)
            .with_context(|| format!("Decoding JSON body for {}", year))?;

        anyhow::ensure!(
            payload.is_array(),
            "payload for {} is not a JSON array",
            year
        );
        Ok(payload)
    }
}

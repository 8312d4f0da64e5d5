// src/fetch/urls.rs
use anyhow::{Context, Result};
use url::Url;

use crate::config::Config;
use crate::schema::REQUESTED_VARS;

/// `{host}{year}/{dataset}?get=NAME,...&for=place:*&in=state:{code}{credential}`
///
/// The credential suffix is appended verbatim; it already starts with `&`.
pub fn year_url(config: &Config, year: i32) -> Result<Url> {
    let raw = format!(
        "{host}{year}/{dataset}?get={vars}&for=place:*&in=state:{state}{key}",
        host = config.host,
        year = year,
        dataset = config.dataset.trim_matches('/'),
        vars = REQUESTED_VARS.join(","),
        state = config.state_code,
        key = config.credential.query_suffix(),
    );
    Url::parse(&raw).with_context(|| format!("building query URL for {}", year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Credential;

    #[test]
    fn default_url_shape() {
        let cfg = Config::default();
        let url = year_url(&cfg, 2020).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.census.gov/data/2020/acs/acs5?get=NAME,B01003_001E,B19013_001E&for=place:*&in=state:02"
        );
    }

    #[test]
    fn credential_is_appended() {
        let cfg = Config {
            credential: Credential::from_raw("&key=abc123"),
            ..Config::default()
        };
        let url = year_url(&cfg, 2009).unwrap();
        assert!(url.as_str().ends_with("&in=state:02&key=abc123"));
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[0], ("get".into(), "NAME,B01003_001E,B19013_001E".into()));
        assert_eq!(pairs[3], ("key".into(), "abc123".into()));
    }

    #[test]
    fn year_lands_in_the_path() {
        let url = year_url(&Config::default(), 2013).unwrap();
        assert_eq!(url.path(), "/data/2013/acs/acs5");
    }
}

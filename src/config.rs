// src/config.rs

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::{env, fs, path::PathBuf, time::Duration};
use url::Url;

use crate::{poller::DEFAULT_INTERVAL, process::DEFAULT_DELIMITER};

pub const CONFIG_ENV: &str = "TOURBOARD_CONFIG";
pub const URL_ENV: &str = "TOURBOARD_URL";
pub const INTERVAL_ENV: &str = "TOURBOARD_INTERVAL_SECS";
pub const MARKER_PATH_ENV: &str = "TOURBOARD_MARKER_PATH";
pub const SNAPSHOT_PATH_ENV: &str = "TOURBOARD_SNAPSHOT_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub source_url: Url,
    pub poll_interval: Duration,
    pub delimiter: char,
    pub marker_path: PathBuf,
    pub snapshot_path: PathBuf,
}

/// On-disk form; every field optional so env vars can fill the gaps.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    source_url: Option<Url>,
    poll_interval_secs: Option<u64>,
    delimiter: Option<char>,
    marker_path: Option<PathBuf>,
    snapshot_path: Option<PathBuf>,
}

impl Config {
    /// YAML file named by `TOURBOARD_CONFIG` (if set), then env overrides.
    pub fn load() -> Result<Self> {
        let raw = match env::var(CONFIG_ENV) {
            Ok(path) => {
                let text = fs::read_to_string(&path)
                    .with_context(|| format!("reading config file {}", path))?;
                Self::parse_yaml(&text).with_context(|| format!("parsing config file {}", path))?
            }
            Err(_) => RawConfig::default(),
        };
        Self::resolve(raw, |key| env::var(key).ok())
    }

    fn parse_yaml(text: &str) -> Result<RawConfig> {
        if text.trim().is_empty() {
            return Ok(RawConfig::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    fn resolve(mut raw: RawConfig, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = var(URL_ENV) {
            raw.source_url = Some(Url::parse(&url).with_context(|| format!("{} is not a URL", URL_ENV))?);
        }
        if let Some(secs) = var(INTERVAL_ENV) {
            raw.poll_interval_secs = Some(
                secs.trim()
                    .parse::<u64>()
                    .with_context(|| format!("{} must be a whole number of seconds", INTERVAL_ENV))?,
            );
        }
        if let Some(path) = var(MARKER_PATH_ENV) {
            raw.marker_path = Some(path.into());
        }
        if let Some(path) = var(SNAPSHOT_PATH_ENV) {
            raw.snapshot_path = Some(path.into());
        }

        let source_url = raw
            .source_url
            .ok_or_else(|| anyhow!("no data source URL; set {} or source_url", URL_ENV))?;
        let poll_interval = match raw.poll_interval_secs {
            Some(0) => bail!("poll interval must be at least one second"),
            Some(secs) => Duration::from_secs(secs),
            None => DEFAULT_INTERVAL,
        };

        Ok(Self {
            source_url,
            poll_interval,
            delimiter: raw.delimiter.unwrap_or(DEFAULT_DELIMITER),
            marker_path: raw
                .marker_path
                .unwrap_or_else(|| PathBuf::from("state/last_update.json")),
            snapshot_path: raw
                .snapshot_path
                .unwrap_or_else(|| PathBuf::from("dashboard.json")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_url_is_given() {
        let cfg = Config::resolve(
            RawConfig::default(),
            vars(&[(URL_ENV, "https://example.com/export.csv")]),
        )
        .unwrap();
        assert_eq!(cfg.source_url.as_str(), "https://example.com/export.csv");
        assert_eq!(cfg.poll_interval, Duration::from_secs(30));
        assert_eq!(cfg.delimiter, ',');
        assert_eq!(cfg.marker_path, PathBuf::from("state/last_update.json"));
        assert_eq!(cfg.snapshot_path, PathBuf::from("dashboard.json"));
    }

    #[test]
    fn yaml_values_are_read_and_env_overrides_them() {
        let raw = Config::parse_yaml(
            "source_url: https://example.com/a.csv\npoll_interval_secs: 60\ndelimiter: \";\"\nmarker_path: /tmp/m.json\n",
        )
        .unwrap();
        let cfg = Config::resolve(raw, vars(&[(INTERVAL_ENV, "15")])).unwrap();
        assert_eq!(cfg.source_url.as_str(), "https://example.com/a.csv");
        assert_eq!(cfg.poll_interval, Duration::from_secs(15));
        assert_eq!(cfg.delimiter, ';');
        assert_eq!(cfg.marker_path, PathBuf::from("/tmp/m.json"));
    }

    #[test]
    fn missing_url_is_an_error() {
        let err = Config::resolve(RawConfig::default(), vars(&[])).unwrap_err();
        assert!(err.to_string().contains(URL_ENV));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert!(Config::resolve(RawConfig::default(), vars(&[(URL_ENV, "not a url")])).is_err());
        assert!(Config::resolve(
            RawConfig::default(),
            vars(&[(URL_ENV, "https://example.com"), (INTERVAL_ENV, "soon")])
        )
        .is_err());
        assert!(Config::resolve(
            RawConfig::default(),
            vars(&[(URL_ENV, "https://example.com"), (INTERVAL_ENV, "0")])
        )
        .is_err());
        assert!(Config::parse_yaml("surprise: true\n").is_err());
    }

    #[test]
    fn empty_yaml_is_allowed() {
        let raw = Config::parse_yaml("\n").unwrap();
        assert!(raw.source_url.is_none());
    }
}

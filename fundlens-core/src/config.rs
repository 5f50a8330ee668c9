//! Runtime configuration: API endpoint and page sizes.
//!
//! Loaded from `<config_dir>/fundlens/config.toml` (or an explicit path), with
//! environment overrides applied last. Every field has a default so an empty
//! or missing file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ENV_BASE_URL: &str = "FUNDLENS_API_BASE_URL";
pub const ENV_TIMEOUT_SECS: &str = "FUNDLENS_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value '{value}' for {var}")]
    InvalidEnv { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".into(),
            timeout_secs: 15,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

/// Request sizes for each page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageLimits {
    pub overview_limit: u32,
    pub top10_size: u32,
    pub search_top_n: u32,
    pub exchange_top_n: u32,
    pub history_limit: u32,
    pub aggregate_limit: u32,
    pub arbitrage_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            overview_limit: 50,
            top10_size: 10,
            search_top_n: 50,
            exchange_top_n: 50,
            history_limit: 100,
            aggregate_limit: 1000,
            arbitrage_limit: 10,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub pages: PageLimits,
}

impl Config {
    /// `<config_dir>/fundlens/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("fundlens").join("config.toml"))
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Resolve configuration for a binary.
    ///
    /// An explicit path must exist; the default path is optional. Environment
    /// overrides are applied on top of whichever was used.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Apply `FUNDLENS_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            self.api.timeout_secs = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_TIMEOUT_SECS,
                value: raw.clone(),
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.api.base_url, "http://localhost:8000");
        assert_eq!(cfg.api.timeout(), Duration::from_secs(15));
        assert_eq!(cfg.pages.top10_size, 10);
        assert_eq!(cfg.pages.aggregate_limit, 1000);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = Config::from_toml(
            r#"
            [api]
            base_url = "https://funding.example.com"

            [pages]
            search_top_n = 25
            "#,
        )
        .unwrap();
        assert_eq!(cfg.api.base_url, "https://funding.example.com");
        assert_eq!(cfg.api.timeout_secs, 15);
        assert_eq!(cfg.pages.search_top_n, 25);
        assert_eq!(cfg.pages.exchange_top_n, 50);
    }

    #[test]
    fn env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_BASE_URL, " http://10.0.0.5:9000 "),
            (ENV_TIMEOUT_SECS, "3"),
        ]
        .into_iter()
        .collect();
        let mut cfg = Config::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.api.base_url, "http://10.0.0.5:9000");
        assert_eq!(cfg.api.timeout_secs, 3);
    }

    #[test]
    fn bad_timeout_env_is_rejected() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_env(|k| (k == ENV_TIMEOUT_SECS).then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { .. }));
    }

    #[test]
    fn file_roundtrip_and_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.pages.history_limit = 42;
        std::fs::write(&path, cfg.to_toml().unwrap()).unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), cfg);

        std::fs::write(&path, "[api\nbroken").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(ConfigError::Parse { .. })
        ));

        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::Io { .. })
        ));
    }
}

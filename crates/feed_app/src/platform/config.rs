//! Application configuration: `feed.ron` first, then `FEED_*` environment overrides.

use std::fs;
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use feed_engine::{EngineSettings, FetchSettings, DEFAULT_LIMIT, DEFAULT_POLL_INTERVAL};
use feed_logging::feed_warn;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "feed.ron";

/// Largest page the events endpoint serves.
pub const MAX_LIMIT: u32 = 100;

const ENV_BACKEND_URL: &str = "FEED_BACKEND_URL";
const ENV_LIMIT: &str = "FEED_EVENTS_LIMIT";
const ENV_POLL_INTERVAL_MS: &str = "FEED_POLL_INTERVAL_MS";
const ENV_REQUEST_TIMEOUT_MS: &str = "FEED_REQUEST_TIMEOUT_MS";
const ENV_LOG_LEVEL: &str = "FEED_LOG_LEVEL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
    #[error("unknown log level {0:?}")]
    InvalidLogLevel(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub backend_url: Option<String>,
    pub limit: u32,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub log_level: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            backend_url: None,
            limit: DEFAULT_LIMIT,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            request_timeout_ms: FetchSettings::default().request_timeout.as_millis() as u64,
            log_level: "info".to_string(),
        }
    }
}

impl FeedConfig {
    /// Reads the file at `path` and applies process environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_file(path)?.with_env(|var| std::env::var(var).ok())
    }

    /// A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn with_env(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            self.backend_url = Some(url);
        }
        if let Some(value) = lookup(ENV_LIMIT) {
            self.limit = parse_env(ENV_LIMIT, value)?;
        }
        if let Some(value) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = parse_env(ENV_POLL_INTERVAL_MS, value)?;
        }
        if let Some(value) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            self.request_timeout_ms = parse_env(ENV_REQUEST_TIMEOUT_MS, value)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        Ok(self)
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(self.log_level.trim())
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }

    pub fn engine_settings(&self) -> Result<EngineSettings, ConfigError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        Ok(EngineSettings {
            limit: clamp_limit(self.limit),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        })
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            ..FetchSettings::default()
        }
    }
}

/// Clamps a requested page size into `1..=MAX_LIMIT`.
pub fn clamp_limit(requested: u32) -> NonZeroU32 {
    let clamped = requested.clamp(1, MAX_LIMIT);
    if clamped != requested {
        feed_warn!("events limit {requested} out of range, using {clamped}");
    }
    NonZeroU32::new(clamped).unwrap_or(NonZeroU32::MIN)
}

fn parse_env<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = FeedConfig::from_file(&dir.path().join(CONFIG_FILENAME)).unwrap();
        assert_eq!(config, FeedConfig::default());
        assert_eq!(config.limit, 20);
        assert_eq!(config.poll_interval_ms, 15_000);
        assert_eq!(config.backend_url, None);
    }

    #[test]
    fn file_values_are_partial() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(
            &path,
            r#"(backend_url: Some("http://localhost:5000"), limit: 50)"#,
        )
        .unwrap();

        let config = FeedConfig::from_file(&path).unwrap();
        assert_eq!(config.backend_url.as_deref(), Some("http://localhost:5000"));
        assert_eq!(config.limit, 50);
        assert_eq!(config.poll_interval_ms, 15_000);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);
        fs::write(&path, "(limit: \"many\")").unwrap();

        let err = FeedConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "{err}");
    }

    #[test]
    fn env_overrides_file_values() {
        let config = FeedConfig {
            backend_url: Some("http://file".to_string()),
            ..FeedConfig::default()
        }
        .with_env(env(&[
            ("FEED_BACKEND_URL", "http://env:8080"),
            ("FEED_EVENTS_LIMIT", " 30 "),
            ("FEED_POLL_INTERVAL_MS", "5000"),
            ("FEED_LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.backend_url.as_deref(), Some("http://env:8080"));
        assert_eq!(config.limit, 30);
        assert_eq!(config.poll_interval_ms, 5000);
        assert_eq!(config.request_timeout_ms, 10_000);
        assert_eq!(config.log_level().unwrap(), LevelFilter::Debug);
    }

    #[test]
    fn unparsable_env_value_is_rejected() {
        let err = FeedConfig::default()
            .with_env(env(&[("FEED_EVENTS_LIMIT", "twenty")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                var: "FEED_EVENTS_LIMIT",
                ..
            }
        ));
    }

    #[test]
    fn limit_is_clamped_to_endpoint_range() {
        assert_eq!(clamp_limit(0).get(), 1);
        assert_eq!(clamp_limit(20).get(), 20);
        assert_eq!(clamp_limit(100).get(), 100);
        assert_eq!(clamp_limit(500).get(), 100);
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let config = FeedConfig {
            poll_interval_ms: 0,
            ..FeedConfig::default()
        };
        assert!(matches!(
            config.engine_settings(),
            Err(ConfigError::ZeroPollInterval)
        ));
    }

    #[test]
    fn settings_carry_configured_values() {
        let config = FeedConfig {
            limit: 250,
            poll_interval_ms: 2_000,
            request_timeout_ms: 750,
            ..FeedConfig::default()
        };
        let engine = config.engine_settings().unwrap();
        assert_eq!(engine.limit.get(), 100);
        assert_eq!(engine.poll_interval, Duration::from_secs(2));
        assert_eq!(
            config.fetch_settings().request_timeout,
            Duration::from_millis(750)
        );
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let config = FeedConfig {
            log_level: "loud".to_string(),
            ..FeedConfig::default()
        };
        assert!(matches!(
            config.log_level(),
            Err(ConfigError::InvalidLogLevel(_))
        ));
    }
}

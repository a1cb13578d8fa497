use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::apod::DEFAULT_FEED_URL;

const DEFAULT_ENV_PREFIX: &str = "APOD_TUI";
pub const MIN_COLUMNS: usize = 1;
pub const MAX_COLUMNS: usize = 6;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub ui: UIConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedConfig {
    #[serde(default = "default_feed_url")]
    pub url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default, with = "humantime_serde")]
    pub timeout: Option<Duration>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_feed_url(),
            user_agent: default_user_agent(),
            timeout: None,
        }
    }
}

fn default_feed_url() -> String {
    DEFAULT_FEED_URL.to_string()
}

fn default_user_agent() -> String {
    format!("apod-tui/{}", crate::VERSION)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UIConfig {
    #[serde(default = "default_columns")]
    pub columns: usize,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            columns: default_columns(),
        }
    }
}

fn default_columns() -> usize {
    3
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub config_file: Option<PathBuf>,
    pub env_prefix: Option<String>,
}

pub fn load(options: LoadOptions) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(path) = options.config_file.as_ref() {
        let from_file = read_config_file(path)?;
        cfg = merge_config(cfg, from_file);
    } else if let Some(default_path) = default_config_path() {
        if default_path.exists() {
            let from_file = read_config_file(&default_path)?;
            cfg = merge_config(cfg, from_file);
        }
    }

    let prefix = options.env_prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX);
    cfg = apply_env(cfg, prefix);
    cfg.ui.columns = cfg.ui.columns.clamp(MIN_COLUMNS, MAX_COLUMNS);

    Ok(cfg)
}

fn read_config_file(path: &Path) -> Result<Config> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let config: Config = serde_yaml::from_str(&data)
        .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
    Ok(config)
}

fn merge_config(mut base: Config, other: Config) -> Config {
    if !other.feed.url.trim().is_empty() {
        base.feed.url = other.feed.url;
    }
    if !other.feed.user_agent.trim().is_empty() {
        base.feed.user_agent = other.feed.user_agent;
    }
    if other.feed.timeout.is_some() {
        base.feed.timeout = other.feed.timeout;
    }

    if other.ui.columns != 0 {
        base.ui.columns = other.ui.columns;
    }

    if !other.log.level.trim().is_empty() {
        base.log.level = other.log.level;
    }
    if other.log.file.is_some() {
        base.log.file = other.log.file;
    }

    base
}

fn apply_env(mut cfg: Config, prefix: &str) -> Config {
    let mut map: HashMap<String, String> = HashMap::new();
    let upper_prefix = format!("{}_", prefix.to_uppercase());

    for (key, value) in env::vars() {
        if let Some(stripped) = key.strip_prefix(&upper_prefix) {
            let normalized = stripped.to_ascii_lowercase().replace("__", ".");
            map.insert(normalized, value);
        }
    }

    for (key, value) in map {
        apply_env_value(&mut cfg, &key, value);
    }

    cfg
}

fn apply_env_value(cfg: &mut Config, key: &str, value: String) {
    match key {
        "feed.url" => cfg.feed.url = value,
        "feed.user_agent" => cfg.feed.user_agent = value,
        "feed.timeout" => {
            if let Ok(duration) = humantime::parse_duration(&value) {
                cfg.feed.timeout = Some(duration);
            }
        }
        "ui.columns" => {
            if let Ok(parsed) = value.parse::<usize>() {
                cfg.ui.columns = parsed;
            }
        }
        "log.level" => cfg.log.level = value,
        "log.file" => cfg.log.file = Some(PathBuf::from(value)),
        _ => {}
    }
}

pub fn default_path() -> Option<PathBuf> {
    default_config_path()
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("apod-tui").join("config.yaml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::tempdir;

    fn isolated(prefix: &str) -> LoadOptions {
        let dir = tempdir().unwrap();
        LoadOptions {
            config_file: Some(dir.path().join("missing.yaml")),
            env_prefix: Some(prefix.into()),
        }
    }

    #[test]
    fn defaults_without_overrides() {
        let cfg = Config::default();
        assert_eq!(cfg.feed.url, DEFAULT_FEED_URL);
        assert_eq!(cfg.ui.columns, 3);
        assert_eq!(cfg.feed.timeout, None);
        assert!(cfg.feed.user_agent.starts_with("apod-tui/"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        assert!(load(isolated("APOD_TUI_TEST_MISSING")).is_err());
    }

    #[test]
    fn file_values_are_merged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            "feed:\n  url: https://example.org/feed.json\n  timeout: 15s\nui:\n  columns: 12\n",
        )
        .unwrap();
        let cfg = load(LoadOptions {
            config_file: Some(path),
            env_prefix: Some("APOD_TUI_TEST_FILE".into()),
        })
        .unwrap();
        assert_eq!(cfg.feed.url, "https://example.org/feed.json");
        assert_eq!(cfg.feed.timeout, Some(Duration::from_secs(15)));
        assert_eq!(cfg.ui.columns, MAX_COLUMNS);
        assert_eq!(cfg.feed.user_agent, default_user_agent());
        assert_eq!(cfg.log.level, "info");
    }

    #[test]
    fn env_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "ui:\n  columns: 2\n").unwrap();
        env::set_var("APOD_TUI_TEST_ENV_UI__COLUMNS", "4");
        env::set_var("APOD_TUI_TEST_ENV_FEED__TIMEOUT", "2s");
        env::set_var("APOD_TUI_TEST_ENV_LOG__LEVEL", "debug");
        let cfg = load(LoadOptions {
            config_file: Some(path),
            env_prefix: Some("APOD_TUI_TEST_ENV".into()),
        })
        .unwrap();
        env::remove_var("APOD_TUI_TEST_ENV_UI__COLUMNS");
        env::remove_var("APOD_TUI_TEST_ENV_FEED__TIMEOUT");
        env::remove_var("APOD_TUI_TEST_ENV_LOG__LEVEL");
        assert_eq!(cfg.ui.columns, 4);
        assert_eq!(cfg.feed.timeout, Some(Duration::from_secs(2)));
        assert_eq!(cfg.log.level, "debug");
    }
}

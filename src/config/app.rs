// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_CONFIG_PATH: &str = "TREND_CONFIG_PATH";
pub const ENV_RELAY_URL: &str = "TREND_RELAY_URL";
pub const ENV_NEWS_API_KEY: &str = "NEWS_API_KEY";

fn default_relay_url() -> String {
    "http://127.0.0.1:3000/api/proxy".to_string()
}
fn default_refresh_interval_secs() -> u64 {
    300
}
fn default_request_timeout_secs() -> u64 {
    10
}
fn default_favorites_dir() -> PathBuf {
    PathBuf::from("data")
}
fn default_news_api_key() -> String {
    "demo".to_string()
}
fn default_reddit_limit() -> usize {
    15
}
fn default_coingecko_limit() -> usize {
    10
}
fn default_news_page_size() -> usize {
    15
}

/// How outbound requests leave the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayMode {
    /// POST an envelope to `relay_url`.
    #[default]
    Relay,
    /// Call upstreams directly; `relay_url` is ignored.
    Direct,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    #[serde(default)]
    pub relay_mode: RelayMode,
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_favorites_dir")]
    pub favorites_dir: PathBuf,
    /// "ENV" means: read from NEWS_API_KEY
    #[serde(default = "default_news_api_key")]
    pub news_api_key: String,
    #[serde(default = "default_reddit_limit")]
    pub reddit_limit: usize,
    #[serde(default = "default_coingecko_limit")]
    pub coingecko_limit: usize,
    #[serde(default = "default_news_page_size")]
    pub news_page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            relay_mode: RelayMode::default(),
            refresh_interval_secs: default_refresh_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            favorites_dir: default_favorites_dir(),
            news_api_key: default_news_api_key(),
            reddit_limit: default_reddit_limit(),
            coingecko_limit: default_coingecko_limit(),
            news_page_size: default_news_page_size(),
        }
    }
}

impl AppConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Apply env overrides, then reset nonsensical values to defaults.
    fn finish(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_RELAY_URL) {
            if !url.trim().is_empty() {
                self.relay_url = url.trim().to_string();
            }
        }
        let key_from_env = self.news_api_key.trim().eq_ignore_ascii_case("env");
        if let Ok(key) = std::env::var(ENV_NEWS_API_KEY) {
            if !key.trim().is_empty() {
                self.news_api_key = key.trim().to_string();
            }
        } else if key_from_env {
            tracing::warn!("news_api_key is ENV but {ENV_NEWS_API_KEY} is unset; using demo key");
            self.news_api_key = default_news_api_key();
        }

        if self.refresh_interval_secs == 0 {
            self.refresh_interval_secs = default_refresh_interval_secs();
        }
        if self.request_timeout_secs == 0 {
            self.request_timeout_secs = default_request_timeout_secs();
        }
        if self.reddit_limit == 0 {
            self.reddit_limit = default_reddit_limit();
        }
        if self.coingecko_limit == 0 {
            self.coingecko_limit = default_coingecko_limit();
        }
        if self.news_page_size == 0 {
            self.news_page_size = default_news_page_size();
        }
        self
    }
}

/// Load config from an explicit path. Supports TOML or JSON formats.
pub fn load_from(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    Ok(parse_config(&content, ext.as_str())?.finish())
}

/// Load config using env var + fallbacks:
/// 1) $TREND_CONFIG_PATH
/// 2) config/trend_pulse.toml
/// 3) config/trend_pulse.json
/// 4) built-in defaults
pub fn load_default() -> Result<AppConfig> {
    if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        } else {
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
    }
    let toml_p = PathBuf::from("config/trend_pulse.toml");
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let json_p = PathBuf::from("config/trend_pulse.json");
    if json_p.exists() {
        return load_from(&json_p);
    }
    Ok(AppConfig::default().finish())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<AppConfig> {
    match hint_ext {
        "toml" => toml::from_str(s).context("parsing toml config"),
        "json" => serde_json::from_str(s).context("parsing json config"),
        _ => serde_json::from_str(s)
            .or_else(|_| toml::from_str(s))
            .map_err(|_| anyhow!("unsupported config format")),
    }
}

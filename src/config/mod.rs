use anyhow::Result;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub mod defaults;
pub mod duration_serde;

use crate::models::Item;
use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Lower the default log level to debug
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub icons: IconConfig,
    #[serde(default, rename = "static")]
    pub static_items: StaticConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the dashboard front end, served under `/static`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,
    #[serde(default = "default_allowed_headers")]
    pub allowed_headers: Vec<String>,
    #[serde(default)]
    pub allow_credentials: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Sources not heard from for this long are evicted
    #[serde(default = "default_max_age", with = "duration_serde::minutes")]
    pub max_age: Duration,
    /// How often the reaper sweeps the registry
    #[serde(default = "default_check_interval", with = "duration_serde::minutes")]
    pub check_interval: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IconConfig {
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
    #[serde(default = "default_tmp_dir")]
    pub tmp_dir: PathBuf,
    #[serde(default = "default_archive_url")]
    pub archive_url: String,
    #[serde(default = "default_fetch_timeout", with = "duration_serde::seconds")]
    pub fetch_timeout: Duration,
    /// Download a fresh catalog at startup even when a cached one exists
    #[serde(default)]
    pub refresh_on_start: bool,
    #[serde(default = "default_icon_url_prefix")]
    pub url_prefix: String,
    #[serde(default = "default_icon")]
    pub default_icon: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticConfig {
    #[serde(default)]
    pub apps: Vec<Item>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allowed_methods: default_allowed_methods(),
            allowed_headers: default_allowed_headers(),
            allow_credentials: false,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_age: default_max_age(),
            check_interval: default_check_interval(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            tmp_dir: default_tmp_dir(),
            archive_url: default_archive_url(),
            fetch_timeout: default_fetch_timeout(),
            refresh_on_start: false,
            url_prefix: default_icon_url_prefix(),
            default_icon: default_icon(),
        }
    }
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

// CORS defaults
fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn default_allowed_origins() -> Vec<String> {
    to_strings(DEFAULT_ALLOWED_ORIGINS)
}

fn default_allowed_methods() -> Vec<String> {
    to_strings(DEFAULT_ALLOWED_METHODS)
}

fn default_allowed_headers() -> Vec<String> {
    to_strings(DEFAULT_ALLOWED_HEADERS)
}

// Registry defaults
fn default_max_age() -> Duration {
    Duration::from_secs(DEFAULT_MAX_AGE_MINUTES * 60)
}

fn default_check_interval() -> Duration {
    Duration::from_secs(DEFAULT_CHECK_INTERVAL_MINUTES * 60)
}

// Icon defaults
fn running_in_container() -> bool {
    Path::new(CONTAINER_ROOT).exists()
}

fn default_cache_dir() -> PathBuf {
    if running_in_container() {
        PathBuf::from(CONTAINER_CACHE_DIR)
    } else {
        PathBuf::from(DEFAULT_CACHE_DIR)
    }
}

fn default_tmp_dir() -> PathBuf {
    if running_in_container() {
        PathBuf::from(CONTAINER_TMP_DIR)
    } else {
        PathBuf::from(DEFAULT_TMP_DIR)
    }
}

fn default_archive_url() -> String {
    DEFAULT_ARCHIVE_URL.to_string()
}

fn default_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECONDS)
}

fn default_icon_url_prefix() -> String {
    DEFAULT_ICON_URL_PREFIX.to_string()
}

fn default_icon() -> String {
    DEFAULT_ICON_PATH.to_string()
}

impl Config {
    /// Load configuration: defaults, then the TOML file if present, then
    /// `HOMEDASH_*` environment variables.
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let path = Path::new(config_file);
        if path.exists() {
            info!("Loading configuration file: {}", config_file);
        } else {
            info!(
                "No configuration file at {}, using defaults and environment",
                config_file
            );
        }

        let config = Self::figment(path).extract::<Self>()?;
        debug!("Active configuration: {:?}", config);
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
    }
}

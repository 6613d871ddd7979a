/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// CORS defaults
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["*"];
pub const DEFAULT_ALLOWED_METHODS: &[&str] = &["GET", "POST", "HEAD", "DELETE"];
pub const DEFAULT_ALLOWED_HEADERS: &[&str] = &["Content-Type"];

// Registry defaults (minutes)
pub const DEFAULT_MAX_AGE_MINUTES: u64 = 20;
pub const DEFAULT_CHECK_INTERVAL_MINUTES: u64 = 1;

// Icon catalog defaults
pub const DEFAULT_ARCHIVE_URL: &str =
    "https://github.com/linuxserver/Heimdall-Apps/archive/refs/heads/gh-pages.zip";
pub const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 120;
pub const DEFAULT_ICON_URL_PREFIX: &str = "/api/v1/icons";
pub const DEFAULT_ICON_PATH: &str = "/static/default-icon.svg";

// Storage defaults
pub const DEFAULT_CACHE_DIR: &str = "./data/cache";
pub const DEFAULT_TMP_DIR: &str = "./data/tmp";
pub const CONTAINER_ROOT: &str = "/homedash";
pub const CONTAINER_CACHE_DIR: &str = "/homedash/cache";
pub const CONTAINER_TMP_DIR: &str = "/homedash/tmp";

// Environment overrides, e.g. HOMEDASH_REGISTRY__MAX_AGE=30
pub const ENV_PREFIX: &str = "HOMEDASH_";
pub const ENV_SEPARATOR: &str = "__";

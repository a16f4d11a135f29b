//! Configuration management for trendswipe.
//!
//! Configuration is read from `~/.config/trendswipe/config.toml` at startup,
//! or from a path given on the command line. If the default file doesn't
//! exist, one with commented defaults is created.

pub mod interval;
pub mod sources;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::domain::SourceDescriptor;
use crate::filter::RelevanceFilter;

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub fetch: FetchConfig,
    pub relevance: RelevanceFilter,
    pub sources: Vec<SourceDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            fetch: FetchConfig::default(),
            relevance: RelevanceFilter::default(),
            sources: sources::default_sources(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Snapshot size, staleness and serving limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum images kept in one snapshot (default: 300)
    pub max_images: usize,

    /// Age after which a snapshot is rebuilt in the background (default: 6h)
    #[serde(deserialize_with = "interval::deserialize")]
    pub refresh_interval: u64,

    /// How long the very first reader waits for the initial build (default: 60)
    pub first_fill_timeout_secs: u64,

    /// Largest batch a client may request (default: 100)
    pub max_batch: usize,

    /// Batch size when the client does not ask for one (default: 50)
    pub default_batch: usize,

    /// Start a build as soon as the server starts (default: true)
    pub warm_on_start: bool,

    /// How often the background ticker checks staleness; 0 disables it (default: 15m)
    #[serde(deserialize_with = "interval::deserialize")]
    pub check_interval: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_images: 300,
            refresh_interval: 6 * 3600,
            first_fill_timeout_secs: 60,
            max_batch: 100,
            default_batch: 50,
            warm_on_start: true,
            check_interval: 15 * 60,
        }
    }
}

impl CacheConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval)
    }

    pub fn first_fill_timeout(&self) -> Duration {
        Duration::from_secs(self.first_fill_timeout_secs)
    }

    pub fn check_interval(&self) -> Option<Duration> {
        (self.check_interval > 0).then(|| Duration::from_secs(self.check_interval))
    }
}

/// Network behaviour of the extractors.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User agent string sent with every request
    pub user_agent: String,

    /// Timeout for feed documents in seconds (default: 15)
    pub feed_timeout_secs: u64,

    /// Timeout for linked article pages in seconds (default: 8)
    pub article_timeout_secs: u64,

    /// Timeout for page sources in seconds (default: 12)
    pub page_timeout_secs: u64,

    /// Sources extracted concurrently during a build (default: 4)
    pub workers: usize,

    /// Lower bound of the pause after each source in milliseconds (default: 500)
    pub politeness_min_ms: u64,

    /// Upper bound of the pause after each source in milliseconds (default: 1500)
    pub politeness_max_ms: u64,

    /// Feed entries older than this many days are skipped (default: 14)
    pub recency_days: i64,

    /// Linked article pages fetched per feed source at most (default: 4)
    pub article_lookups: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                .to_string(),
            feed_timeout_secs: 15,
            article_timeout_secs: 8,
            page_timeout_secs: 12,
            workers: 4,
            politeness_min_ms: 500,
            politeness_max_ms: 1500,
            recency_days: 14,
            article_lookups: 4,
        }
    }
}

impl FetchConfig {
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    pub fn article_timeout(&self) -> Duration {
        Duration::from_secs(self.article_timeout_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    /// Politeness bounds in milliseconds, swapped if configured backwards.
    pub fn politeness_range(&self) -> (u64, u64) {
        let (a, b) = (self.politeness_min_ms, self.politeness_max_ms);
        (a.min(b), a.max(b))
    }

    pub fn recency_window(&self) -> chrono::Duration {
        chrono::Duration::days(self.recency_days)
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit path must exist. At the default location a commented
    /// default file is created on first use. Missing fields use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default_path = Self::default_config_path()?;
                if !default_path.exists() {
                    Self::create_default_config(&default_path)?;
                    return Ok(Self::default());
                }
                default_path
            }
        };

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })
    }

    /// Get the default config file path: `~/.config/trendswipe/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("trendswipe").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
    }

    fn default_config_content() -> &'static str {
        r##"# trendswipe configuration
#
# Intervals can be written as "6h", "30m", "1d", "90s" or a number of seconds.

[server]
host = "0.0.0.0"
port = 5000

[cache]
# Maximum images kept in one snapshot
max_images = 300

# Age after which the snapshot is rebuilt in the background
refresh_interval = "6h"

# Seconds the first reader waits for the initial build
first_fill_timeout_secs = 60

# Batch limits for GET /images
max_batch = 100
default_batch = 50

# Build as soon as the server starts
warm_on_start = true

# How often to check for staleness without traffic ("0" disables)
check_interval = "15m"

[fetch]
feed_timeout_secs = 15
article_timeout_secs = 8
page_timeout_secs = 12

# Sources extracted concurrently
workers = 4

# Random pause after each source, in milliseconds
politeness_min_ms = 500
politeness_max_ms = 1500

# Skip feed entries older than this
recency_days = 14

# Linked article pages fetched per feed when an entry carries no image
article_lookups = 4

# [relevance]
# allow = ["streetwear", "graphic tee"]
# avoid = ["beauty"]

# Replaces the built-in source list when present.
# [[sources]]
# kind = "feed"          # or "page"
# endpoint = "https://hypebeast.com/feed"
# label = "Hypebeast"
# layer = "L3"
# category = "Streetwear Culture"
# quota = 10
"##
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

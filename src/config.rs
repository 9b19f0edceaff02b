use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration from TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Reaper configuration.
    #[serde(default)]
    pub reaper: ReaperConfig,

    /// Remote sync configuration.
    #[serde(default)]
    pub remote: RemoteConfig,
}

/// Database configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data/books.db")
}

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Freshness window for cached books, in seconds.
    #[serde(default = "default_ttl_seconds")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl_seconds(),
        }
    }
}

fn default_ttl_seconds() -> u64 {
    3600
}

/// Reaper configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReaperConfig {
    /// Purge interval in seconds (0 to disable the scheduled task).
    #[serde(default = "default_reap_interval")]
    pub interval_seconds: u64,
}

impl Default for ReaperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_reap_interval(),
        }
    }
}

fn default_reap_interval() -> u64 {
    86_400
}

/// Remote sync configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Backend base URL. Sync is disabled when unset.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Poll interval for the live subscription, in seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            poll_interval_seconds: default_poll_interval(),
        }
    }
}

fn default_poll_interval() -> u64 {
    30
}

impl RemoteConfig {
    /// Whether cloud sync is configured.
    pub fn enabled(&self) -> bool {
        self.base_url.is_some()
    }
}

impl Config {
    /// Load configuration from file.
    pub fn load(path: &PathBuf) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content).map_err(|e| {
            crate::error::AppError::Config(format!("Failed to parse config file: {}", e))
        })
    }

    /// Find config file in default locations.
    pub fn find_config_file() -> Option<PathBuf> {
        let candidates = [
            PathBuf::from("config.toml"),
            PathBuf::from("shelfsync.toml"),
            dirs::config_dir()
                .map(|p| p.join("shelfsync").join("config.toml"))
                .unwrap_or_default(),
        ];

        candidates.into_iter().find(|p| p.exists())
    }

    /// Generate default config file content.
    pub fn generate_default() -> String {
        r#"# shelfsync configuration

[database]
# path = "data/books.db"

[cache]
# Freshness window for cached books, in seconds
ttl_seconds = 3600

[reaper]
# Purge interval in seconds (0 to disable)
interval_seconds = 86400

[remote]
# Backend base URL; leave unset to run fully offline
# base_url = "https://api.example.com"
# Poll interval for the live subscription, in seconds
poll_interval_seconds = 30
"#
        .to_string()
    }
}

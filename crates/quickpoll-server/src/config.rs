use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub polls: PollsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// Upper bound for a single store call, in milliseconds.
    pub store_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/quickpoll.db?mode=rwc".to_string(),
            max_connections: 8,
            store_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollsConfig {
    pub default_page_size: i64,
    pub max_page_size: i64,
}

impl Default for PollsConfig {
    fn default() -> Self {
        let limits = quickpoll_core::PageLimits::default();
        Self {
            default_page_size: limits.default_page_size,
            max_page_size: limits.max_page_size,
        }
    }
}

impl Config {
    /// Read `path` if it exists, then apply `QUICKPOLL_*` environment
    /// overrides.
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {path}"))?;
            Self::parse(&raw).with_context(|| format!("parsing config file {path}"))?
        } else {
            tracing::info!("Config file {path} not found, using defaults");
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = var("QUICKPOLL_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }
        if let Some(url) = var("QUICKPOLL_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(raw) = var("QUICKPOLL_STORE_TIMEOUT_MS") {
            match raw.parse() {
                Ok(ms) => self.database.store_timeout_ms = ms,
                Err(_) => tracing::warn!(value = %raw, "Invalid QUICKPOLL_STORE_TIMEOUT_MS, ignoring"),
            }
        }
    }

    pub fn app_config(&self) -> quickpoll_core::AppConfig {
        let max_page_size = self.polls.max_page_size.max(1);
        quickpoll_core::AppConfig {
            page_limits: quickpoll_core::PageLimits {
                default_page_size: self.polls.default_page_size.clamp(1, max_page_size),
                max_page_size,
            },
            store_timeout: Duration::from_millis(self.database.store_timeout_ms.max(1)),
        }
    }
}

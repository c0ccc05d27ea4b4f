use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Config {
    /// Tenant the imported accounts and transactions belong to.
    pub tenant: String,
    #[serde(default = "default_fio_gateway")]
    pub fio_gateway: String,
    #[serde(default = "default_ledger_gateway")]
    pub ledger_gateway: String,
    #[serde(default = "default_vault_gateway")]
    pub vault_gateway: String,
    /// Seconds between sync passes.
    #[serde(default = "default_sync_rate_secs")]
    pub sync_rate_secs: u64,
    /// Gateway tokens to seed the in-memory store with.
    #[serde(default)]
    pub tokens: Vec<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    #[serde(default)]
    pub use_json: bool,
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_fio_gateway() -> String {
    "https://www.fio.cz/ib_api/rest".to_string()
}

fn default_ledger_gateway() -> String {
    "https://127.0.0.1:4401".to_string()
}

fn default_vault_gateway() -> String {
    "https://127.0.0.1:4400".to_string()
}

fn default_sync_rate_secs() -> u64 {
    22
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_log_file() -> String {
    "fio-bco-import.log".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Read configuration from `FIO_BCO_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let tenant = lookup("FIO_BCO_TENANT").ok_or(ConfigError::Missing("FIO_BCO_TENANT"))?;
        let sync_rate_secs = match lookup("FIO_BCO_SYNC_RATE") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!("Invalid FIO_BCO_SYNC_RATE {raw:?}, using default");
                default_sync_rate_secs()
            }),
            None => default_sync_rate_secs(),
        };
        let tokens = lookup("FIO_BCO_TOKENS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            tenant,
            fio_gateway: lookup("FIO_BCO_FIO_GATEWAY").unwrap_or_else(default_fio_gateway),
            ledger_gateway: lookup("FIO_BCO_LEDGER_GATEWAY").unwrap_or_else(default_ledger_gateway),
            vault_gateway: lookup("FIO_BCO_VAULT_GATEWAY").unwrap_or_else(default_vault_gateway),
            sync_rate_secs,
            tokens,
            log_level: lookup("FIO_BCO_LOG_LEVEL").unwrap_or_else(default_log_level),
            log_dir: lookup("FIO_BCO_LOG_DIR").unwrap_or_else(default_log_dir),
            log_file: lookup("FIO_BCO_LOG_FILE").unwrap_or_else(default_log_file),
            use_json: false,
            rotation: default_rotation(),
        })
    }

    pub fn sync_rate(&self) -> Duration {
        Duration::from_secs(self.sync_rate_secs)
    }
}

/// Token values are secrets, keep them out of debug output.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("tenant", &self.tenant)
            .field("fio_gateway", &self.fio_gateway)
            .field("ledger_gateway", &self.ledger_gateway)
            .field("vault_gateway", &self.vault_gateway)
            .field("sync_rate_secs", &self.sync_rate_secs)
            .field("tokens", &format!("<{} values>", self.tokens.len()))
            .field("log_level", &self.log_level)
            .finish()
    }
}

// ============================================================
// Tests
// ============================================================

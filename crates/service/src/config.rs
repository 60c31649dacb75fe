//! Service configuration.
//!
//! Loaded from TOML (`cloudstore.toml`), with environment-variable
//! overrides for the credentials so deployments can keep secrets out of
//! the config file.

use std::path::Path;

use cloudstore_transfer::TransferLimits;
use serde::{Deserialize, Serialize};

/// Environment variable overriding `bot_token`.
pub const ENV_BOT_TOKEN: &str = "CLOUDSTORE_BOT_TOKEN";
/// Environment variable overriding `chat_id`.
pub const ENV_CHAT_ID: &str = "CLOUDSTORE_CHAT_ID";

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Bot token for the storage backend.
    #[serde(default)]
    pub bot_token: String,

    /// Chat id the bot stores documents in.
    #[serde(default)]
    pub chat_id: String,

    /// Payloads at or below this size upload as a single blob (bytes).
    #[serde(default = "default_single_blob_limit")]
    pub single_blob_limit: u64,

    /// Chunk size for payloads above the threshold (bytes).
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Bound on concurrent chunk fetches during download.
    #[serde(default = "default_max_concurrent_fetches")]
    pub max_concurrent_fetches: usize,
}

fn default_single_blob_limit() -> u64 {
    cloudstore_transfer::DEFAULT_SINGLE_BLOB_LIMIT
}

fn default_chunk_size() -> usize {
    cloudstore_transfer::DEFAULT_CHUNK_SIZE
}

fn default_max_concurrent_fetches() -> usize {
    cloudstore_transfer::DEFAULT_MAX_CONCURRENT_FETCHES
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            single_blob_limit: default_single_blob_limit(),
            chunk_size: default_chunk_size(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from a TOML file and applies env overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: ServiceConfig = toml::from_str(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Defaults plus env overrides, for deployments without a config file.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Applies credential overrides from a key lookup.
    fn apply_overrides<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = get(ENV_BOT_TOKEN) {
            self.bot_token = token;
        }
        if let Some(chat) = get(ENV_CHAT_ID) {
            self.chat_id = chat;
        }
    }

    /// Transfer limits derived from this configuration.
    pub fn limits(&self) -> TransferLimits {
        TransferLimits {
            single_blob_limit: self.single_blob_limit,
            chunk_size: self.chunk_size,
            max_concurrent_fetches: self.max_concurrent_fetches,
        }
    }
}

use crate::constants::{
    DEFAULT_BUFFER_SIZE, DEFAULT_DATA_TIMEOUT_SECS, DEFAULT_LISTEN_PORT, DEFAULT_USERS_FILE,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_port: u16,
    pub users_file: PathBuf,
    pub root_dir: PathBuf,
    pub buffer_size: usize,
    pub data_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub download_dir: PathBuf,
    pub buffer_size: usize,
    pub data_timeout_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: DEFAULT_LISTEN_PORT,
            users_file: PathBuf::from(DEFAULT_USERS_FILE),
            root_dir: PathBuf::from("."),
            buffer_size: DEFAULT_BUFFER_SIZE,
            data_timeout_secs: DEFAULT_DATA_TIMEOUT_SECS,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("."),
            buffer_size: DEFAULT_BUFFER_SIZE,
            data_timeout_secs: DEFAULT_DATA_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(self.data_timeout_secs)
    }

    /// A zero block size would stall the transfer loop.
    pub fn block_size(&self) -> usize {
        self.buffer_size.max(1)
    }
}

impl ClientConfig {
    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(self.data_timeout_secs)
    }

    pub fn block_size(&self) -> usize {
        self.buffer_size.max(1)
    }
}

impl Config {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
        Self::from_toml(&config_str)
            .with_context(|| format!("Failed to parse configuration file: {}", path.display()))
    }

    pub fn from_toml(config_str: &str) -> Result<Self> {
        Ok(toml::from_str(config_str)?)
    }

    /// Loads `path` when given, otherwise falls back to the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}

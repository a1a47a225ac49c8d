//! Server configuration read from the environment

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";
const DEFAULT_DATA_DIR: &str = ".tm-data";
const DEFAULT_SAVE_TIMEOUT_MS: u64 = 5_000;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Where tenants are kept between restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    /// JSON file under the data directory
    File,
    /// Process memory only
    Memory,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub storage: StorageMode,
    /// Seed the demo tenants when the store starts empty
    pub seed_demo: bool,
    pub save_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let bind_addr: SocketAddr = match value("TM_BIND_ADDR") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "TM_BIND_ADDR",
                value: raw,
            })?,
            None => DEFAULT_BIND_ADDR.parse().map_err(|_| ConfigError::Invalid {
                key: "TM_BIND_ADDR",
                value: DEFAULT_BIND_ADDR.to_string(),
            })?,
        };

        let data_dir = value("TM_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let storage = match value("TM_STORAGE") {
            None => StorageMode::File,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "file" => StorageMode::File,
                "memory" => StorageMode::Memory,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "TM_STORAGE",
                        value: raw,
                    })
                }
            },
        };

        let seed_demo = parse_flag(value("TM_SEED_DEMO").as_deref(), false);

        let save_timeout = match value("TM_SAVE_TIMEOUT_MS") {
            None => Duration::from_millis(DEFAULT_SAVE_TIMEOUT_MS),
            Some(raw) => match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "TM_SAVE_TIMEOUT_MS",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            bind_addr,
            data_dir,
            storage,
            seed_demo,
            save_timeout,
        })
    }

    /// File backing the tenant store in `StorageMode::File`
    pub fn tenants_path(&self) -> PathBuf {
        self.data_dir.join("tenants.json")
    }
}

fn parse_flag(raw: Option<&str>, default: bool) -> bool {
    match raw {
        Some(raw) => match raw.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        None => default,
    }
}

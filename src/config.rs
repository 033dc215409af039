//! Runtime configuration read from the environment.
//!
//! `CATALOG_ENV` picks the execution context. The `test` context targets a
//! throwaway store so suites never touch the production database.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const ENV_CONTEXT: &str = "CATALOG_ENV";
pub const ENV_DB: &str = "CATALOG_DB";
pub const ENV_TEST_DB: &str = "CATALOG_TEST_DB";
pub const ENV_ADDR: &str = "CATALOG_ADDR";
pub const ENV_LOG_DIR: &str = "CATALOG_LOG_DIR";
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DB_FILE_NAME: &str = "catalog.sqlite3";
const APP_DIR_NAME: &str = "catalog";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown execution environment: {0}")]
    UnknownEnvironment(String),
    #[error("invalid listen address {value}: {reason}")]
    InvalidAddr { value: String, reason: String },
    #[error("no data directory available; set CATALOG_DB")]
    NoDataDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Test,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(ConfigError::UnknownEnvironment(other.to_string())),
        }
    }
}

/// Where the store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    File(PathBuf),
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub environment: Environment,
    pub store: StoreTarget,
    pub listen_addr: SocketAddr,
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    /// Build a config from an explicit variable map.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
        };

        let environment = match get(ENV_CONTEXT) {
            Some(value) => value.parse()?,
            None => Environment::Production,
        };

        let store = match environment {
            Environment::Test => get(ENV_TEST_DB)
                .map(|path| StoreTarget::File(PathBuf::from(path)))
                .unwrap_or(StoreTarget::Memory),
            Environment::Production => match get(ENV_DB) {
                Some(path) => StoreTarget::File(PathBuf::from(path)),
                None => StoreTarget::File(default_db_path()?),
            },
        };

        let addr = get(ENV_ADDR).unwrap_or(DEFAULT_ADDR);
        let listen_addr = parse_addr(addr)?;

        Ok(Self {
            environment,
            store,
            listen_addr,
            log_dir: get(ENV_LOG_DIR).map(PathBuf::from),
        })
    }
}

pub fn parse_addr(value: &str) -> Result<SocketAddr, ConfigError> {
    value.parse().map_err(|err: std::net::AddrParseError| ConfigError::InvalidAddr {
        value: value.to_string(),
        reason: err.to_string(),
    })
}

pub fn default_db_path() -> Result<PathBuf, ConfigError> {
    let base = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
    Ok(base.join(APP_DIR_NAME).join(DB_FILE_NAME))
}

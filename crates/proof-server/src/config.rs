//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub const KEYS_DIR_VAR: &str = "MARKETPLACE_KEYS_DIR";
pub const BIND_ADDR_VAR: &str = "MARKETPLACE_BIND_ADDR";
pub const PROVE_TIMEOUT_VAR: &str = "MARKETPLACE_PROVE_TIMEOUT_SECS";

const DEFAULT_KEYS_DIR: &str = "keys";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_PROVE_TIMEOUT_SECS: u64 = 60;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    BindAddr { var: &'static str, value: String },
    #[error("{var} must be a positive number of seconds, got {value}")]
    Timeout { var: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Directory holding `purchase.pk`, `purchase.vk` and `verification_key.json`
    pub keys_dir: PathBuf,
    pub bind_addr: SocketAddr,
    /// Upper bound on a single proof generation
    pub prove_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build a config from any variable source; unset variables take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let keys_dir = lookup(KEYS_DIR_VAR)
            .unwrap_or_else(|| DEFAULT_KEYS_DIR.to_string())
            .into();

        let bind_addr = match lookup(BIND_ADDR_VAR) {
            Some(value) => value.parse().map_err(|_| ConfigError::BindAddr {
                var: BIND_ADDR_VAR,
                value,
            })?,
            None => DEFAULT_BIND_ADDR.parse().map_err(|_| ConfigError::BindAddr {
                var: BIND_ADDR_VAR,
                value: DEFAULT_BIND_ADDR.to_string(),
            })?,
        };

        let prove_timeout = match lookup(PROVE_TIMEOUT_VAR) {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Timeout {
                        var: PROVE_TIMEOUT_VAR,
                        value,
                    })
                }
            },
            None => Duration::from_secs(DEFAULT_PROVE_TIMEOUT_SECS),
        };

        Ok(Self {
            keys_dir,
            bind_addr,
            prove_timeout,
        })
    }
}

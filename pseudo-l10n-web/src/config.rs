//! Server settings read from the environment

use std::net::SocketAddr;

use thiserror::Error;

pub const ADDR_VAR: &str = "PSEUDO_L10N_ADDR";
pub const MAX_BODY_VAR: &str = "PSEUDO_L10N_MAX_BODY";

const DEFAULT_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_MAX_BODY: usize = 2 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: '{value}'")]
    InvalidAddr { var: &'static str, value: String },

    #[error("{var} is not a byte count: '{value}'")]
    InvalidSize { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    /// Largest accepted request body, in bytes
    pub max_body: usize,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let addr = lookup(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr.parse().map_err(|_| ConfigError::InvalidAddr {
            var: ADDR_VAR,
            value: addr.clone(),
        })?;

        let max_body = match lookup(MAX_BODY_VAR) {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidSize {
                    var: MAX_BODY_VAR,
                    value,
                })?,
            None => DEFAULT_MAX_BODY,
        };

        Ok(ServerConfig { addr, max_body })
    }
}

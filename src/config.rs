//! Runtime configuration
//!
//! The signer reads its settings from the process environment. Only the
//! network choice affects signing; everything else is operational.

use std::env;
use thiserror::Error;

use crate::error::SignerError;
use crate::types::Network;

pub const NETWORK_ENV: &str = "BTC_NETWORK";
pub const DEBUG_ENV: &str = "BTC_SIGNER_DEBUG";
pub const SECRET_JSON_ENV: &str = "BTC_SECRET_JSON";

/// Configuration and secret loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVar(String),

    #[error("{var} is invalid: {reason}")]
    InvalidVar { var: String, reason: String },

    #[error("SecretString is empty, expected JSON in SecretString")]
    EmptySecret,

    #[error("secret is not valid JSON: {0}")]
    MalformedSecret(String),

    #[error("secret JSON has no {0} entry")]
    MissingSecretKey(&'static str),
}

impl From<ConfigError> for SignerError {
    fn from(e: ConfigError) -> Self {
        SignerError::config(e.to_string())
    }
}

/// Signer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignerConfig {
    pub network: Network,
    pub debug: bool,
}

impl SignerConfig {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            debug: false,
        }
    }

    /// Load settings from `BTC_NETWORK` and `BTC_SIGNER_DEBUG`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_network = lookup(NETWORK_ENV)
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar(NETWORK_ENV.to_string()))?;

        let network = raw_network
            .parse::<Network>()
            .map_err(|reason| ConfigError::InvalidVar {
                var: NETWORK_ENV.to_string(),
                reason,
            })?;

        let debug = lookup(DEBUG_ENV)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Self { network, debug })
    }

    /// Apply process-wide side effects of the configuration
    pub fn apply(&self) {
        if self.debug {
            crate::utils::logging::enable_debug();
        }
    }
}

//! Mnemonic secret sources
//!
//! The signer never talks to a secret manager itself. Whatever fetched the
//! secret hands over its JSON payload, `{"BTC_MNEMONIC": "..."}`, through a
//! [`SecretStore`].

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::env;
use zeroize::Zeroizing;

use crate::config::{ConfigError, SECRET_JSON_ENV};
use crate::error::SignerResult;

pub const MNEMONIC_KEY: &str = "BTC_MNEMONIC";

/// Source of the wallet mnemonic
pub trait SecretStore {
    fn mnemonic(&self) -> SignerResult<SecretString>;
}

#[derive(Deserialize)]
struct SecretJson {
    #[serde(rename = "BTC_MNEMONIC")]
    btc_mnemonic: Option<String>,
}

/// Extract the mnemonic from a secret JSON payload
pub fn parse_secret_json(secret_string: &str) -> Result<SecretString, ConfigError> {
    if secret_string.trim().is_empty() {
        return Err(ConfigError::EmptySecret);
    }

    // Only the position is kept: serde messages may quote the secret itself
    let parsed: SecretJson = serde_json::from_str(secret_string).map_err(|e| {
        ConfigError::MalformedSecret(format!("line {} column {}", e.line(), e.column()))
    })?;

    let phrase = Zeroizing::new(parsed.btc_mnemonic.unwrap_or_default());
    if phrase.trim().is_empty() {
        return Err(ConfigError::MissingSecretKey(MNEMONIC_KEY));
    }
    Ok(SecretString::from(phrase.trim().to_string()))
}

/// Secret JSON already held in memory
pub struct JsonSecretStore {
    secret_string: SecretString,
}

impl JsonSecretStore {
    pub fn new(secret_string: impl Into<String>) -> Self {
        Self {
            secret_string: SecretString::from(secret_string.into()),
        }
    }
}

impl SecretStore for JsonSecretStore {
    fn mnemonic(&self) -> SignerResult<SecretString> {
        Ok(parse_secret_json(self.secret_string.expose_secret())?)
    }
}

/// Secret JSON read from an environment variable on every request
pub struct EnvSecretStore {
    var: String,
}

impl EnvSecretStore {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvSecretStore {
    fn default() -> Self {
        Self::new(SECRET_JSON_ENV)
    }
}

impl SecretStore for EnvSecretStore {
    fn mnemonic(&self) -> SignerResult<SecretString> {
        let raw = Zeroizing::new(
            env::var(&self.var).map_err(|_| ConfigError::MissingVar(self.var.clone()))?,
        );
        Ok(parse_secret_json(&raw)?)
    }
}

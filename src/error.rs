//! Unified error types for the batch signer
//!
//! Every stage (validation, fee estimation, assembly, signing) reports
//! failures through [`SignerError`] so the request handler has exactly one
//! shape to map onto a response.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Message shown to callers when the underlying cause is internal
pub const GENERIC_FAILURE_MESSAGE: &str = "Batch payment failed";

/// Main error type for all signer operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl SignerError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
        }
    }

    /// Attach structured diagnostic context (amounts, indices, causes)
    pub fn with_context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    // Convenience constructors
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, msg)
    }

    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    pub fn insufficient_funds(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InsufficientFunds, msg)
    }

    pub fn invalid_mnemonic(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidMnemonic, msg)
    }

    pub fn address_generation_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::AddressGenerationFailed, msg)
    }

    pub fn signing_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SigningFailed, msg)
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Config, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::Internal, msg)
    }

    /// Message safe to return to the caller.
    ///
    /// Internal failures are collapsed into [`GENERIC_FAILURE_MESSAGE`]; their
    /// real cause only reaches the log.
    pub fn public_message(&self) -> String {
        match self.code {
            ErrorCode::Internal => GENERIC_FAILURE_MESSAGE.to_string(),
            _ => self.message.clone(),
        }
    }
}

impl fmt::Display for SignerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref context) = self.context {
            write!(f, " ({})", context)?;
        }
        Ok(())
    }
}

impl std::error::Error for SignerError {}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Request errors
    InvalidInput,
    InvalidAddress,

    // Funds
    InsufficientFunds,

    // Wallet initialization
    InvalidMnemonic,
    AddressGenerationFailed,

    // Crypto
    SigningFailed,

    // Environment
    Config,

    // Internal
    Internal,
}

/// Result type alias for signer operations
pub type SignerResult<T> = Result<T, SignerError>;

// Conversions from common error types

impl From<serde_json::Error> for SignerError {
    fn from(e: serde_json::Error) -> Self {
        SignerError::new(ErrorCode::InvalidInput, format!("JSON error: {}", e))
    }
}

impl From<hex::FromHexError> for SignerError {
    fn from(e: hex::FromHexError) -> Self {
        SignerError::new(ErrorCode::InvalidInput, format!("Hex error: {}", e))
    }
}

impl From<bitcoin::bip32::Error> for SignerError {
    fn from(e: bitcoin::bip32::Error) -> Self {
        SignerError::new(ErrorCode::Internal, format!("BIP32 error: {}", e))
    }
}

impl From<bitcoin::secp256k1::Error> for SignerError {
    fn from(e: bitcoin::secp256k1::Error) -> Self {
        SignerError::new(ErrorCode::SigningFailed, format!("Secp256k1 error: {}", e))
    }
}

impl From<bitcoin::sighash::P2wpkhError> for SignerError {
    fn from(e: bitcoin::sighash::P2wpkhError) -> Self {
        SignerError::new(ErrorCode::SigningFailed, format!("Sighash error: {}", e))
    }
}

impl From<bip39::Error> for SignerError {
    fn from(e: bip39::Error) -> Self {
        SignerError::new(ErrorCode::InvalidMnemonic, "Invalid mnemonic phrase")
            .with_context(serde_json::json!({ "cause": e.to_string() }))
    }
}

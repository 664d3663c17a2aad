//! Bitcoin Batch Payment Signer
//!
//! Builds and signs one native segwit (P2WPKH) transaction paying many
//! recipients from a caller-supplied set of UTXOs. The signing key is derived
//! from a BIP39 mnemonic at the network's BIP84 receive path.
//!
//! # Architecture
//!
//! This crate provides:
//! - **validation**: Structural checks of the incoming payment request
//! - **wallet**: Key derivation and wallet generation
//! - **fees**: Virtual size, fee and change estimation
//! - **tx**: Transaction assembly and signing
//! - **service**: One signed batch per call, wallet held for the instance lifetime
//! - **handler**: `{ "data": ... }` event in, `{ "result" | "error" }` out
//!
//! Nothing is fetched or broadcast here. UTXOs and fee estimates come from the
//! caller, the mnemonic from a [`secrets::SecretStore`].
//!
//! # Security
//!
//! Mnemonics, seeds and entropy are wrapped in `secrecy`/`zeroize` types and
//! cleared when dropped. Log fields that look like secrets are redacted.
//!
//! # Example
//!
//! ```rust,ignore
//! use btc_batch_signer::{BatchSigner, Network};
//!
//! let signer = BatchSigner::new(&mnemonic, Network::Testnet)?;
//! let response = signer.create_and_sign_transaction(&params)?;
//! println!("{} pays {} sat in fees", response.tx_id, response.fee);
//! ```

pub mod config;
pub mod error;
pub mod fees;
pub mod handler;
pub mod secrets;
pub mod service;
pub mod tx;
pub mod types;
pub mod utils;
pub mod validation;
pub mod wallet;

// Re-export key types for convenience
pub use config::{ConfigError, SignerConfig};
pub use error::{ErrorCode, SignerError, SignerResult};
pub use handler::PaymentHandler;
pub use secrets::{EnvSecretStore, JsonSecretStore, SecretStore};
pub use service::BatchSigner;
pub use types::{CommandResponse, FeeEstimates, Network, PayBatchParams, PayBatchResponse, Recipient, Utxo};
pub use validation::{parse_pay_batch_params, validate_pay_batch_params};
pub use wallet::{generate_wallet, initialize_wallet, GeneratedWallet, Wallet};

//! Wallet Module
//!
//! Derives the single signing key of the service from a BIP39 mnemonic and
//! exposes it as an immutable [`Wallet`].
//!
//! SECURITY: the wallet is never serialized and its `Debug` output omits the
//! private key. The secret scalar is erased when the wallet is dropped.

mod keygen;

pub use keygen::*;

use bitcoin::bip32::DerivationPath;
use bitcoin::key::CompressedPublicKey;
use bitcoin::{Address, PrivateKey, ScriptBuf};
use std::fmt;

use crate::types::Network;

/// Single-key P2WPKH wallet derived at the network's BIP84 receive path
pub struct Wallet {
    network: Network,
    derivation_path: DerivationPath,
    private_key: PrivateKey,
    public_key: CompressedPublicKey,
    address: Address,
}

impl Wallet {
    pub fn network(&self) -> Network {
        self.network
    }

    pub fn derivation_path(&self) -> &DerivationPath {
        &self.derivation_path
    }

    pub fn public_key(&self) -> &CompressedPublicKey {
        &self.public_key
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Locking script of the wallet address, used for change outputs and as
    /// the spent script of every input
    pub fn script_pubkey(&self) -> ScriptBuf {
        self.address.script_pubkey()
    }

    pub(crate) fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("network", &self.network)
            .field("derivation_path", &self.derivation_path.to_string())
            .field("private_key", &"[REDACTED]")
            .field("public_key", &self.public_key.to_string())
            .field("address", &self.address.to_string())
            .finish()
    }
}

impl Drop for Wallet {
    fn drop(&mut self) {
        self.private_key.inner.non_secure_erase();
    }
}

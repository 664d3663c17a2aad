//! Key Generation
//!
//! Restores the service wallet from a mnemonic, and creates fresh mnemonics
//! for provisioning new signer secrets.
//!
//! SECURITY: entropy and seeds are wrapped in `Zeroizing` and cleared on drop.

use bip39::Mnemonic;
use bitcoin::address::AddressType;
use bitcoin::bip32::{DerivationPath, Xpriv};
use bitcoin::key::{CompressedPublicKey, PublicKey as BitcoinPublicKey};
use bitcoin::secp256k1::Secp256k1;
use bitcoin::{Address, PrivateKey};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{SignerError, SignerResult};
use crate::types::Network;

use super::Wallet;

/// Freshly generated signer secret and the wallet it derives
#[derive(Serialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedWallet {
    pub mnemonic: String,
    pub derivation_path: String,
    pub private_key_wif: String,
    pub public_key_hex: String,
    pub address: String,
}

/// Derive the service wallet from a mnemonic phrase
///
/// SECURITY: the seed is zeroized once the child key is derived
pub fn initialize_wallet(mnemonic_phrase: &str, network: Network) -> SignerResult<Wallet> {
    let mnemonic = Mnemonic::parse(mnemonic_phrase)?;
    let seed = Zeroizing::new(mnemonic.to_seed(""));

    let secp = Secp256k1::new();
    let btc_network = network.to_bitcoin();
    let master = Xpriv::new_master(btc_network, seed.as_ref())?;
    let derivation_path = DerivationPath::from_str(network.derivation_path())?;
    let child = master.derive_priv(&secp, &derivation_path)?;

    let private_key = PrivateKey::new(child.private_key, btc_network);
    let public_key = BitcoinPublicKey::from(child.private_key.public_key(&secp));
    let public_key = CompressedPublicKey::try_from(public_key)
        .map_err(|e| SignerError::address_generation_failed(format!("Failed to generate wallet address: {}", e)))?;

    let address = Address::p2wpkh(&public_key, btc_network);
    if address.address_type() != Some(AddressType::P2wpkh) {
        return Err(SignerError::address_generation_failed("Failed to generate wallet address"));
    }

    Ok(Wallet {
        network,
        derivation_path,
        private_key,
        public_key,
        address,
    })
}

/// Create a new 12-word mnemonic and derive its wallet
///
/// SECURITY: entropy is zeroized after mnemonic generation
pub fn generate_wallet(network: Network) -> SignerResult<GeneratedWallet> {
    let mut entropy = Zeroizing::new([0u8; 16]); // 128 bits = 12 words
    OsRng.fill_bytes(entropy.as_mut());

    let mnemonic = Mnemonic::from_entropy(entropy.as_ref())
        .map_err(|e| SignerError::internal(format!("Failed to create mnemonic: {}", e)))?;
    let phrase = Zeroizing::new(mnemonic.to_string());

    let wallet = initialize_wallet(&phrase, network)?;

    Ok(GeneratedWallet {
        mnemonic: phrase.to_string(),
        derivation_path: network.derivation_path().to_string(),
        private_key_wif: wallet.private_key().to_wif(),
        public_key_hex: hex::encode(wallet.public_key().to_bytes()),
        address: wallet.address().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_bip84_mainnet_vector() {
        let wallet = initialize_wallet(TEST_MNEMONIC, Network::Mainnet).unwrap();
        assert_eq!(wallet.address().to_string(), "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu");
        assert_eq!(
            hex::encode(wallet.public_key().to_bytes()),
            "0330d54fd0dd420a6e5f8d3624f5f3482cae350f79d5f0753bf5beef9c2d91af3c"
        );
        assert_eq!(wallet.private_key().to_wif(), "KyZpNDKnfs94vbrwhJneDi77V6jF64PWPF8x5cdJb8ifgg2DUc9d");
        assert_eq!(wallet.derivation_path(), &DerivationPath::from_str("m/84'/0'/0'/0/0").unwrap());
    }

    #[test]
    fn test_testnet_uses_coin_type_one() {
        let mainnet = initialize_wallet(TEST_MNEMONIC, Network::Mainnet).unwrap();
        let testnet = initialize_wallet(TEST_MNEMONIC, Network::Testnet).unwrap();

        assert!(testnet.address().to_string().starts_with("tb1q"));
        assert_ne!(mainnet.public_key(), testnet.public_key());
        assert_eq!(testnet.derivation_path(), &DerivationPath::from_str("m/84'/1'/0'/0/0").unwrap());
    }

    #[test]
    fn test_invalid_mnemonic() {
        let err = initialize_wallet("abandon abandon abandon", Network::Testnet).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidMnemonic);
        assert_eq!(err.message, "Invalid mnemonic phrase");
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let wallet = initialize_wallet(TEST_MNEMONIC, Network::Mainnet).unwrap();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("KyZpNDKnfs94"));
    }

    #[test]
    fn test_generate_wallet() {
        let generated = generate_wallet(Network::Testnet).unwrap();
        assert_eq!(generated.mnemonic.split_whitespace().count(), 12);
        assert!(generated.address.starts_with("tb1q"));

        let restored = initialize_wallet(&generated.mnemonic, Network::Testnet).unwrap();
        assert_eq!(restored.address().to_string(), generated.address);
        assert_eq!(restored.private_key().to_wif(), generated.private_key_wif);
    }
}

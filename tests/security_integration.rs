//! Security Integration Tests
//!
//! Secrets must never leak through error messages, debug output or logs.

use btc_batch_signer::secrets::parse_secret_json;
use btc_batch_signer::utils::logging::{LogEntry, LogLevel};
use btc_batch_signer::{
    initialize_wallet, EnvSecretStore, ErrorCode, JsonSecretStore, Network, SecretStore, SignerError,
};
use secrecy::ExposeSecret;

const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
const TEST_WIF: &str = "KyZpNDKnfs94vbrwhJneDi77V6jF64PWPF8x5cdJb8ifgg2DUc9d";

// MARK: - Wallet

#[test]
fn wallet_debug_hides_private_key() {
    let wallet = initialize_wallet(TEST_MNEMONIC, Network::Mainnet).unwrap();
    let debug = format!("{:?}", wallet);

    assert!(debug.contains("[REDACTED]"));
    assert!(!debug.contains(TEST_WIF));
    assert!(debug.contains("bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu"));
}

#[test]
fn invalid_mnemonic_error_does_not_echo_phrase() {
    let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
    let err = initialize_wallet(phrase, Network::Testnet).unwrap_err();

    assert_eq!(err.code, ErrorCode::InvalidMnemonic);
    assert_eq!(err.public_message(), "Invalid mnemonic phrase");
    assert!(!err.to_string().contains("abandon"));
}

// MARK: - Secrets

#[test]
fn secret_json_parsing() {
    let secret = parse_secret_json(&format!(r#"{{"BTC_MNEMONIC":"  {}  "}}"#, TEST_MNEMONIC)).unwrap();
    assert_eq!(secret.expose_secret(), TEST_MNEMONIC);

    let err: SignerError = parse_secret_json("").unwrap_err().into();
    assert_eq!(err.code, ErrorCode::Config);
    assert_eq!(err.public_message(), "SecretString is empty, expected JSON in SecretString");

    let err: SignerError = parse_secret_json(r#"{"OTHER":"x"}"#).unwrap_err().into();
    assert_eq!(err.code, ErrorCode::Config);
}

#[test]
fn malformed_secret_is_not_quoted_in_errors() {
    let leaked = "abandon abandon abandon";
    let err = parse_secret_json(&format!(r#"{{"BTC_MNEMONIC": {}}}"#, leaked)).unwrap_err();
    assert!(!err.to_string().contains("abandon"));
}

#[test]
fn json_secret_store_debug_is_opaque() {
    let store = JsonSecretStore::new(format!(r#"{{"BTC_MNEMONIC":"{}"}}"#, TEST_MNEMONIC));
    let mnemonic = store.mnemonic().unwrap();
    assert!(!format!("{:?}", mnemonic).contains("abandon"));
}

#[test]
fn env_secret_store_missing_variable() {
    let store = EnvSecretStore::new("BTC_SIGNER_TEST_UNSET_SECRET");
    let err = store.mnemonic().unwrap_err();
    assert_eq!(err.code, ErrorCode::Config);
    assert!(err.message.contains("BTC_SIGNER_TEST_UNSET_SECRET"));
}

// MARK: - Errors and logs

#[test]
fn internal_errors_are_generic_for_callers() {
    let err = SignerError::internal("prevout sum 1000 does not match outputs 900 + fee 50");
    assert_eq!(err.public_message(), "Batch payment failed");
}

#[test]
fn log_fields_are_redacted() {
    let line = LogEntry::new(LogLevel::Info, "test", "wallet loaded")
        .field("mnemonic", TEST_MNEMONIC)
        .field("private_key_wif", TEST_WIF)
        .field("wallet_address", "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu")
        .field("payments", 3)
        .render();

    assert!(!line.contains("abandon"));
    assert!(!line.contains(TEST_WIF));
    assert!(line.contains("bc1qcr...6fyu"));
    assert!(line.contains("wallet loaded"));
    assert!(line.contains("payments=3"));
}

//! Shared types for the batch signer
//!
//! Request and response records that cross module boundaries are defined
//! here so serialization stays consistent between the library, the handler
//! and the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Network
// =============================================================================

/// Supported Bitcoin networks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Testnet,
}

impl Network {
    pub fn to_bitcoin(self) -> bitcoin::Network {
        match self {
            Network::Mainnet => bitcoin::Network::Bitcoin,
            Network::Testnet => bitcoin::Network::Testnet,
        }
    }

    /// BIP84 path of the single receive key (account 0, external chain, index 0)
    pub fn derivation_path(self) -> &'static str {
        match self {
            Network::Mainnet => "m/84'/0'/0'/0/0",
            Network::Testnet => "m/84'/1'/0'/0/0",
        }
    }

    /// Fee rate in sat/vB used when the caller's estimates carry no usable rate
    pub fn fallback_fee_rate(self) -> f64 {
        match self {
            Network::Mainnet => 5.0,
            Network::Testnet => 1.0,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" | "main" | "bitcoin" => Ok(Network::Mainnet),
            "testnet" | "test" => Ok(Network::Testnet),
            other => Err(format!("unknown network '{}', expected 'mainnet' or 'testnet'", other)),
        }
    }
}

// =============================================================================
// Payment Request
// =============================================================================

/// A single payee of the batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub address: String,
    /// Amount in satoshis
    pub amount: u64,
}

/// Spendable output supplied by the caller.
///
/// The engine does not look these up on chain; every UTXO is assumed to be
/// locked to the wallet's own P2WPKH address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    /// Value in satoshis
    pub value: u64,
    pub confirmations: u64,
}

/// Fee rates in sat/vB as reported by a mempool fee endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeEstimates {
    #[serde(default)]
    pub fastest_fee: f64,
    #[serde(default)]
    pub half_hour_fee: f64,
    #[serde(default)]
    pub hour_fee: f64,
    #[serde(default)]
    pub minimum_fee: f64,
}

/// Batch payment request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayBatchParams {
    pub recipients: Vec<Recipient>,
    pub utxos: Vec<Utxo>,
    pub recommended_fees: FeeEstimates,
}

// =============================================================================
// Responses
// =============================================================================

/// Result of a successfully signed batch payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayBatchResponse {
    pub tx_hex: String,
    pub tx_id: String,
    pub recipient_count: usize,
    /// Fee in satoshis
    pub fee: u64,
    /// Sum of recipient amounts in satoshis
    pub total_amount: u64,
    pub wallet_address: String,
}

/// Envelope returned by the request handler
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<PayBatchResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<Vec<String>>,
}

impl CommandResponse {
    pub fn ok(result: PayBatchResponse) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    pub fn err(errors: Vec<String>) -> Self {
        Self {
            result: None,
            error: Some(errors),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.result.is_some()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"error":["Serialization failed"]}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_properties() {
        assert_eq!(Network::Mainnet.to_bitcoin(), bitcoin::Network::Bitcoin);
        assert_eq!(Network::Testnet.derivation_path(), "m/84'/1'/0'/0/0");
        assert_eq!(Network::Mainnet.fallback_fee_rate(), 5.0);
        assert_eq!(Network::Testnet.fallback_fee_rate(), 1.0);
        assert_eq!("TESTNET".parse::<Network>(), Ok(Network::Testnet));
        assert_eq!("bitcoin".parse::<Network>(), Ok(Network::Mainnet));
        assert!("regtest".parse::<Network>().is_err());
    }

    #[test]
    fn test_params_deserialize_camel_case() {
        let params: PayBatchParams = serde_json::from_str(
            r#"{
                "recipients": [{ "address": "tb1q", "amount": 1000 }],
                "utxos": [{ "txid": "ab", "vout": 1, "value": 5000, "confirmations": 3 }],
                "recommendedFees": { "fastestFee": 10, "halfHourFee": 5, "hourFee": 3, "minimumFee": 1 }
            }"#,
        )
        .unwrap();

        assert_eq!(params.recipients[0].amount, 1000);
        assert_eq!(params.utxos[0].vout, 1);
        assert_eq!(params.recommended_fees.half_hour_fee, 5.0);
    }

    #[test]
    fn test_command_response_omits_empty_fields() {
        let json = CommandResponse::err(vec!["data must be an object".to_string()]).to_json();
        assert_eq!(json, r#"{"error":["data must be an object"]}"#);
    }
}

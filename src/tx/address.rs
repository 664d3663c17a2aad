//! Output address decoding
//!
//! Recipient addresses are accepted in any standard format (P2PKH, P2SH,
//! P2WPKH, P2WSH, P2TR) as long as they belong to the configured network.

use bitcoin::{Address, ScriptBuf};
use std::str::FromStr;

use crate::error::{SignerError, SignerResult};
use crate::types::{Network, Recipient};

/// Decode an address into its locking script for `network`
pub fn address_to_script(address: &str, network: Network) -> SignerResult<ScriptBuf> {
    let invalid = || SignerError::invalid_address("Invalid Bitcoin address");

    let unchecked = Address::from_str(address.trim()).map_err(|_| invalid())?;
    let checked = unchecked.require_network(network.to_bitcoin()).map_err(|_| invalid())?;
    Ok(checked.script_pubkey())
}

/// Decode every recipient address, in order. Fails on the first bad one.
pub fn resolve_recipient_scripts(recipients: &[Recipient], network: Network) -> SignerResult<Vec<ScriptBuf>> {
    recipients
        .iter()
        .enumerate()
        .map(|(index, recipient)| {
            address_to_script(&recipient.address, network)
                .map_err(|e| e.with_context(serde_json::json!({ "recipientIndex": index })))
        })
        .collect()
}

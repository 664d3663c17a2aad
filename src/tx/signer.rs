//! Transaction Signer
//!
//! Signs every input of a batch with the wallet's single key (P2WPKH,
//! SIGHASH_ALL), checks each input finalized with a verifying signature and
//! extracts the raw hex and txid.

use bitcoin::consensus::encode;
use bitcoin::hashes::Hash;
use bitcoin::secp256k1::{ecdsa::Signature, Message, Secp256k1, Verification};
use bitcoin::sighash::{EcdsaSighashType, SighashCache};
use bitcoin::{Transaction, TxOut, Witness};

use crate::error::{SignerError, SignerResult};
use crate::wallet::Wallet;

use super::builder::UnsignedBatch;

/// Fully signed transaction ready for broadcast by the caller
#[derive(Debug, Clone)]
pub struct SignedBatch {
    pub tx: Transaction,
    pub tx_hex: String,
    pub txid: String,
}

/// Reject a transaction that must never be signed: no inputs or outputs,
/// a dust output, or value that does not add up to `expected_fee`.
///
/// Dust is judged per output script (546 sat for P2PKH, 294 for P2WPKH,
/// 330 for P2TR and so on).
pub fn check_before_signing(batch: &UnsignedBatch, expected_fee: u64) -> SignerResult<()> {
    if batch.tx.input.is_empty() || batch.tx.output.is_empty() {
        return Err(SignerError::internal("Transaction has no inputs or no outputs"));
    }
    if batch.tx.input.len() != batch.prevouts.len() {
        return Err(SignerError::internal("Spent outputs do not match transaction inputs"));
    }
    if let Some(index) = batch
        .tx
        .output
        .iter()
        .position(|o| o.value < o.script_pubkey.minimal_non_dust())
    {
        return Err(SignerError::internal("Transaction output is below the dust limit")
            .with_context(serde_json::json!({ "outputIndex": index })));
    }

    let input_value = batch.input_value();
    let output_value = batch.output_value();
    if output_value.checked_add(expected_fee) != Some(input_value) {
        return Err(SignerError::internal("Transaction value does not balance").with_context(serde_json::json!({
            "inputSat": input_value,
            "outputSat": output_value,
            "feeSat": expected_fee,
        })));
    }

    Ok(())
}

fn sighash_message(
    cache: &mut SighashCache<&mut Transaction>,
    index: usize,
    prevout: &TxOut,
) -> SignerResult<Message> {
    let sighash = cache
        .p2wpkh_signature_hash(index, &prevout.script_pubkey, prevout.value, EcdsaSighashType::All)
        .map_err(|e| {
            SignerError::signing_failed(format!("Failed to compute sighash: {}", e))
                .with_context(serde_json::json!({ "inputIndex": index }))
        })?;
    Ok(Message::from_digest(sighash.to_byte_array()))
}

/// Sign every input with the wallet key and return the extracted transaction
pub fn sign_transaction(wallet: &Wallet, batch: UnsignedBatch) -> SignerResult<SignedBatch> {
    let secp = Secp256k1::new();
    let UnsignedBatch { mut tx, prevouts } = batch;
    let secret_key = &wallet.private_key().inner;
    let public_key = wallet.public_key();

    let mut sighasher = SighashCache::new(&mut tx);
    for (index, prevout) in prevouts.iter().enumerate() {
        if prevout.script_pubkey != wallet.script_pubkey() {
            return Err(SignerError::signing_failed("Input is not spendable by the wallet key")
                .with_context(serde_json::json!({ "inputIndex": index })));
        }

        let msg = sighash_message(&mut sighasher, index, prevout)?;
        let signature = secp.sign_ecdsa(&msg, secret_key);

        // Serialize signature: DER + SighashType byte
        let mut sig_vec = signature.serialize_der().to_vec();
        sig_vec.push(EcdsaSighashType::All as u8);

        let mut witness = Witness::new();
        witness.push(sig_vec);
        witness.push(public_key.to_bytes());

        let slot = sighasher.witness_mut(index).ok_or_else(|| {
            SignerError::signing_failed("Input index out of range")
                .with_context(serde_json::json!({ "inputIndex": index }))
        })?;
        *slot = witness;
    }

    verify_finalized(&secp, wallet, &mut tx, &prevouts)?;

    let tx_hex = hex::encode(encode::serialize(&tx));
    let txid = tx.compute_txid().to_string();

    Ok(SignedBatch { tx, tx_hex, txid })
}

/// Every input must carry `[signature || sighash byte, pubkey]` and the
/// signature must verify against that input's sighash.
fn verify_finalized<C: Verification>(
    secp: &Secp256k1<C>,
    wallet: &Wallet,
    tx: &mut Transaction,
    prevouts: &[TxOut],
) -> SignerResult<()> {
    let public_key = wallet.public_key();
    let pubkey_bytes = public_key.to_bytes();
    let witnesses: Vec<Witness> = tx.input.iter().map(|input| input.witness.clone()).collect();

    let mut cache = SighashCache::new(tx);
    for (index, (witness, prevout)) in witnesses.iter().zip(prevouts).enumerate() {
        let not_finalized = || {
            SignerError::signing_failed("Input could not be finalized")
                .with_context(serde_json::json!({ "inputIndex": index }))
        };

        if witness.len() != 2 || witness.nth(1) != Some(&pubkey_bytes[..]) {
            return Err(not_finalized());
        }

        let sig_bytes = witness.nth(0).ok_or_else(not_finalized)?;
        let (sighash_byte, der) = sig_bytes.split_last().ok_or_else(not_finalized)?;
        if *sighash_byte != EcdsaSighashType::All as u8 {
            return Err(not_finalized());
        }

        let signature = Signature::from_der(der).map_err(|_| not_finalized())?;
        let msg = sighash_message(&mut cache, index, prevout)?;
        secp.verify_ecdsa(&msg, &signature, &public_key.0)
            .map_err(|_| not_finalized())?;
    }

    Ok(())
}

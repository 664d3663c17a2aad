//! Transaction Builder
//!
//! Maps caller UTXOs to inputs and recipients (+ optional change) to outputs.
//! Output order is never shuffled: recipients in request order, change last.

use bitcoin::{
    absolute::LockTime, transaction::Version, Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut,
    Txid, Witness,
};
use std::str::FromStr;

use crate::error::{SignerError, SignerResult};
use crate::fees::CHANGE_DUST_LIMIT_SAT;
use crate::types::{Recipient, Utxo};
use crate::wallet::Wallet;

use super::address::resolve_recipient_scripts;

/// Unsigned transaction plus the outputs its inputs spend
#[derive(Debug, Clone)]
pub struct UnsignedBatch {
    pub tx: Transaction,
    /// Spent output of each input, index-aligned with `tx.input`
    pub prevouts: Vec<TxOut>,
}

impl UnsignedBatch {
    pub fn input_value(&self) -> u64 {
        self.prevouts.iter().map(|p| p.value.to_sat()).sum()
    }

    pub fn output_value(&self) -> u64 {
        self.tx.output.iter().map(|o| o.value.to_sat()).sum()
    }
}

fn parse_txid(utxo: &Utxo, index: usize) -> SignerResult<Txid> {
    let invalid = || {
        SignerError::invalid_input("Invalid UTXO transaction id")
            .with_context(serde_json::json!({ "utxoIndex": index }))
    };

    if utxo.txid.len() != 64 {
        return Err(invalid());
    }
    Txid::from_str(&utxo.txid).map_err(|_| invalid())
}

/// Build the unsigned batch transaction.
///
/// Every UTXO is assumed to pay the wallet's own P2WPKH address; its spent
/// script is taken from the wallet, not from the chain.
pub fn build_transaction(
    wallet: &Wallet,
    utxos: &[Utxo],
    recipients: &[Recipient],
    change: u64,
) -> SignerResult<UnsignedBatch> {
    if utxos.is_empty() {
        return Err(SignerError::invalid_input("No UTXOs provided"));
    }
    if recipients.is_empty() {
        return Err(SignerError::invalid_input("No recipients provided"));
    }

    let wallet_script: ScriptBuf = wallet.script_pubkey();
    let recipient_scripts = resolve_recipient_scripts(recipients, wallet.network())?;

    let mut inputs = Vec::with_capacity(utxos.len());
    let mut prevouts = Vec::with_capacity(utxos.len());
    for (index, utxo) in utxos.iter().enumerate() {
        inputs.push(TxIn {
            previous_output: OutPoint::new(parse_txid(utxo, index)?, utxo.vout),
            script_sig: ScriptBuf::new(), // Segwit inputs have empty script_sig
            sequence: Sequence::MAX,
            witness: Witness::default(),
        });
        prevouts.push(TxOut {
            value: Amount::from_sat(utxo.value),
            script_pubkey: wallet_script.clone(),
        });
    }

    let mut outputs: Vec<TxOut> = recipients
        .iter()
        .zip(recipient_scripts)
        .map(|(recipient, script_pubkey)| TxOut {
            value: Amount::from_sat(recipient.amount),
            script_pubkey,
        })
        .collect();

    if change > CHANGE_DUST_LIMIT_SAT {
        outputs.push(TxOut {
            value: Amount::from_sat(change),
            script_pubkey: wallet_script,
        });
    }

    let tx = Transaction {
        version: Version::TWO,
        lock_time: LockTime::ZERO,
        input: inputs,
        output: outputs,
    };

    crate::log_debug!(
        "tx::builder",
        "Transaction built",
        inputs = tx.input.len(),
        outputs = tx.output.len(),
        change = change
    );

    Ok(UnsignedBatch { tx, prevouts })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::types::Network;
    use crate::wallet::initialize_wallet;

    const TEST_MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    const RECIPIENT_A: &str = "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx";
    const RECIPIENT_B: &str = "tb1qrp33g0q5c5txsp9arysrx4k6zdkfs4nce4xj0gdcccefvpysxf3q0sl5k7";

    fn wallet() -> Wallet {
        initialize_wallet(TEST_MNEMONIC, Network::Testnet).unwrap()
    }

    fn utxo(txid_byte: &str, vout: u32, value: u64) -> Utxo {
        Utxo {
            txid: txid_byte.repeat(32),
            vout,
            value,
            confirmations: 3,
        }
    }

    fn recipient(address: &str, amount: u64) -> Recipient {
        Recipient {
            address: address.to_string(),
            amount,
        }
    }

    #[test]
    fn test_outputs_follow_recipient_order_then_change() {
        let wallet = wallet();
        let batch = build_transaction(
            &wallet,
            &[utxo("11", 0, 30_000), utxo("22", 3, 20_000)],
            &[recipient(RECIPIENT_B, 7_000), recipient(RECIPIENT_A, 5_000)],
            10_000,
        )
        .unwrap();

        assert_eq!(batch.tx.input.len(), 2);
        assert_eq!(batch.tx.input[1].previous_output.vout, 3);
        assert_eq!(batch.tx.output.len(), 3);
        assert_eq!(batch.tx.output[0].value.to_sat(), 7_000);
        assert!(batch.tx.output[0].script_pubkey.is_p2wsh());
        assert_eq!(batch.tx.output[1].value.to_sat(), 5_000);
        assert_eq!(batch.tx.output[2].value.to_sat(), 10_000);
        assert_eq!(batch.tx.output[2].script_pubkey, wallet.script_pubkey());
        assert_eq!(batch.input_value(), 50_000);
        assert!(batch.prevouts.iter().all(|p| p.script_pubkey == wallet.script_pubkey()));
    }

    #[test]
    fn test_dust_change_gets_no_output() {
        let batch = build_transaction(&wallet(), &[utxo("11", 0, 30_000)], &[recipient(RECIPIENT_A, 5_000)], 294).unwrap();
        assert_eq!(batch.tx.output.len(), 1);

        let batch = build_transaction(&wallet(), &[utxo("11", 0, 30_000)], &[recipient(RECIPIENT_A, 5_000)], 0).unwrap();
        assert_eq!(batch.tx.output.len(), 1);
    }

    #[test]
    fn test_txid_byte_order() {
        let txid = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";
        let batch = build_transaction(
            &wallet(),
            &[Utxo { txid: txid.to_string(), vout: 0, value: 9_000, confirmations: 0 }],
            &[recipient(RECIPIENT_A, 5_000)],
            0,
        )
        .unwrap();
        assert_eq!(batch.tx.input[0].previous_output.txid.to_string(), txid);
    }

    #[test]
    fn test_bad_txid() {
        let bad = Utxo { txid: "tx".to_string(), vout: 0, value: 9_000, confirmations: 1 };
        let err = build_transaction(&wallet(), &[bad], &[recipient(RECIPIENT_A, 5_000)], 0).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[test]
    fn test_invalid_recipient_address() {
        let err = build_transaction(&wallet(), &[utxo("11", 0, 9_000)], &[recipient("not-an-address", 5_000)], 0)
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidAddress);
    }
}

//! Batch payment service
//!
//! Owns the wallet for its whole lifetime and turns one validated
//! [`PayBatchParams`] into one signed transaction. Nothing is kept between
//! calls.

use crate::error::{ErrorCode, SignerError, SignerResult};
use crate::fees::estimate_change_and_fee;
use crate::tx::{build_transaction, check_before_signing, resolve_recipient_scripts, sign_transaction};
use crate::types::{Network, PayBatchParams, PayBatchResponse};
use crate::wallet::{initialize_wallet, Wallet};

#[derive(Debug)]
pub struct BatchSigner {
    wallet: Wallet,
}

impl BatchSigner {
    /// Derive the wallet from `mnemonic`; fails with `InvalidMnemonic` or
    /// `AddressGenerationFailed`
    pub fn new(mnemonic: &str, network: Network) -> SignerResult<Self> {
        let wallet = initialize_wallet(mnemonic, network)?;
        crate::log_info!(
            "service",
            "Wallet initialized",
            network = network,
            wallet_address = wallet.address()
        );
        Ok(Self::from_wallet(wallet))
    }

    pub fn from_wallet(wallet: Wallet) -> Self {
        Self { wallet }
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn wallet_address(&self) -> String {
        self.wallet.address().to_string()
    }

    pub fn network(&self) -> Network {
        self.wallet.network()
    }

    /// Build and sign one transaction paying every recipient from every UTXO.
    ///
    /// Stages run in order and the first failure ends the call: recipient
    /// addresses, fee and change, assembly, signing. The returned `fee` is
    /// everything the transaction leaves to miners, dust included.
    pub fn create_and_sign_transaction(&self, params: &PayBatchParams) -> SignerResult<PayBatchResponse> {
        self.sign_batch(params).map_err(|e| match e.code {
            ErrorCode::InvalidInput
            | ErrorCode::InvalidAddress
            | ErrorCode::InsufficientFunds
            | ErrorCode::SigningFailed => e,
            _ => {
                crate::log_error!("service", "Batch payment failed", cause = e);
                SignerError::internal(e.message.clone()).with_context(serde_json::json!({ "cause": e.to_string() }))
            }
        })
    }

    fn sign_batch(&self, params: &PayBatchParams) -> SignerResult<PayBatchResponse> {
        let PayBatchParams {
            recipients,
            utxos,
            recommended_fees,
        } = params;

        if recipients.is_empty() {
            return Err(SignerError::invalid_input("No recipients provided"));
        }

        resolve_recipient_scripts(recipients, self.network())?;

        let plan = estimate_change_and_fee(utxos, recipients, recommended_fees, self.network())?;
        crate::log_debug!(
            "service",
            "Fee estimated",
            fee = plan.fee,
            change = plan.change,
            dust_absorbed = plan.dust_absorbed,
            vsize = plan.virtual_size
        );

        let unsigned = build_transaction(&self.wallet, utxos, recipients, plan.change)?;
        check_before_signing(&unsigned, plan.fee_paid())?;
        let signed = sign_transaction(&self.wallet, unsigned)?;

        crate::log_info!(
            "service",
            "Batch transaction signed",
            tx_id = signed.txid,
            payments = recipients.len(),
            fee = plan.fee_paid()
        );

        Ok(PayBatchResponse {
            tx_hex: signed.tx_hex,
            tx_id: signed.txid,
            recipient_count: recipients.len(),
            fee: plan.fee_paid(),
            total_amount: plan.total_amount,
            wallet_address: self.wallet_address(),
        })
    }
}

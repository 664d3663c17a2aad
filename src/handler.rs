//! Request handler
//!
//! Entry point for one invocation: `{ "data": <payment request> }` in,
//! [`CommandResponse`] out. Validation problems are returned as a list;
//! any later failure is returned as a single caller-safe message.

use secrecy::ExposeSecret;
use serde_json::Value;

use crate::error::{ErrorCode, SignerResult};
use crate::secrets::SecretStore;
use crate::service::BatchSigner;
use crate::types::{CommandResponse, Network, PayBatchParams, PayBatchResponse};
use crate::validation::parse_pay_batch_params;

pub struct PaymentHandler<S: SecretStore> {
    store: S,
    network: Network,
}

impl<S: SecretStore> PaymentHandler<S> {
    pub fn new(store: S, network: Network) -> Self {
        Self { store, network }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Handle one `{ "data": ... }` event
    pub fn handle(&self, event: &Value) -> CommandResponse {
        let data = event.get("data").unwrap_or(&Value::Null);
        self.handle_data(data)
    }

    /// Handle a bare payment request
    pub fn handle_data(&self, data: &Value) -> CommandResponse {
        let params = match parse_pay_batch_params(data) {
            Ok(params) => params,
            Err(errors) => {
                crate::log_warn!("handler", "Payment request rejected", errors = errors.len());
                return CommandResponse::err(errors);
            }
        };

        crate::log_info!(
            "handler",
            "An attempt to create and sign transaction",
            at = chrono::Utc::now().to_rfc3339(),
            payments = params.recipients.len(),
            utxos = params.utxos.len()
        );

        match self.sign(&params) {
            Ok(result) => CommandResponse::ok(result),
            Err(e) => {
                if e.code == ErrorCode::Internal {
                    crate::log_error!("handler", "Batch payment failed", cause = e);
                } else {
                    crate::log_warn!("handler", "Batch payment refused", cause = e);
                }
                CommandResponse::err(vec![e.public_message()])
            }
        }
    }

    /// Wallet address the configured secret derives to
    pub fn wallet_address(&self) -> SignerResult<String> {
        let mnemonic = self.store.mnemonic()?;
        let signer = BatchSigner::new(mnemonic.expose_secret(), self.network)?;
        Ok(signer.wallet_address())
    }

    fn sign(&self, params: &PayBatchParams) -> SignerResult<PayBatchResponse> {
        let mnemonic = self.store.mnemonic()?;
        let signer = BatchSigner::new(mnemonic.expose_secret(), self.network)?;
        signer.create_and_sign_transaction(params)
    }
}

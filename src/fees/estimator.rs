//! Fee & Change Estimator
//!
//! Sizes a single-key native segwit spend, picks a fee rate from the
//! caller's estimates and decides whether a change output is worth creating.
//!
//! All arithmetic is done in integers. Fee rates arrive as sat/vB numbers and
//! are converted once to milli-satoshis per vByte; the fee is rounded up to
//! the next whole satoshi.

use serde::Serialize;

use crate::error::{SignerError, SignerResult};
use crate::types::{FeeEstimates, Network, Recipient, Utxo};

/// Transaction size constants (in virtual bytes) for P2WPKH spends
pub struct TxSizeEstimates;

impl TxSizeEstimates {
    /// P2WPKH input, witness discounted
    pub const INPUT_VBYTES: u64 = 68;

    /// P2WPKH output
    pub const OUTPUT_VBYTES: u64 = 31;

    /// Version, locktime, counts and segwit marker
    pub const OVERHEAD_VBYTES: u64 = 11;
}

/// Change at or below this value is not worth an output (P2WPKH dust limit)
pub const CHANGE_DUST_LIMIT_SAT: u64 = 294;

const MSAT_PER_SAT: u64 = 1_000;

/// Fee and change decision for one batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeAndChange {
    /// `virtual_size * fee_rate`, rounded up
    pub fee: u64,
    /// Value of the change output, 0 when there is none
    pub change: u64,
    /// Leftover below the dust limit that goes to miners with the fee
    pub dust_absorbed: u64,
    pub virtual_size: u64,
    pub fee_rate_msat_per_vbyte: u64,
    pub num_outputs: usize,
    pub total_input: u64,
    pub total_amount: u64,
}

impl FeeAndChange {
    pub fn has_change_output(&self) -> bool {
        self.change > CHANGE_DUST_LIMIT_SAT
    }

    /// What the transaction actually pays to miners
    pub fn fee_paid(&self) -> u64 {
        self.fee + self.dust_absorbed
    }
}

/// Estimated virtual size of a transaction with the given shape
pub fn estimate_virtual_size(num_inputs: usize, num_outputs: usize) -> u64 {
    num_inputs as u64 * TxSizeEstimates::INPUT_VBYTES
        + num_outputs as u64 * TxSizeEstimates::OUTPUT_VBYTES
        + TxSizeEstimates::OVERHEAD_VBYTES
}

/// Fee rate in sat/vB: half-hour estimate, then hour estimate, then the
/// network fallback. Zero, negative or non-finite rates count as absent.
pub fn resolve_fee_rate(estimates: &FeeEstimates, network: Network) -> f64 {
    [estimates.half_hour_fee, estimates.hour_fee]
        .into_iter()
        .find(|rate| rate.is_finite() && *rate > 0.0)
        .unwrap_or_else(|| network.fallback_fee_rate())
}

/// Nearest msat/vB. Any positive rate keeps at least 1 msat/vB.
fn to_msat_per_vbyte(rate: f64) -> SignerResult<u64> {
    if !rate.is_finite() || rate <= 0.0 {
        return Err(SignerError::invalid_input(format!("Unusable fee rate: {} sat/vB", rate)));
    }
    // f64 noise: 1.1 * 1000 == 1100.0000000000002
    let msat = (rate * MSAT_PER_SAT as f64).round().max(1.0);
    if !msat.is_finite() || msat >= u64::MAX as f64 {
        return Err(SignerError::invalid_input(format!("Unusable fee rate: {} sat/vB", rate)));
    }
    Ok(msat as u64)
}

/// `virtual_size * rate`, rounded up to whole satoshis
pub fn fee_for_size(virtual_size: u64, rate_msat_per_vbyte: u64) -> SignerResult<u64> {
    virtual_size
        .checked_mul(rate_msat_per_vbyte)
        .map(|msat| msat.div_ceil(MSAT_PER_SAT))
        .ok_or_else(|| SignerError::invalid_input("Fee computation overflowed"))
}

/// Fee for a spend of `num_inputs` P2WPKH inputs into `num_outputs` outputs
pub fn estimate_fee(
    num_inputs: usize,
    num_outputs: usize,
    estimates: &FeeEstimates,
    network: Network,
) -> SignerResult<u64> {
    let rate = to_msat_per_vbyte(resolve_fee_rate(estimates, network))?;
    fee_for_size(estimate_virtual_size(num_inputs, num_outputs), rate)
}

fn checked_total<I: IntoIterator<Item = u64>>(values: I, what: &str) -> SignerResult<u64> {
    values
        .into_iter()
        .try_fold(0u64, |acc, v| acc.checked_add(v))
        .ok_or_else(|| SignerError::invalid_input(format!("Total {} overflows", what)))
}

/// Decide fee and change for spending every UTXO to every recipient.
///
/// A change output is assumed first. If the resulting change would be dust,
/// the change output is dropped, the fee is recomputed for one output less
/// and the leftover is paid to miners.
pub fn estimate_change_and_fee(
    utxos: &[Utxo],
    recipients: &[Recipient],
    estimates: &FeeEstimates,
    network: Network,
) -> SignerResult<FeeAndChange> {
    let total_input = checked_total(utxos.iter().map(|u| u.value), "input value")?;
    let total_amount = checked_total(recipients.iter().map(|r| r.amount), "payment amount")?;
    let rate = to_msat_per_vbyte(resolve_fee_rate(estimates, network))?;

    let mut num_outputs = recipients.len() + 1;
    let mut virtual_size = estimate_virtual_size(utxos.len(), num_outputs);
    let mut fee = fee_for_size(virtual_size, rate)?;
    let mut change = i128::from(total_input) - i128::from(total_amount) - i128::from(fee);

    if change > 0 && change <= i128::from(CHANGE_DUST_LIMIT_SAT) {
        num_outputs = recipients.len();
        virtual_size = estimate_virtual_size(utxos.len(), num_outputs);
        fee = fee_for_size(virtual_size, rate)?;
        change = 0;
    }

    let total_needed = total_amount
        .checked_add(fee)
        .ok_or_else(|| SignerError::invalid_input("Total payment amount overflows"))?;

    if total_input < total_needed {
        return Err(SignerError::insufficient_funds("Insufficient funds for batch payment")
            .with_context(serde_json::json!({
                "availableSat": total_input,
                "requiredSat": total_needed,
                "totalAmountSat": total_amount,
                "feeInSat": fee,
                "recipientCount": recipients.len(),
            })));
    }

    // change is either 0 or above the dust limit here
    let change = change.max(0) as u64;
    let dust_absorbed = total_input - total_needed - change;

    Ok(FeeAndChange {
        fee,
        change,
        dust_absorbed,
        virtual_size,
        fee_rate_msat_per_vbyte: rate,
        num_outputs,
        total_input,
        total_amount,
    })
}

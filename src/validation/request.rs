//! Payment Request Validation
//!
//! Shape and range checks over the raw JSON request. Nothing here knows
//! about Bitcoin address formats or fees; those are checked later against
//! the typed request.
//!
//! Every message starts with the path of the offending field, e.g.
//! `recipients[0].amount must be an integer`.

use serde_json::{Map, Value};

use crate::types::PayBatchParams;

/// Smallest payment accepted per recipient, in satoshis (P2PKH dust floor)
pub const MIN_PAYMENT_SAT: u64 = 546;

/// Options for [`check_positive`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PositiveOptions {
    pub include_zero: bool,
}

pub fn check_object<'a>(path: &str, value: &'a Value, errors: &mut Vec<String>) -> Option<&'a Map<String, Value>> {
    match value.as_object() {
        Some(map) => Some(map),
        None => {
            errors.push(format!("{} must be an object", path));
            None
        }
    }
}

pub fn check_non_empty_string(path: &str, value: &Value, errors: &mut Vec<String>) {
    match value.as_str() {
        Some(s) if !s.trim().is_empty() => {}
        _ => errors.push(format!("{} must be a non-empty string", path)),
    }
}

pub fn check_integer(path: &str, value: &Value, errors: &mut Vec<String>) {
    if !(value.is_i64() || value.is_u64()) {
        errors.push(format!("{} must be an integer", path));
    }
}

pub fn check_positive(path: &str, value: &Value, options: PositiveOptions, errors: &mut Vec<String>) {
    let ok = match value.as_f64() {
        Some(n) if options.include_zero => n >= 0.0,
        Some(n) => n > 0.0,
        None => false,
    };

    if !ok {
        let bound = if options.include_zero { ">= 0" } else { "> 0" };
        errors.push(format!("{} must be a number {}", path, bound));
    }
}

/// Non-empty array whose items are all checked, in order
pub fn check_non_empty_array<F>(path: &str, value: &Value, item_check: F, errors: &mut Vec<String>)
where
    F: Fn(&str, &Value) -> Vec<String>,
{
    let items = match value.as_array() {
        Some(items) if !items.is_empty() => items,
        _ => {
            errors.push(format!("{} must be a non-empty array", path));
            return;
        }
    };

    for (index, item) in items.iter().enumerate() {
        errors.extend(item_check(&format!("{}[{}]", path, index), item));
    }
}

fn field<'a>(map: &'a Map<String, Value>, key: &str) -> &'a Value {
    map.get(key).unwrap_or(&Value::Null)
}

pub fn validate_recipient(path: &str, value: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let Some(map) = check_object(path, value, &mut errors) else {
        return errors;
    };

    check_non_empty_string(&format!("{}.address", path), field(map, "address"), &mut errors);

    let amount_path = format!("{}.amount", path);
    let amount = field(map, "amount");
    check_positive(&amount_path, amount, PositiveOptions::default(), &mut errors);
    check_integer(&amount_path, amount, &mut errors);
    if let Some(n) = amount.as_f64() {
        if n < MIN_PAYMENT_SAT as f64 {
            errors.push(format!(
                "{} is below the minimum payment threshold of {} satoshis",
                amount_path, MIN_PAYMENT_SAT
            ));
        }
    }

    errors
}

pub fn validate_utxo(path: &str, value: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let Some(map) = check_object(path, value, &mut errors) else {
        return errors;
    };
    let non_negative = PositiveOptions { include_zero: true };

    check_non_empty_string(&format!("{}.txid", path), field(map, "txid"), &mut errors);

    let vout_path = format!("{}.vout", path);
    let vout = field(map, "vout");
    check_positive(&vout_path, vout, non_negative, &mut errors);
    check_integer(&vout_path, vout, &mut errors);
    if vout.as_u64().is_some_and(|n| n > u64::from(u32::MAX)) {
        errors.push(format!("{} must be at most {}", vout_path, u32::MAX));
    }

    let value_path = format!("{}.value", path);
    let amount = field(map, "value");
    check_positive(&value_path, amount, PositiveOptions::default(), &mut errors);
    check_integer(&value_path, amount, &mut errors);

    let confirmations_path = format!("{}.confirmations", path);
    let confirmations = field(map, "confirmations");
    check_positive(&confirmations_path, confirmations, non_negative, &mut errors);
    check_integer(&confirmations_path, confirmations, &mut errors);

    errors
}

pub fn validate_recommended_fees(path: &str, value: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    let Some(map) = check_object(path, value, &mut errors) else {
        return errors;
    };

    for key in ["fastestFee", "halfHourFee", "hourFee", "minimumFee"] {
        check_positive(&format!("{}.{}", path, key), field(map, key), PositiveOptions::default(), &mut errors);
    }

    errors
}

/// Validate a raw payment request.
///
/// Returns `None` when the request is well formed, otherwise every problem
/// found, in field order. A non-object request yields a single message.
pub fn validate_pay_batch_params(data: &Value) -> Option<Vec<String>> {
    let mut errors = Vec::new();
    let Some(map) = check_object("data", data, &mut errors) else {
        return Some(errors);
    };

    check_non_empty_array("recipients", field(map, "recipients"), validate_recipient, &mut errors);
    check_non_empty_array("utxos", field(map, "utxos"), validate_utxo, &mut errors);
    errors.extend(validate_recommended_fees("recommendedFees", field(map, "recommendedFees")));

    if errors.is_empty() {
        None
    } else {
        Some(errors)
    }
}

/// Validate then decode a raw payment request
pub fn parse_pay_batch_params(data: &Value) -> Result<PayBatchParams, Vec<String>> {
    if let Some(errors) = validate_pay_batch_params(data) {
        return Err(errors);
    }

    serde_json::from_value(data.clone()).map_err(|e| vec![format!("data could not be decoded: {}", e)])
}

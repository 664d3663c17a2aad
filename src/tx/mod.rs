//! Transaction Module
//!
//! Turns a validated batch request into a signed P2WPKH transaction:
//! address decoding, assembly and signing.

mod address;
mod builder;
mod signer;

pub use address::*;
pub use builder::*;
pub use signer::*;

//! Validation Module
//!
//! Structural validation of incoming payment requests. Runs before any key
//! material is touched or any fee arithmetic is done.

mod request;

pub use request::*;

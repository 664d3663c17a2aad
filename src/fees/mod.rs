//! Fee Estimation Module
//!
//! Size-model fee estimation and the change-output decision for batch
//! payments. Fee rates come from the caller; nothing here touches the network.

mod estimator;

pub use estimator::*;

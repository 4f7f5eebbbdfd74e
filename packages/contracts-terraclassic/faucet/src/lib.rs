//! FCT Faucet Contract
//!
//! Hands out test tokens from a CW20 ledger it is allowed to mint on.
//!
//! # Claim rules
//! - 100 tokens per claim
//! - one claim per wallet every 24 hours
//! - at most 1000 tokens per wallet, ever
//! - no claims while the owner has paused the faucet

pub mod contract;
pub mod error;
pub mod msg;
pub mod state;

pub use crate::error::ContractError;

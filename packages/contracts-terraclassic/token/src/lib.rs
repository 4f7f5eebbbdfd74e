//! FaucetToken (FCT)
//!
//! A plain CW20 ledger (backed by `cw20-base`) with fixed metadata. Minting
//! is limited to a single minter address; the deployer hands that role to the
//! faucet with `UpdateMinter` after both contracts exist.

pub mod contract;
pub mod msg;

pub use cw20_base::ContractError;

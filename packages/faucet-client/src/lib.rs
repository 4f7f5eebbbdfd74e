//! Faucet-Client: shared off-chain library for the FCT faucet
//!
//! Used by the deployer and the dashboard:
//!
//! - **client** - Terra LCD client with mnemonic signing (store, instantiate, execute)
//! - **queries** - Typed faucet/token/wasm-module queries
//! - **events** - Wasm event parsing (`tokens_claimed`, `faucet_paused`)
//! - **artifact** - Deployment artifact JSON (`{token, faucet, network}`)
//! - **units** - Base units to decimal string formatting

pub mod artifact;
pub mod client;
pub mod events;
pub mod queries;
pub mod units;

pub use artifact::DeploymentArtifact;
pub use client::{address_from_mnemonic, GasConfig, TerraClient, TxResult};
pub use events::{FaucetPausedEvent, TokensClaimedEvent, WasmEvent};
pub use queries::{AccountSnapshot, CodeInfo, ContractInfo, FaucetQueryClient};
pub use units::format_units;

pub use faucet::msg as faucet_msg;
pub use faucet_token::msg as token_msg;

//! FCT Faucet Dashboard
//!
//! Web front end for the faucet: connect a wallet, watch its balance and
//! claim eligibility, and claim tokens.
//!
//! - **chain** - LCD-backed reader and signer behind traits
//! - **state** - Shared dashboard state (wallet, snapshot, claim lock)
//! - **claim** - Claim submission and user-facing outcome
//! - **poller** - Periodic snapshot refresh
//! - **view** - HTML page and display formatting
//! - **server** - Axum routes, health and Prometheus metrics

pub mod chain;
pub mod claim;
pub mod config;
pub mod metrics;
pub mod poller;
pub mod server;
pub mod state;
pub mod view;

pub use claim::{ClaimError, ClaimOutcome};
pub use state::{Dashboard, SharedDashboard};

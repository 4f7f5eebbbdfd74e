use cosmwasm_std::{OverflowError, StdError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    Overflow(#[from] OverflowError),

    #[error("Unauthorized: only owner can perform this action")]
    Unauthorized,

    #[error("Faucet is paused")]
    Paused,

    #[error("Cannot claim tokens: next claim at {claimable_at}")]
    Cooldown { claimable_at: u64 },

    #[error("Lifetime limit reached")]
    LifetimeLimitReached,
}

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Uint128};
use cw_storage_plus::{Item, Map};

pub const CONTRACT_NAME: &str = "crates.io:fct-faucet";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const COOLDOWN_SECONDS: u64 = 86_400; // 24 hours
/// Whole tokens minted per claim
pub const CLAIM_AMOUNT: u128 = 100;
/// Whole tokens a single wallet may ever claim
pub const LIFETIME_CAP: u128 = 1_000;

/// Fixed at instantiate, never written again.
#[cw_serde]
pub struct Config {
    pub token: Addr,
    /// Base units (CLAIM_AMOUNT scaled by the token's decimals)
    pub claim_amount: Uint128,
    pub cooldown_seconds: u64,
    /// Base units (LIFETIME_CAP scaled by the token's decimals)
    pub lifetime_cap: Uint128,
}

pub const CONFIG: Item<Config> = Item::new("config");

pub const OWNER: Item<Addr> = Item::new("owner");

pub const PAUSED: Item<bool> = Item::new("paused");

/// user_address => last claim timestamp (seconds)
pub const LAST_CLAIM: Map<&Addr, u64> = Map::new("last_claim");

/// user_address => cumulative base units claimed
pub const TOTAL_CLAIMED: Map<&Addr, Uint128> = Map::new("total_claimed");

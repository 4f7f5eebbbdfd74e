use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::Uint128;

#[cw_serde]
pub struct InstantiateMsg {
    /// CW20 contract the faucet mints from. The faucet must be granted the
    /// minter role on it before claims can succeed.
    pub token: String,
    /// Owner who can pause/unpause. Defaults to the instantiating sender.
    pub owner: Option<String>,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Claim 100 tokens (once per 24h, at most 1000 per wallet)
    RequestTokens {},
    /// Owner: stop or resume all claims
    SetPaused { paused: bool },
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Whether `address` could claim right now
    #[returns(CanClaimResponse)]
    CanClaim { address: String },
    /// Base units `address` may still claim over its lifetime
    #[returns(RemainingAllowanceResponse)]
    RemainingAllowance { address: String },
    /// Timestamp (seconds) of the last successful claim. 0 if never claimed.
    #[returns(LastClaimAtResponse)]
    LastClaimAt { address: String },
    #[returns(TotalClaimedResponse)]
    TotalClaimed { address: String },
    /// Eligibility, next claim time and remaining allowance in one call
    #[returns(ClaimStatusResponse)]
    ClaimStatus { address: String },
    #[returns(PausedResponse)]
    Paused {},
    #[returns(ConfigResponse)]
    Config {},
}

#[cw_serde]
pub struct CanClaimResponse {
    pub can_claim: bool,
}

#[cw_serde]
pub struct RemainingAllowanceResponse {
    pub remaining_allowance: Uint128,
}

#[cw_serde]
pub struct LastClaimAtResponse {
    pub last_claim_at: u64,
}

#[cw_serde]
pub struct TotalClaimedResponse {
    pub total_claimed: Uint128,
}

#[cw_serde]
pub struct ClaimStatusResponse {
    pub can_claim: bool,
    /// 0 if the address has never claimed
    pub next_claim_at: u64,
    pub remaining_allowance: Uint128,
}

#[cw_serde]
pub struct PausedResponse {
    pub paused: bool,
}

#[cw_serde]
pub struct ConfigResponse {
    pub token: String,
    pub owner: String,
    pub claim_amount: Uint128,
    pub cooldown_seconds: u64,
    pub lifetime_cap: Uint128,
}

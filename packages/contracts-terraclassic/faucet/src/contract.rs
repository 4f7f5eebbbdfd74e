use cosmwasm_std::{
    entry_point, to_json_binary, Addr, Binary, CosmosMsg, Deps, DepsMut, Env, MessageInfo,
    Response, StdError, StdResult, Storage, Uint128, WasmMsg,
};
use cw2::set_contract_version;
use cw20::{Cw20ExecuteMsg, Cw20QueryMsg, TokenInfoResponse};

use crate::error::ContractError;
use crate::msg::{
    CanClaimResponse, ClaimStatusResponse, ConfigResponse, ExecuteMsg, InstantiateMsg,
    LastClaimAtResponse, PausedResponse, QueryMsg, RemainingAllowanceResponse,
    TotalClaimedResponse,
};
use crate::state::{
    Config, CLAIM_AMOUNT, CONFIG, CONTRACT_NAME, CONTRACT_VERSION, COOLDOWN_SECONDS, LAST_CLAIM,
    LIFETIME_CAP, OWNER, PAUSED, TOTAL_CLAIMED,
};

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let token = deps.api.addr_validate(&msg.token)?;
    let owner = match msg.owner {
        Some(owner) => deps.api.addr_validate(&owner)?,
        None => info.sender,
    };

    let token_info: TokenInfoResponse = deps
        .querier
        .query_wasm_smart(&token, &Cw20QueryMsg::TokenInfo {})?;
    let unit = 10u128
        .checked_pow(token_info.decimals as u32)
        .map(Uint128::from)
        .ok_or_else(|| StdError::generic_err("Token decimals out of range"))?;

    let config = Config {
        token: token.clone(),
        claim_amount: Uint128::from(CLAIM_AMOUNT).checked_mul(unit)?,
        cooldown_seconds: COOLDOWN_SECONDS,
        lifetime_cap: Uint128::from(LIFETIME_CAP).checked_mul(unit)?,
    };
    CONFIG.save(deps.storage, &config)?;
    OWNER.save(deps.storage, &owner)?;
    PAUSED.save(deps.storage, &false)?;

    Ok(Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("owner", owner)
        .add_attribute("token", token)
        .add_attribute("claim_amount", config.claim_amount)
        .add_attribute("lifetime_cap", config.lifetime_cap))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::RequestTokens {} => execute_request_tokens(deps, env, info),
        ExecuteMsg::SetPaused { paused } => execute_set_paused(deps, info, paused),
    }
}

/// Claim history of one address as stored on chain.
struct Account {
    last_claim_at: Option<u64>,
    total_claimed: Uint128,
}

impl Account {
    fn load(storage: &dyn Storage, addr: &Addr) -> StdResult<Self> {
        Ok(Self {
            last_claim_at: LAST_CLAIM.may_load(storage, addr)?,
            total_claimed: TOTAL_CLAIMED
                .may_load(storage, addr)?
                .unwrap_or_default(),
        })
    }

    fn next_claim_at(&self, config: &Config) -> u64 {
        self.last_claim_at
            .map(|last| last + config.cooldown_seconds)
            .unwrap_or(0)
    }

    fn remaining_allowance(&self, config: &Config) -> Uint128 {
        config.lifetime_cap.saturating_sub(self.total_claimed)
    }

    fn can_claim(&self, config: &Config, paused: bool, now: u64) -> bool {
        !paused
            && now >= self.next_claim_at(config)
            && self.remaining_allowance(config) >= config.claim_amount
    }
}

fn execute_request_tokens(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    if PAUSED.load(deps.storage)? {
        return Err(ContractError::Paused);
    }

    let config = CONFIG.load(deps.storage)?;
    let account = Account::load(deps.storage, &info.sender)?;
    let now = env.block.time.seconds();

    if account.last_claim_at.is_some() && now < account.next_claim_at(&config) {
        return Err(ContractError::Cooldown {
            claimable_at: account.next_claim_at(&config),
        });
    }

    let total_claimed = account.total_claimed.checked_add(config.claim_amount)?;
    if total_claimed > config.lifetime_cap {
        return Err(ContractError::LifetimeLimitReached);
    }

    LAST_CLAIM.save(deps.storage, &info.sender, &now)?;
    TOTAL_CLAIMED.save(deps.storage, &info.sender, &total_claimed)?;

    let mint_msg = CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: config.token.to_string(),
        msg: to_json_binary(&Cw20ExecuteMsg::Mint {
            recipient: info.sender.to_string(),
            amount: config.claim_amount,
        })?,
        funds: vec![],
    });

    Ok(Response::new()
        .add_message(mint_msg)
        .add_attribute("action", "tokens_claimed")
        .add_attribute("user", info.sender)
        .add_attribute("amount", config.claim_amount)
        .add_attribute("timestamp", now.to_string()))
}

fn execute_set_paused(
    deps: DepsMut,
    info: MessageInfo,
    paused: bool,
) -> Result<Response, ContractError> {
    let owner = OWNER.load(deps.storage)?;
    if info.sender != owner {
        return Err(ContractError::Unauthorized);
    }

    PAUSED.save(deps.storage, &paused)?;

    Ok(Response::new()
        .add_attribute("action", "faucet_paused")
        .add_attribute("paused", paused.to_string()))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::CanClaim { address } => to_json_binary(&query_can_claim(deps, env, address)?),
        QueryMsg::RemainingAllowance { address } => {
            to_json_binary(&query_remaining_allowance(deps, address)?)
        }
        QueryMsg::LastClaimAt { address } => to_json_binary(&query_last_claim_at(deps, address)?),
        QueryMsg::TotalClaimed { address } => to_json_binary(&query_total_claimed(deps, address)?),
        QueryMsg::ClaimStatus { address } => {
            to_json_binary(&query_claim_status(deps, env, address)?)
        }
        QueryMsg::Paused {} => to_json_binary(&PausedResponse {
            paused: PAUSED.load(deps.storage)?,
        }),
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
    }
}

fn load_account(deps: Deps, address: &str) -> StdResult<Account> {
    let addr = deps.api.addr_validate(address)?;
    Account::load(deps.storage, &addr)
}

fn query_can_claim(deps: Deps, env: Env, address: String) -> StdResult<CanClaimResponse> {
    let status = query_claim_status(deps, env, address)?;
    Ok(CanClaimResponse {
        can_claim: status.can_claim,
    })
}

fn query_remaining_allowance(deps: Deps, address: String) -> StdResult<RemainingAllowanceResponse> {
    let config = CONFIG.load(deps.storage)?;
    let account = load_account(deps, &address)?;
    Ok(RemainingAllowanceResponse {
        remaining_allowance: account.remaining_allowance(&config),
    })
}

fn query_last_claim_at(deps: Deps, address: String) -> StdResult<LastClaimAtResponse> {
    let account = load_account(deps, &address)?;
    Ok(LastClaimAtResponse {
        last_claim_at: account.last_claim_at.unwrap_or(0),
    })
}

fn query_total_claimed(deps: Deps, address: String) -> StdResult<TotalClaimedResponse> {
    let account = load_account(deps, &address)?;
    Ok(TotalClaimedResponse {
        total_claimed: account.total_claimed,
    })
}

fn query_claim_status(deps: Deps, env: Env, address: String) -> StdResult<ClaimStatusResponse> {
    let config = CONFIG.load(deps.storage)?;
    let paused = PAUSED.load(deps.storage)?;
    let account = load_account(deps, &address)?;

    Ok(ClaimStatusResponse {
        can_claim: account.can_claim(&config, paused, env.block.time.seconds()),
        next_claim_at: account.next_claim_at(&config),
        remaining_allowance: account.remaining_allowance(&config),
    })
}

fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    let owner = OWNER.load(deps.storage)?;
    Ok(ConfigResponse {
        token: config.token.to_string(),
        owner: owner.to_string(),
        claim_amount: config.claim_amount,
        cooldown_seconds: config.cooldown_seconds,
        lifetime_cap: config.lifetime_cap,
    })
}

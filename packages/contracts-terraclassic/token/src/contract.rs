use cosmwasm_std::{entry_point, Binary, Deps, DepsMut, Env, MessageInfo, Response, StdResult};
use cw2::set_contract_version;
use cw20::MinterResponse;
use cw20_base::ContractError;

use crate::msg::{ExecuteMsg, InstantiateMsg, QueryMsg, TOKEN_DECIMALS, TOKEN_NAME, TOKEN_SYMBOL};

pub const CONTRACT_NAME: &str = "crates.io:fct-token";
pub const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    let base_msg = cw20_base::msg::InstantiateMsg {
        name: TOKEN_NAME.to_string(),
        symbol: TOKEN_SYMBOL.to_string(),
        decimals: TOKEN_DECIMALS,
        initial_balances: msg.initial_balances,
        mint: msg.minter.map(|minter| MinterResponse { minter, cap: None }),
        marketing: None,
    };

    let response = cw20_base::contract::instantiate(deps.branch(), env, info, base_msg)?;
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(response
        .add_attribute("action", "instantiate")
        .add_attribute("symbol", TOKEN_SYMBOL))
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    cw20_base::contract::execute(deps, env, info, msg)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    cw20_base::contract::query(deps, env, msg)
}

use cosmwasm_schema::cw_serde;
use cw20::Cw20Coin;

pub const TOKEN_NAME: &str = "FaucetToken";
pub const TOKEN_SYMBOL: &str = "FCT";
pub const TOKEN_DECIMALS: u8 = 18;

#[cw_serde]
pub struct InstantiateMsg {
    /// Address allowed to mint. `None` creates a fixed-supply token.
    pub minter: Option<String>,
    #[serde(default)]
    pub initial_balances: Vec<Cw20Coin>,
}

/// Execute and query messages are the standard CW20 ones.
pub type ExecuteMsg = cw20_base::msg::ExecuteMsg;
pub type QueryMsg = cw20_base::msg::QueryMsg;

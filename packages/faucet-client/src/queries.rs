//! Faucet Query Helpers
//!
//! Typed read-only access to the faucet controller, the FCT token and the
//! wasm module, all through the LCD REST API.

use cosmwasm_std::Uint128;
use cw20::{BalanceResponse, Cw20QueryMsg, MinterResponse, TokenInfoResponse};
use eyre::{eyre, Result, WrapErr};
use faucet::msg::{
    CanClaimResponse, ClaimStatusResponse, ConfigResponse, LastClaimAtResponse, PausedResponse,
    QueryMsg, RemainingAllowanceResponse, TotalClaimedResponse,
};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// On-chain metadata of an instantiated contract
#[derive(Debug, Clone, Deserialize)]
pub struct ContractInfo {
    #[serde(deserialize_with = "string_u64")]
    pub code_id: u64,
}

/// On-chain metadata of stored code
#[derive(Debug, Clone)]
pub struct CodeInfo {
    pub code_id: u64,
    /// SHA-256 of the stored wasm
    pub data_hash: Vec<u8>,
}

/// Everything the dashboard shows for one account, read in one go
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub address: String,
    pub balance: Uint128,
    pub paused: bool,
    pub can_claim: bool,
    /// 0 if the account has never claimed
    pub next_claim_at: u64,
    pub last_claim_at: u64,
    pub remaining_allowance: Uint128,
    pub total_claimed: Uint128,
}

/// Faucet query client
///
/// Uses LCD REST API for all queries.
#[derive(Debug, Clone)]
pub struct FaucetQueryClient {
    lcd_url: String,
    faucet_address: String,
    token_address: String,
    client: Client,
}

impl FaucetQueryClient {
    /// Create a new query client
    pub fn new(lcd_url: &str, faucet_address: &str, token_address: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            lcd_url: lcd_url.trim_end_matches('/').to_string(),
            faucet_address: faucet_address.to_string(),
            token_address: token_address.to_string(),
            client,
        }
    }

    pub fn faucet_address(&self) -> &str {
        &self.faucet_address
    }

    pub fn token_address(&self) -> &str {
        &self.token_address
    }

    /// Generic smart contract query
    pub async fn query_contract<Q: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        contract_address: &str,
        query_msg: &Q,
    ) -> Result<R> {
        let query_json = serde_json::to_string(query_msg)?;
        let query_b64 =
            base64::Engine::encode(&base64::engine::general_purpose::STANDARD, query_json);

        let url = format!(
            "{}/cosmwasm/wasm/v1/contract/{}/smart/{}",
            self.lcd_url, contract_address, query_b64
        );

        let data = self.get_json(&url).await.wrap_err("Failed to query contract")?;
        let query_data = data
            .get("data")
            .ok_or_else(|| eyre!("Missing 'data' field in response"))?;

        serde_json::from_value(query_data.clone())
            .map_err(|e| eyre!("Failed to parse response: {}", e))
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(eyre!(
                "Query failed: {} - {}",
                response.status(),
                response.text().await.unwrap_or_default()
            ));
        }

        Ok(response.json().await?)
    }

    async fn query_faucet<R: for<'de> Deserialize<'de>>(&self, msg: &QueryMsg) -> Result<R> {
        self.query_contract(&self.faucet_address, msg).await
    }

    // =========================================================================
    // Faucet Queries
    // =========================================================================

    pub async fn can_claim(&self, address: &str) -> Result<bool> {
        let res: CanClaimResponse = self
            .query_faucet(&QueryMsg::CanClaim {
                address: address.to_string(),
            })
            .await?;
        Ok(res.can_claim)
    }

    pub async fn remaining_allowance(&self, address: &str) -> Result<Uint128> {
        let res: RemainingAllowanceResponse = self
            .query_faucet(&QueryMsg::RemainingAllowance {
                address: address.to_string(),
            })
            .await?;
        Ok(res.remaining_allowance)
    }

    pub async fn last_claim_at(&self, address: &str) -> Result<u64> {
        let res: LastClaimAtResponse = self
            .query_faucet(&QueryMsg::LastClaimAt {
                address: address.to_string(),
            })
            .await?;
        Ok(res.last_claim_at)
    }

    pub async fn total_claimed(&self, address: &str) -> Result<Uint128> {
        let res: TotalClaimedResponse = self
            .query_faucet(&QueryMsg::TotalClaimed {
                address: address.to_string(),
            })
            .await?;
        Ok(res.total_claimed)
    }

    pub async fn claim_status(&self, address: &str) -> Result<ClaimStatusResponse> {
        self.query_faucet(&QueryMsg::ClaimStatus {
            address: address.to_string(),
        })
        .await
    }

    pub async fn paused(&self) -> Result<bool> {
        let res: PausedResponse = self.query_faucet(&QueryMsg::Paused {}).await?;
        Ok(res.paused)
    }

    pub async fn config(&self) -> Result<ConfigResponse> {
        self.query_faucet(&QueryMsg::Config {}).await
    }

    // =========================================================================
    // Token Queries
    // =========================================================================

    pub async fn token_balance(&self, address: &str) -> Result<Uint128> {
        let res: BalanceResponse = self
            .query_contract(
                &self.token_address,
                &Cw20QueryMsg::Balance {
                    address: address.to_string(),
                },
            )
            .await?;
        Ok(res.balance)
    }

    pub async fn token_info(&self) -> Result<TokenInfoResponse> {
        self.query_contract(&self.token_address, &Cw20QueryMsg::TokenInfo {})
            .await
    }

    /// Current minter of the token, `None` for fixed supply
    pub async fn token_minter(&self) -> Result<Option<MinterResponse>> {
        self.query_contract(&self.token_address, &Cw20QueryMsg::Minter {})
            .await
    }

    /// Read balance and all faucet views for `address`
    pub async fn account_snapshot(&self, address: &str) -> Result<AccountSnapshot> {
        let (balance, paused, status, last_claim_at, total_claimed) = tokio::try_join!(
            self.token_balance(address),
            self.paused(),
            self.claim_status(address),
            self.last_claim_at(address),
            self.total_claimed(address),
        )?;

        Ok(AccountSnapshot {
            address: address.to_string(),
            balance,
            paused,
            can_claim: status.can_claim,
            next_claim_at: status.next_claim_at,
            last_claim_at,
            remaining_allowance: status.remaining_allowance,
            total_claimed,
        })
    }

    // =========================================================================
    // Wasm Module Queries
    // =========================================================================

    pub async fn contract_info(&self, contract_address: &str) -> Result<ContractInfo> {
        let url = format!(
            "{}/cosmwasm/wasm/v1/contract/{}",
            self.lcd_url, contract_address
        );
        let data = self.get_json(&url).await?;
        let info = data
            .get("contract_info")
            .ok_or_else(|| eyre!("Missing 'contract_info' field in response"))?;

        serde_json::from_value(info.clone())
            .map_err(|e| eyre!("Failed to parse contract info: {}", e))
    }

    pub async fn code_info(&self, code_id: u64) -> Result<CodeInfo> {
        let url = format!("{}/cosmwasm/wasm/v1/code/{}", self.lcd_url, code_id);
        let data = self.get_json(&url).await?;
        parse_code_info(&data)
    }
}

fn string_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

/// `data_hash` is hex on most LCDs and base64 on plain gRPC-gateway ones.
fn decode_hash(value: &str) -> Option<Vec<u8>> {
    if let Ok(bytes) = hex::decode(value) {
        if bytes.len() == 32 {
            return Some(bytes);
        }
    }
    base64::Engine::decode(&base64::engine::general_purpose::STANDARD, value)
        .ok()
        .filter(|bytes| bytes.len() == 32)
}

pub(crate) fn parse_code_info(data: &serde_json::Value) -> Result<CodeInfo> {
    let info = data
        .get("code_info")
        .ok_or_else(|| eyre!("Missing 'code_info' field in response"))?;

    let code_id = info
        .get("code_id")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| eyre!("Missing code_id in code info"))?;
    let data_hash = info
        .get("data_hash")
        .and_then(|v| v.as_str())
        .and_then(decode_hash)
        .ok_or_else(|| eyre!("Missing or malformed data_hash in code info"))?;

    Ok(CodeInfo { code_id, data_hash })
}

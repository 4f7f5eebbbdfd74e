//! Terra LCD client for transaction signing and broadcasting
//!
//! Signs with a key derived from a BIP-39 mnemonic, broadcasts through the LCD
//! REST API and waits until the transaction is included in a block.

use std::fmt;
use std::time::{Duration, Instant};

use bip39::Mnemonic;
use cosmrs::{
    bip32::DerivationPath,
    cosmwasm::{MsgExecuteContract, MsgInstantiateContract, MsgStoreCode},
    crypto::secp256k1::SigningKey,
    tx::{self, Fee, Msg, SignDoc, SignerInfo},
    AccountId, Any, Coin,
};
use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::events::{TxEvent, WasmEvent};

/// Terra derivation path (coin type 330)
pub const TERRA_DERIVATION_PATH: &str = "m/44'/330'/0'/0/0";

/// Bech32 prefix of Terra accounts
pub const TERRA_PREFIX: &str = "terra";

const GAS_STORE_CODE: u64 = 5_000_000;
const GAS_INSTANTIATE: u64 = 500_000;
const GAS_EXECUTE: u64 = 400_000;

/// Sequence-mismatch retries per transaction
const MAX_RETRIES: u32 = 3;

/// Fee settings for signed transactions
#[derive(Debug, Clone)]
pub struct GasConfig {
    pub denom: String,
    /// Price per gas unit in `denom`
    pub price: f64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            denom: "uluna".to_string(),
            price: 0.015,
        }
    }
}

/// Account info from LCD
#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfo {
    pub sequence: u64,
    pub account_number: u64,
}

/// A transaction that made it into a block
#[derive(Debug, Clone)]
pub struct TxResult {
    pub txhash: String,
    pub height: u64,
    pub events: Vec<TxEvent>,
}

impl TxResult {
    /// Wasm events emitted by contracts during this transaction
    pub fn wasm_events(&self) -> Vec<WasmEvent> {
        WasmEvent::from_tx_events(&self.events)
    }

    /// First value of `key` across all events of type `event_type`
    pub fn event_attribute(&self, event_type: &str, key: &str) -> Option<&str> {
        self.events
            .iter()
            .filter(|e| e.event_type == event_type)
            .flat_map(|e| e.attributes.iter())
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

/// Terra client for signing and broadcasting transactions
pub struct TerraClient {
    lcd_url: String,
    chain_id: String,
    gas: GasConfig,
    signing_key: SigningKey,
    pub address: AccountId,
    client: Client,
}

impl fmt::Debug for TerraClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerraClient")
            .field("lcd_url", &self.lcd_url)
            .field("chain_id", &self.chain_id)
            .field("address", &self.address.to_string())
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

/// Derive the signing key for a mnemonic on the Terra derivation path.
pub fn derive_signing_key(mnemonic: &str) -> Result<SigningKey> {
    let mnemonic = Mnemonic::parse(mnemonic).map_err(|e| eyre!("Invalid mnemonic: {}", e))?;

    let seed = mnemonic.to_seed("");
    let path: DerivationPath = TERRA_DERIVATION_PATH
        .parse()
        .map_err(|e| eyre!("Invalid derivation path: {:?}", e))?;

    SigningKey::derive_from_path(seed, &path)
        .map_err(|e| eyre!("Failed to derive signing key: {}", e))
}

/// Terra address for a mnemonic, without building a client.
pub fn address_from_mnemonic(mnemonic: &str) -> Result<AccountId> {
    derive_signing_key(mnemonic)?
        .public_key()
        .account_id(TERRA_PREFIX)
        .map_err(|e| eyre!("Failed to get account ID: {}", e))
}

impl TerraClient {
    /// Create a new Terra client from mnemonic
    pub fn new(lcd_url: &str, chain_id: &str, mnemonic: &str, gas: GasConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .wrap_err("Failed to create HTTP client")?;

        let signing_key = derive_signing_key(mnemonic)?;
        let address = signing_key
            .public_key()
            .account_id(TERRA_PREFIX)
            .map_err(|e| eyre!("Failed to get account ID: {}", e))?;

        info!(
            address = %address,
            chain_id = chain_id,
            "Terra client initialized"
        );

        Ok(Self {
            lcd_url: lcd_url.trim_end_matches('/').to_string(),
            chain_id: chain_id.to_string(),
            gas,
            signing_key,
            address,
            client,
        })
    }

    /// Get the LCD URL
    pub fn lcd_url(&self) -> &str {
        &self.lcd_url
    }

    /// Get the chain ID
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    /// Get account info (sequence and account number)
    pub async fn get_account_info(&self) -> Result<AccountInfo> {
        let url = format!(
            "{}/cosmos/auth/v1beta1/accounts/{}",
            self.lcd_url, self.address
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .wrap_err("Failed to query account info")?;

        if !response.status().is_success() {
            return Err(eyre!(
                "Account query failed: {} - {}",
                response.status(),
                response.text().await.unwrap_or_default()
            ));
        }

        let data: serde_json::Value = response.json().await?;
        parse_account_info(&data)
    }

    /// Upload contract code. Returns the new code id.
    pub async fn store_code(&self, wasm_byte_code: Vec<u8>) -> Result<u64> {
        let msg = MsgStoreCode {
            sender: self.address.clone(),
            wasm_byte_code,
            instantiate_permission: None,
        }
        .to_any()
        .map_err(|e| eyre!("Failed to convert message: {}", e))?;

        let result = self.sign_and_broadcast(vec![msg], GAS_STORE_CODE).await?;
        let code_id = result
            .event_attribute("store_code", "code_id")
            .ok_or_else(|| eyre!("No code_id in store_code events of {}", result.txhash))?;

        code_id
            .parse()
            .map_err(|_| eyre!("Invalid code_id in tx {}: {}", result.txhash, code_id))
    }

    /// Instantiate a stored contract. Returns the new contract address.
    pub async fn instantiate_contract(
        &self,
        code_id: u64,
        msg: &impl Serialize,
        label: &str,
        admin: Option<&AccountId>,
    ) -> Result<String> {
        let msg = MsgInstantiateContract {
            sender: self.address.clone(),
            admin: admin.cloned(),
            code_id,
            label: Some(label.to_string()),
            msg: serde_json::to_vec(msg)?,
            funds: vec![],
        }
        .to_any()
        .map_err(|e| eyre!("Failed to convert message: {}", e))?;

        let result = self.sign_and_broadcast(vec![msg], GAS_INSTANTIATE).await?;
        result
            .event_attribute("instantiate", "_contract_address")
            .map(str::to_string)
            .ok_or_else(|| eyre!("No contract address in instantiate events of {}", result.txhash))
    }

    /// Execute a contract message without funds
    pub async fn execute_contract(
        &self,
        contract_address: &str,
        msg: &impl Serialize,
    ) -> Result<TxResult> {
        let msg = MsgExecuteContract {
            sender: self.address.clone(),
            contract: contract_address
                .parse()
                .map_err(|e| eyre!("Invalid contract address {}: {:?}", contract_address, e))?,
            msg: serde_json::to_vec(msg)?,
            funds: vec![],
        }
        .to_any()
        .map_err(|e| eyre!("Failed to convert message: {}", e))?;

        self.sign_and_broadcast(vec![msg], GAS_EXECUTE).await
    }

    /// Sign, broadcast and confirm, retrying on sequence mismatch
    pub async fn sign_and_broadcast(&self, msgs: Vec<Any>, gas_limit: u64) -> Result<TxResult> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match self.sign_and_broadcast_inner(msgs.clone(), gas_limit).await {
                Ok(result) => return Ok(result),
                Err(e) if is_sequence_mismatch(&e.to_string()) => {
                    warn!(
                        attempt = attempt + 1,
                        max_retries = MAX_RETRIES,
                        error = %e,
                        "Sequence mismatch detected, refreshing account info and retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(500 * (1 << attempt))).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| eyre!("Broadcast failed after {} retries", MAX_RETRIES)))
    }

    async fn sign_and_broadcast_inner(&self, msgs: Vec<Any>, gas_limit: u64) -> Result<TxResult> {
        let account_info = self.get_account_info().await?;
        debug!(
            sequence = account_info.sequence,
            account_number = account_info.account_number,
            "Got account info for signing"
        );

        let fee_amount = ((gas_limit as f64) * self.gas.price).ceil() as u128;
        let fee = Fee::from_amount_and_gas(
            Coin {
                denom: self
                    .gas
                    .denom
                    .parse()
                    .map_err(|e| eyre!("Invalid fee denom {}: {}", self.gas.denom, e))?,
                amount: fee_amount,
            },
            gas_limit,
        );

        let body = tx::Body::new(msgs, "", 0u32);
        let signer_info =
            SignerInfo::single_direct(Some(self.signing_key.public_key()), account_info.sequence);
        let auth_info = signer_info.auth_info(fee);

        let chain_id = self
            .chain_id
            .parse()
            .map_err(|_| eyre!("Invalid chain ID: {}", self.chain_id))?;

        let sign_doc = SignDoc::new(&body, &auth_info, &chain_id, account_info.account_number)
            .map_err(|e| eyre!("Failed to create sign doc: {}", e))?;

        let tx_raw = sign_doc
            .sign(&self.signing_key)
            .map_err(|e| eyre!("Failed to sign transaction: {}", e))?;

        let tx_bytes = tx_raw
            .to_bytes()
            .map_err(|e| eyre!("Failed to serialize transaction: {}", e))?;

        let txhash = self.broadcast_tx(&tx_bytes).await?;
        info!(txhash = %txhash, "Transaction broadcast, waiting for confirmation");

        self.wait_for_tx_confirmation(&txhash).await
    }

    /// Broadcast a signed transaction in sync mode
    async fn broadcast_tx(&self, tx_bytes: &[u8]) -> Result<String> {
        let tx_b64 = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, tx_bytes);

        let broadcast_request = serde_json::json!({
            "tx_bytes": tx_b64,
            "mode": "BROADCAST_MODE_SYNC"
        });

        let broadcast_url = format!("{}/cosmos/tx/v1beta1/txs", self.lcd_url);
        debug!(url = %broadcast_url, tx_bytes_len = tx_bytes.len(), "Broadcasting transaction");

        let response = self
            .client
            .post(&broadcast_url)
            .json(&broadcast_request)
            .send()
            .await
            .map_err(|e| eyre!("Failed to broadcast: {}", e))?;

        let status = response.status();
        let body: serde_json::Value = response
            .json()
            .await
            .unwrap_or_else(|_| serde_json::json!({"error": "Failed to parse response"}));

        if !status.is_success() {
            return Err(eyre!("Broadcast failed ({}): {}", status, body));
        }

        let tx_response = body
            .get("tx_response")
            .ok_or_else(|| eyre!("Broadcast failed: {}", body))?;
        check_tx_code(tx_response)?;

        tx_response
            .get("txhash")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| eyre!("Broadcast response without txhash: {}", body))
    }

    /// Poll the tx endpoint until the transaction appears in a block or timeout.
    async fn wait_for_tx_confirmation(&self, txhash: &str) -> Result<TxResult> {
        let timeout = Duration::from_secs(60);
        let max_delay = Duration::from_secs(3);
        let mut delay = Duration::from_millis(500);

        let start = Instant::now();
        let tx_url = format!("{}/cosmos/tx/v1beta1/txs/{}", self.lcd_url, txhash);

        while start.elapsed() < timeout {
            tokio::time::sleep(delay).await;

            match self.client.get(&tx_url).send().await {
                Ok(response) if response.status().is_success() => {
                    let body: serde_json::Value = response.json().await.unwrap_or_default();
                    if let Some(tx_response) = body.get("tx_response") {
                        let result = parse_tx_response(tx_response)?;
                        debug!(txhash = %txhash, height = result.height, "Transaction confirmed");
                        return Ok(result);
                    }
                }
                Ok(response) => {
                    debug!(
                        txhash = %txhash,
                        status = %response.status(),
                        elapsed_ms = start.elapsed().as_millis(),
                        "Transaction not yet in block, waiting..."
                    );
                }
                Err(e) => {
                    warn!(txhash = %txhash, error = %e, "Error querying transaction status");
                }
            }

            delay = std::cmp::min(delay * 2, max_delay);
        }

        Err(eyre!(
            "Timeout waiting for transaction {} to be confirmed",
            txhash
        ))
    }
}

fn is_sequence_mismatch(error: &str) -> bool {
    error.contains("account sequence mismatch")
        || error.contains("incorrect account sequence")
        || error.contains("code 32")
}

fn check_tx_code(tx_response: &serde_json::Value) -> Result<()> {
    let code = tx_response
        .get("code")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);

    if code != 0 {
        let raw_log = tx_response
            .get("raw_log")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown error");
        return Err(eyre!("Transaction failed (code {}): {}", code, raw_log));
    }
    Ok(())
}

/// Account info comes either flat or nested under `base_account`
/// depending on the account type.
pub(crate) fn parse_account_info(data: &serde_json::Value) -> Result<AccountInfo> {
    let account = data
        .get("account")
        .ok_or_else(|| eyre!("Missing 'account' field in response"))?;

    let field = |name: &str| -> u64 {
        account
            .get(name)
            .or_else(|| account.get("base_account").and_then(|b| b.get(name)))
            .and_then(|v| v.as_str())
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    };

    Ok(AccountInfo {
        sequence: field("sequence"),
        account_number: field("account_number"),
    })
}

/// Turn a confirmed `tx_response` into a [`TxResult`]; failed txs become errors.
pub(crate) fn parse_tx_response(tx_response: &serde_json::Value) -> Result<TxResult> {
    check_tx_code(tx_response).wrap_err("Transaction failed in block")?;

    let txhash = tx_response
        .get("txhash")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let height = tx_response
        .get("height")
        .and_then(|v| v.as_str())
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let events: Vec<TxEvent> = tx_response
        .get("events")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .wrap_err("Malformed tx events")?
        .unwrap_or_default();

    Ok(TxResult {
        txhash,
        height,
        events,
    })
}

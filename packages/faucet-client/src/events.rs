//! Faucet Event Parsing
//!
//! Parses CosmWasm `wasm` events from LCD transaction responses into typed
//! faucet events.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parsed wasm event from a transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WasmEvent {
    /// Contract address that emitted the event
    pub contract_address: String,
    /// Event type (action)
    pub action: String,
    /// Event attributes as key-value pairs
    pub attributes: HashMap<String, String>,
}

impl WasmEvent {
    /// Parse wasm events from transaction events
    pub fn from_tx_events(events: &[TxEvent]) -> Vec<Self> {
        let mut result = Vec::new();

        for event in events {
            if event.event_type != "wasm" {
                continue;
            }

            let mut attrs: HashMap<String, String> = HashMap::new();
            let mut contract_address = String::new();
            let mut action = String::new();

            for attr in &event.attributes {
                match attr.key.as_str() {
                    "_contract_address" => contract_address = attr.value.clone(),
                    "action" => action = attr.value.clone(),
                    _ => {
                        attrs.insert(attr.key.clone(), attr.value.clone());
                    }
                }
            }

            if !contract_address.is_empty() {
                result.push(WasmEvent {
                    contract_address,
                    action,
                    attributes: attrs,
                });
            }
        }

        result
    }

    /// Get an attribute value by key
    pub fn get(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    /// Check if this is a specific action
    pub fn is_action(&self, action: &str) -> bool {
        self.action == action
    }
}

/// Raw transaction event from LCD
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub attributes: Vec<TxEventAttribute>,
}

/// Raw event attribute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxEventAttribute {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// A successful claim (`action = tokens_claimed`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokensClaimedEvent {
    pub faucet: String,
    pub user: String,
    /// Base units minted
    pub amount: u128,
    /// Block time of the claim (seconds)
    pub timestamp: u64,
}

impl TokensClaimedEvent {
    pub fn from_wasm_event(event: &WasmEvent) -> Option<Self> {
        if !event.is_action("tokens_claimed") {
            return None;
        }

        Some(TokensClaimedEvent {
            faucet: event.contract_address.clone(),
            user: event.get("user")?.clone(),
            amount: event.get("amount")?.parse().ok()?,
            timestamp: event.get("timestamp")?.parse().ok()?,
        })
    }
}

/// Pause flag change (`action = faucet_paused`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaucetPausedEvent {
    pub faucet: String,
    pub paused: bool,
}

impl FaucetPausedEvent {
    pub fn from_wasm_event(event: &WasmEvent) -> Option<Self> {
        if !event.is_action("faucet_paused") {
            return None;
        }

        Some(FaucetPausedEvent {
            faucet: event.contract_address.clone(),
            paused: event.get("paused")?.parse().ok()?,
        })
    }
}

//! Claim submission
//!
//! Sends `request_tokens` from the connected wallet, waits for the block, then
//! refreshes the snapshot. One claim at a time; no retries.

use faucet_client::{format_units, token_msg::TOKEN_SYMBOL, TokensClaimedEvent};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::state::Dashboard;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    #[error("No wallet connected")]
    NotConnected,

    #[error("A claim is already in progress")]
    InFlight,

    #[error("{0}")]
    Rejected(String),
}

impl ClaimError {
    /// Text shown to the user
    pub fn user_message(&self) -> String {
        format!("Claim failed: {}", self)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimOutcome {
    pub txhash: String,
    /// Base units minted, when the claim event was found
    pub amount: Option<String>,
    pub message: String,
}

/// Pull the contract's own error out of an LCD failure.
///
/// `"... message index: 0: Lifetime limit reached: execute wasm contract failed"`
/// becomes `"Lifetime limit reached"`.
pub fn rejection_reason(err: &eyre::Report) -> String {
    const MARKER: &str = "message index: 0: ";
    const SUFFIX: &str = ": execute wasm contract failed";

    let text = format!("{:#}", err);
    match text.find(MARKER) {
        Some(i) => text[i + MARKER.len()..]
            .trim_end()
            .trim_end_matches(SUFFIX)
            .to_string(),
        None => err.root_cause().to_string(),
    }
}

impl Dashboard {
    pub async fn claim(&self) -> Result<ClaimOutcome, ClaimError> {
        let result = self.submit_claim().await;

        let message = match &result {
            Ok(outcome) => outcome.message.clone(),
            Err(e) => e.user_message(),
        };
        self.set_message(message).await;

        result
    }

    async fn submit_claim(&self) -> Result<ClaimOutcome, ClaimError> {
        let _guard = self.claim_lock.try_lock().map_err(|_| ClaimError::InFlight)?;

        let wallet = self
            .wallet
            .read()
            .await
            .clone()
            .ok_or(ClaimError::NotConnected)?;
        let faucet = self.contracts().faucet.clone();

        self.metrics.claim_in_flight.set(1);
        self.metrics.claims_submitted_total.inc();
        info!(address = %wallet.address(), faucet = %faucet, "Submitting claim");

        let result = wallet.request_tokens(&faucet).await;
        self.metrics.claim_in_flight.set(0);

        let tx = match result {
            Ok(tx) => tx,
            Err(e) => {
                self.metrics.claims_failed_total.inc();
                let reason = rejection_reason(&e);
                warn!(error = %format!("{:#}", e), reason = %reason, "Claim failed");
                return Err(ClaimError::Rejected(reason));
            }
        };

        self.metrics.claims_succeeded_total.inc();
        let claimed = tx
            .wasm_events()
            .iter()
            .filter_map(TokensClaimedEvent::from_wasm_event)
            .find(|e| e.faucet == faucet);

        let message = match &claimed {
            Some(event) => format!(
                "Claimed {} {}",
                format_units(event.amount, self.decimals()),
                TOKEN_SYMBOL
            ),
            None => "Claim confirmed".to_string(),
        };
        info!(txhash = %tx.txhash, height = tx.height, "Claim confirmed");

        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Refresh after claim failed");
        }

        Ok(ClaimOutcome {
            txhash: tx.txhash,
            amount: claimed.map(|e| e.amount.to_string()),
            message,
        })
    }
}

//! Owner pause control
//!
//! Sends `set_paused` to the faucet and confirms the new flag from the
//! `faucet_paused` event of the included transaction.

use eyre::{eyre, Result, WrapErr};
use faucet_client::faucet_msg::ExecuteMsg;
use faucet_client::FaucetPausedEvent;
use tracing::info;

use crate::deploy::DeployTarget;

/// Set the faucet's pause flag; the signer must be the faucet owner
pub async fn set_paused<T: DeployTarget>(
    target: &T,
    faucet: &str,
    paused: bool,
) -> Result<FaucetPausedEvent> {
    info!(faucet = %faucet, paused, "Updating faucet pause flag");

    let tx = target
        .execute(
            faucet,
            serde_json::to_value(ExecuteMsg::SetPaused { paused })?,
        )
        .await
        .wrap_err_with(|| format!("Failed to set paused={} on {}", paused, faucet))?;

    let event = tx
        .wasm_events()
        .iter()
        .filter_map(FaucetPausedEvent::from_wasm_event)
        .find(|e| e.faucet == faucet)
        .ok_or_else(|| eyre!("No faucet_paused event in tx {}", tx.txhash))?;

    if event.paused != paused {
        return Err(eyre!(
            "Faucet reported paused={} in tx {}, expected {}",
            event.paused,
            tx.txhash,
            paused
        ));
    }

    info!(txhash = %tx.txhash, paused = event.paused, "Faucet pause flag updated");
    Ok(event)
}

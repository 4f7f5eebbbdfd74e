//! Shared dashboard state
//!
//! One connected wallet at most. The poller and the HTTP handlers share a
//! [`Dashboard`] behind an `Arc`; the latest snapshot sits in an `RwLock`.

use std::sync::Arc;

use eyre::Result;
use faucet_client::{AccountSnapshot, DeploymentArtifact};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::chain::{FaucetReader, FaucetSigner, WalletConnector};
use crate::metrics::Metrics;
use crate::view::now_secs;

/// What the page shows, refreshed by the poller and after claims
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    pub snapshot: Option<AccountSnapshot>,
    /// Last refresh error, cleared by the next successful refresh
    pub last_error: Option<String>,
    /// Last user-facing message (claim result, connect failure)
    pub message: Option<String>,
    pub refreshed_at: Option<u64>,
}

pub struct Dashboard {
    contracts: DeploymentArtifact,
    decimals: u8,
    poll_interval_secs: u64,
    reader: Arc<dyn FaucetReader>,
    connector: Arc<dyn WalletConnector>,
    pub(crate) wallet: RwLock<Option<Arc<dyn FaucetSigner>>>,
    pub(crate) view: RwLock<ViewState>,
    /// Held for the whole duration of a claim
    pub(crate) claim_lock: Mutex<()>,
    pub metrics: Arc<Metrics>,
}

pub type SharedDashboard = Arc<Dashboard>;

impl Dashboard {
    pub fn new(
        contracts: DeploymentArtifact,
        decimals: u8,
        poll_interval_secs: u64,
        reader: Arc<dyn FaucetReader>,
        connector: Arc<dyn WalletConnector>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            contracts,
            decimals,
            poll_interval_secs,
            reader,
            connector,
            wallet: RwLock::new(None),
            view: RwLock::new(ViewState::default()),
            claim_lock: Mutex::new(()),
            metrics,
        }
    }

    pub fn contracts(&self) -> &DeploymentArtifact {
        &self.contracts
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn poll_interval_secs(&self) -> u64 {
        self.poll_interval_secs
    }

    /// Replace the connected wallet and load its snapshot.
    ///
    /// A failed first refresh leaves the wallet connected; the poller retries.
    pub async fn connect(&self, mnemonic: &str) -> Result<String> {
        let wallet = self.connector.connect(mnemonic)?;
        let address = wallet.address();

        *self.wallet.write().await = Some(wallet);
        *self.view.write().await = ViewState::default();
        self.metrics.wallet_connected.set(1);
        info!(address = %address, "Wallet connected");

        let _ = self.refresh().await;
        Ok(address)
    }

    pub async fn wallet_address(&self) -> Option<String> {
        self.wallet.read().await.as_ref().map(|w| w.address())
    }

    /// Reload the snapshot of the connected wallet; no-op without one
    pub async fn refresh(&self) -> Result<()> {
        let Some(address) = self.wallet_address().await else {
            return Ok(());
        };

        self.metrics.polls_total.inc();
        let result = self.reader.account_snapshot(&address).await;

        // The wallet may have been swapped while the queries ran
        if self.wallet_address().await.as_deref() != Some(address.as_str()) {
            debug!(address = %address, "Discarding snapshot of disconnected wallet");
            return Ok(());
        }

        let mut view = self.view.write().await;
        match result {
            Ok(snapshot) => {
                let now = now_secs();
                view.snapshot = Some(snapshot);
                view.last_error = None;
                view.refreshed_at = Some(now);
                self.metrics.last_refresh_timestamp.set(now as i64);
                Ok(())
            }
            Err(e) => {
                self.metrics.poll_errors_total.inc();
                view.last_error = Some(format!("{:#}", e));
                Err(e)
            }
        }
    }

    pub async fn view(&self) -> ViewState {
        self.view.read().await.clone()
    }

    pub async fn set_message(&self, message: impl Into<String>) {
        self.view.write().await.message = Some(message.into());
    }

    /// Snapshot of any address, not only the connected wallet
    pub async fn lookup(&self, address: &str) -> Result<AccountSnapshot> {
        self.reader.account_snapshot(address).await
    }

    pub fn claim_in_flight(&self) -> bool {
        self.claim_lock.try_lock().is_err()
    }
}

//! FCT Faucet Dashboard
//!
//! Serves the faucet page, polls the connected wallet's snapshot and submits
//! claims on its behalf.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use dashboard::chain::{FaucetReader, TerraConnector};
use dashboard::config::Config;
use dashboard::metrics::Metrics;
use dashboard::poller::Poller;
use dashboard::server::start_server;
use dashboard::Dashboard;
use faucet_client::token_msg::TOKEN_DECIMALS;
use faucet_client::FaucetQueryClient;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    init_logging();

    info!("Starting FCT Faucet Dashboard");

    let config = Config::load()?;
    info!(
        terra_lcd = %config.terra_lcd_url,
        faucet = %config.contracts.faucet,
        token = %config.contracts.token,
        network = %config.contracts.network,
        "Configuration loaded"
    );

    let reader = Arc::new(FaucetQueryClient::new(
        &config.terra_lcd_url,
        &config.contracts.faucet,
        &config.contracts.token,
    ));
    let decimals = match reader.token_decimals().await {
        Ok(decimals) => decimals,
        Err(e) => {
            warn!(error = %e, default = TOKEN_DECIMALS, "Could not read token decimals");
            TOKEN_DECIMALS
        }
    };

    let connector = Arc::new(TerraConnector {
        lcd_url: config.terra_lcd_url.clone(),
        chain_id: config.terra_chain_id.clone(),
        gas: config.gas(),
    });

    let dashboard = Arc::new(Dashboard::new(
        config.contracts.clone(),
        decimals,
        config.poll_interval_secs,
        reader,
        connector,
        Arc::new(Metrics::new()),
    ));

    if let Some(mnemonic) = &config.terra_mnemonic {
        dashboard.connect(mnemonic).await?;
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::mpsc::channel::<()>(1);

    let poller = Poller::new(
        dashboard.clone(),
        Duration::from_secs(config.poll_interval_secs),
    );
    let poller_handle = tokio::spawn(async move { poller.run(shutdown_rx).await });

    start_server(
        &config.bind_address,
        config.http_port,
        dashboard,
        wait_for_shutdown_signal(),
    )
    .await?;

    let _ = shutdown_tx.send(()).await;
    poller_handle.await??;

    info!("FCT Faucet Dashboard stopped");
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,dashboard=debug,faucet_client=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown");
        }
    }
}

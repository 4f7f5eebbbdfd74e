//! FCT Faucet Deployer
//!
//! Stores and instantiates the token and faucet contracts, hands the minter
//! role to the faucet, writes the address artifact and verifies the result.
//! Also lets the faucet owner pause and resume claims.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::Result;
use tracing::{info, warn};

use deployer::config::Config;
use deployer::deploy::{deploy, DeployPlan};
use deployer::pause::set_paused;
use deployer::verify::verify;
use faucet_client::{DeploymentArtifact, FaucetQueryClient, TerraClient};

const DEFAULT_ADDRESSES_PATH: &str = "deployments/addresses.json";

#[derive(Parser)]
#[command(name = "faucet-deployer")]
#[command(about = "Deploy and operate the FCT token faucet", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy token and faucet, grant the minter role, then verify
    Deploy(DeployArgs),

    /// Stop all claims (faucet owner only)
    Pause(FaucetArgs),

    /// Allow claims again (faucet owner only)
    Unpause(FaucetArgs),
}

#[derive(Args)]
struct DeployArgs {
    /// Compiled token contract
    #[arg(long, default_value = "artifacts/faucet_token.wasm")]
    token_wasm: PathBuf,

    /// Compiled faucet contract
    #[arg(long, default_value = "artifacts/faucet.wasm")]
    faucet_wasm: PathBuf,

    /// Network label stored in the artifact (defaults to the chain id)
    #[arg(long)]
    network: Option<String>,

    /// Where to write the deployed addresses
    #[arg(short, long, default_value = DEFAULT_ADDRESSES_PATH)]
    output: PathBuf,

    /// Seconds to wait before verifying
    #[arg(long, default_value_t = 30)]
    verify_delay_secs: u64,

    /// Skip post-deployment verification
    #[arg(long)]
    skip_verify: bool,
}

#[derive(Args)]
struct FaucetArgs {
    /// Faucet address; read from the deployment artifact when omitted
    #[arg(long)]
    faucet: Option<String>,

    /// Deployment artifact to read the faucet address from
    #[arg(long, default_value = DEFAULT_ADDRESSES_PATH)]
    addresses: PathBuf,
}

impl FaucetArgs {
    fn faucet_address(&self) -> Result<String> {
        match &self.faucet {
            Some(faucet) => Ok(faucet.clone()),
            None => Ok(DeploymentArtifact::load(&self.addresses)?.faucet),
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    init_logging(cli.verbose);

    let config = Config::load()?;
    info!(
        terra_lcd = %config.terra_lcd_url,
        chain_id = %config.terra_chain_id,
        "Configuration loaded"
    );

    let client = TerraClient::new(
        &config.terra_lcd_url,
        &config.terra_chain_id,
        &config.terra_mnemonic,
        config.gas(),
    )?;

    match cli.command {
        Commands::Deploy(args) => run_deploy(&config, &client, args).await,
        Commands::Pause(args) => {
            set_paused(&client, &args.faucet_address()?, true).await?;
            info!("Faucet paused");
            Ok(())
        }
        Commands::Unpause(args) => {
            set_paused(&client, &args.faucet_address()?, false).await?;
            info!("Faucet unpaused");
            Ok(())
        }
    }
}

async fn run_deploy(config: &Config, client: &TerraClient, args: DeployArgs) -> Result<()> {
    let plan = DeployPlan {
        token_wasm: args.token_wasm,
        faucet_wasm: args.faucet_wasm,
        network: args
            .network
            .unwrap_or_else(|| config.terra_chain_id.clone()),
        output: args.output,
    };

    let result = deploy(client, &plan).await?;
    info!(
        token = %result.artifact.token,
        faucet = %result.artifact.faucet,
        output = %plan.output.display(),
        "Contracts deployed"
    );

    if args.skip_verify {
        info!("Skipping verification");
    } else {
        info!(
            delay_secs = args.verify_delay_secs,
            "Waiting before verification"
        );
        tokio::time::sleep(Duration::from_secs(args.verify_delay_secs)).await;

        let queries = FaucetQueryClient::new(
            &config.terra_lcd_url,
            &result.artifact.faucet,
            &result.artifact.token,
        );
        let report = verify(&queries, &plan.token_wasm, &plan.faucet_wasm).await;
        if !report.all_passed() {
            warn!(
                failed = report.failures().count(),
                "Verification incomplete, contracts are deployed regardless"
            );
        }
    }

    info!("Deployment complete!");
    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,deployer=debug,faucet_client=debug"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

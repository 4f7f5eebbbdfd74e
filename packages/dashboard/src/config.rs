//! Dashboard configuration

use std::env;
use std::fmt;
use std::path::PathBuf;

use eyre::{eyre, Result};
use faucet_client::{DeploymentArtifact, GasConfig};

const DEFAULT_ADDRESSES_PATH: &str = "deployments/addresses.json";

#[derive(Clone)]
pub struct Config {
    /// Terra LCD URL
    pub terra_lcd_url: String,
    /// Terra chain ID
    pub terra_chain_id: String,
    /// Deployed contract addresses
    pub contracts: DeploymentArtifact,
    /// Wallet to connect at startup; otherwise connect through the UI
    pub terra_mnemonic: Option<String>,
    /// Seconds between snapshot refreshes (default 30)
    pub poll_interval_secs: u64,
    /// HTTP bind address (default 127.0.0.1)
    pub bind_address: String,
    /// HTTP port (default 3000)
    pub http_port: u16,
    /// Fee denom (default uluna)
    pub fee_denom: String,
    /// Gas price in fee denom (default 0.015)
    pub gas_price: f64,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("terra_lcd_url", &self.terra_lcd_url)
            .field("terra_chain_id", &self.terra_chain_id)
            .field("contracts", &self.contracts)
            .field(
                "terra_mnemonic",
                &self.terra_mnemonic.as_ref().map(|_| "<redacted>"),
            )
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("bind_address", &self.bind_address)
            .field("http_port", &self.http_port)
            .field("fee_denom", &self.fee_denom)
            .field("gas_price", &self.gas_price)
            .finish()
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(v) => v.parse().map_err(|_| eyre!("Invalid {}: {}", key, v)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }

        Self::from_env()
    }

    /// Build from the current process environment only.
    ///
    /// Contract addresses come from `FAUCET_ADDRESS` + `TOKEN_ADDRESS` when
    /// both are set, otherwise from the deployment artifact at
    /// `FAUCET_ADDRESSES_PATH`.
    pub fn from_env() -> Result<Self> {
        let terra_chain_id =
            env::var("TERRA_CHAIN_ID").map_err(|_| eyre!("TERRA_CHAIN_ID required"))?;

        let contracts = match (env::var("FAUCET_ADDRESS"), env::var("TOKEN_ADDRESS")) {
            (Ok(faucet), Ok(token)) => DeploymentArtifact {
                token,
                faucet,
                network: terra_chain_id.clone(),
            },
            _ => {
                let path = env::var("FAUCET_ADDRESSES_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_ADDRESSES_PATH));
                DeploymentArtifact::load(&path)?
            }
        };

        let poll_interval_secs = parse_var("POLL_INTERVAL_SECS", 30u64)?;
        if poll_interval_secs == 0 {
            return Err(eyre!("POLL_INTERVAL_SECS must be greater than 0"));
        }

        Ok(Self {
            terra_lcd_url: env::var("TERRA_LCD_URL")
                .map_err(|_| eyre!("TERRA_LCD_URL required"))?,
            terra_chain_id,
            contracts,
            terra_mnemonic: env::var("TERRA_MNEMONIC").ok().filter(|m| !m.trim().is_empty()),
            poll_interval_secs,
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "127.0.0.1".to_string()),
            http_port: parse_var("HTTP_PORT", 3000u16)?,
            fee_denom: env::var("TERRA_FEE_DENOM").unwrap_or_else(|_| "uluna".to_string()),
            gas_price: parse_var("TERRA_GAS_PRICE", 0.015f64)?,
        })
    }

    pub fn gas(&self) -> GasConfig {
        GasConfig {
            denom: self.fee_denom.clone(),
            price: self.gas_price,
        }
    }
}

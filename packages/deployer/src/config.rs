//! Deployer configuration

use std::env;
use std::fmt;

use eyre::{eyre, Result};
use faucet_client::GasConfig;

/// Chain connection settings, read from the environment (`.env` supported)
#[derive(Clone)]
pub struct Config {
    /// Terra LCD URL
    pub terra_lcd_url: String,
    /// Terra chain ID (e.g. localterra, rebel-2)
    pub terra_chain_id: String,
    /// Deployer mnemonic; becomes token minter, faucet owner and contract admin
    pub terra_mnemonic: String,
    /// Fee denom (default uluna)
    pub fee_denom: String,
    /// Gas price in fee denom (default 0.015)
    pub gas_price: f64,
}

/// Custom Debug that redacts the mnemonic to prevent accidental log leakage.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("terra_lcd_url", &self.terra_lcd_url)
            .field("terra_chain_id", &self.terra_chain_id)
            .field("terra_mnemonic", &"<redacted>")
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

    /// Build from the current process environment only
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            terra_lcd_url: env::var("TERRA_LCD_URL")
                .map_err(|_| eyre!("TERRA_LCD_URL required"))?,
            terra_chain_id: env::var("TERRA_CHAIN_ID")
                .map_err(|_| eyre!("TERRA_CHAIN_ID required"))?,
            terra_mnemonic: env::var("TERRA_MNEMONIC")
                .map_err(|_| eyre!("TERRA_MNEMONIC required"))?,
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

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "TERRA_LCD_URL",
            "TERRA_CHAIN_ID",
            "TERRA_MNEMONIC",
            "TERRA_FEE_DENOM",
            "TERRA_GAS_PRICE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        env::set_var("TERRA_LCD_URL", "http://localhost:1317");
        env::set_var("TERRA_CHAIN_ID", "localterra");
        env::set_var("TERRA_MNEMONIC", "secret words");

        let config = Config::from_env().unwrap();
        assert_eq!(config.terra_chain_id, "localterra");
        assert_eq!(config.fee_denom, "uluna");
        assert_eq!(config.gas_price, 0.015);

        let debug = format!("{:?}", config);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret words"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_required() {
        clear_env();
        env::set_var("TERRA_LCD_URL", "http://localhost:1317");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("TERRA_CHAIN_ID required"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_gas_price() {
        clear_env();
        env::set_var("TERRA_LCD_URL", "http://localhost:1317");
        env::set_var("TERRA_CHAIN_ID", "localterra");
        env::set_var("TERRA_MNEMONIC", "secret words");
        env::set_var("TERRA_GAS_PRICE", "cheap");

        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("Invalid TERRA_GAS_PRICE: cheap"));

        env::set_var("TERRA_GAS_PRICE", "0.2");
        assert_eq!(Config::from_env().unwrap().gas_price, 0.2);
        clear_env();
    }
}

//! Chain access used by the dashboard
//!
//! Reads go through [`FaucetReader`], signed claims through [`FaucetSigner`].
//! The LCD-backed implementations live here; handlers only see the traits.

use std::sync::Arc;

use async_trait::async_trait;
use eyre::Result;
use faucet_client::faucet_msg::ExecuteMsg;
use faucet_client::{AccountSnapshot, FaucetQueryClient, GasConfig, TerraClient, TxResult};

#[async_trait]
pub trait FaucetReader: Send + Sync {
    /// Balance plus every faucet view for `address`
    async fn account_snapshot(&self, address: &str) -> Result<AccountSnapshot>;

    /// Decimals of the faucet token
    async fn token_decimals(&self) -> Result<u8>;
}

#[async_trait]
impl FaucetReader for FaucetQueryClient {
    async fn account_snapshot(&self, address: &str) -> Result<AccountSnapshot> {
        FaucetQueryClient::account_snapshot(self, address).await
    }

    async fn token_decimals(&self) -> Result<u8> {
        Ok(self.token_info().await?.decimals)
    }
}

/// A connected wallet able to claim
#[async_trait]
pub trait FaucetSigner: Send + Sync {
    fn address(&self) -> String;

    /// Submit `request_tokens` and wait until it is in a block
    async fn request_tokens(&self, faucet: &str) -> Result<TxResult>;
}

#[async_trait]
impl FaucetSigner for TerraClient {
    fn address(&self) -> String {
        self.address.to_string()
    }

    async fn request_tokens(&self, faucet: &str) -> Result<TxResult> {
        self.execute_contract(faucet, &ExecuteMsg::RequestTokens {})
            .await
    }
}

/// Turns a mnemonic into a connected wallet
pub trait WalletConnector: Send + Sync {
    fn connect(&self, mnemonic: &str) -> Result<Arc<dyn FaucetSigner>>;
}

/// Connects wallets as LCD signing clients
#[derive(Debug, Clone)]
pub struct TerraConnector {
    pub lcd_url: String,
    pub chain_id: String,
    pub gas: GasConfig,
}

impl WalletConnector for TerraConnector {
    fn connect(&self, mnemonic: &str) -> Result<Arc<dyn FaucetSigner>> {
        let client = TerraClient::new(&self.lcd_url, &self.chain_id, mnemonic, self.gas.clone())?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_terra_connector() {
        let connector = TerraConnector {
            lcd_url: "http://localhost:1317".to_string(),
            chain_id: "localterra".to_string(),
            gas: GasConfig::default(),
        };

        let wallet = connector.connect(TEST_MNEMONIC).unwrap();
        assert_eq!(
            wallet.address(),
            faucet_client::address_from_mnemonic(TEST_MNEMONIC)
                .unwrap()
                .to_string()
        );
        assert!(connector.connect("not a mnemonic").is_err());
    }
}

//! Deployment artifact shared by the deployer and the dashboard.
//!
//! A small JSON file naming the deployed contract addresses and the network
//! they live on.

use std::fs;
use std::path::Path;

use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentArtifact {
    /// FCT token contract address
    pub token: String,
    /// Faucet contract address
    pub faucet: String,
    /// Network name (chain id or a human label like "localterra")
    pub network: String,
}

impl DeploymentArtifact {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read deployment artifact {}", path.display()))?;
        serde_json::from_str(&content)
            .wrap_err_with(|| format!("Malformed deployment artifact {}", path.display()))
    }

    /// Write as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .wrap_err_with(|| format!("Failed to write deployment artifact {}", path.display()))
    }
}

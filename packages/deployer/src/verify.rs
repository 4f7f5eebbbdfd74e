//! Post-deployment verification
//!
//! Best effort: every check runs, failures are logged and reported, nothing
//! here aborts the deployment.

use std::path::Path;

use eyre::{eyre, Result};
use faucet_client::FaucetQueryClient;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

/// Outcome of one verification check
#[derive(Debug, Clone)]
pub struct Check {
    pub name: String,
    pub result: std::result::Result<(), String>,
}

impl Check {
    fn new(name: impl Into<String>, result: Result<()>) -> Self {
        let name = name.into();
        let result = result.map_err(|e| format!("{:#}", e));
        match &result {
            Ok(()) => info!(check = %name, "Verified"),
            Err(e) => warn!(check = %name, error = %e, "Verification failed"),
        }
        Self { name, result }
    }

    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub checks: Vec<Check>,
}

impl VerifyReport {
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(Check::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|c| !c.passed())
    }
}

/// SHA-256 of a wasm blob, as stored in the wasm module's `data_hash`
pub fn code_hash(wasm: &[u8]) -> Vec<u8> {
    Sha256::digest(wasm).to_vec()
}

fn compare_hash(local: &[u8], on_chain: &[u8]) -> Result<()> {
    if local != on_chain {
        return Err(eyre!(
            "code hash mismatch: local {} on-chain {}",
            hex::encode(local),
            hex::encode(on_chain)
        ));
    }
    Ok(())
}

async fn verify_code(queries: &FaucetQueryClient, contract: &str, wasm_path: &Path) -> Result<()> {
    let wasm = std::fs::read(wasm_path)
        .map_err(|e| eyre!("Failed to read {}: {}", wasm_path.display(), e))?;
    let info = queries.contract_info(contract).await?;
    let code = queries.code_info(info.code_id).await?;
    compare_hash(&code_hash(&wasm), &code.data_hash)
}

async fn verify_faucet_token(queries: &FaucetQueryClient) -> Result<()> {
    let config = queries.config().await?;
    if config.token != queries.token_address() {
        return Err(eyre!(
            "faucet points at {}, expected {}",
            config.token,
            queries.token_address()
        ));
    }
    Ok(())
}

async fn verify_minter(queries: &FaucetQueryClient) -> Result<()> {
    match queries.token_minter().await? {
        Some(m) if m.minter == queries.faucet_address() => Ok(()),
        Some(m) => Err(eyre!(
            "token minter is {}, expected {}",
            m.minter,
            queries.faucet_address()
        )),
        None => Err(eyre!("token has no minter")),
    }
}

/// Check the deployed code against the local wasm and the contract wiring
pub async fn verify(
    queries: &FaucetQueryClient,
    token_wasm: &Path,
    faucet_wasm: &Path,
) -> VerifyReport {
    info!(
        token = %queries.token_address(),
        faucet = %queries.faucet_address(),
        "Verifying deployment..."
    );

    let checks = vec![
        Check::new(
            "token code hash",
            verify_code(queries, queries.token_address(), token_wasm).await,
        ),
        Check::new(
            "faucet code hash",
            verify_code(queries, queries.faucet_address(), faucet_wasm).await,
        ),
        Check::new("faucet token", verify_faucet_token(queries).await),
        Check::new("token minter", verify_minter(queries).await),
    ];

    VerifyReport { checks }
}

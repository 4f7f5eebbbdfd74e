//! Contract deployment sequence
//!
//! Token first, then the faucet pointing at it, then the minter role handover.
//! Not idempotent: every run stores and instantiates fresh contracts.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cw20::Cw20ExecuteMsg;
use eyre::{Result, WrapErr};
use faucet_client::{faucet_msg, token_msg, DeploymentArtifact, TerraClient, TxResult};
use tracing::info;

pub const TOKEN_LABEL: &str = "fct-token";
pub const FAUCET_LABEL: &str = "fct-faucet";

/// The chain operations the deployment needs
#[async_trait]
pub trait DeployTarget: Send + Sync {
    /// Address that signs every deployment transaction
    fn deployer_address(&self) -> String;

    /// Upload wasm, returning the code id
    async fn store_code(&self, wasm: Vec<u8>) -> Result<u64>;

    /// Instantiate with the deployer as admin, returning the contract address
    async fn instantiate(&self, code_id: u64, msg: serde_json::Value, label: &str)
        -> Result<String>;

    /// Execute a message and wait for it to be included
    async fn execute(&self, contract: &str, msg: serde_json::Value) -> Result<TxResult>;
}

#[async_trait]
impl DeployTarget for TerraClient {
    fn deployer_address(&self) -> String {
        self.address.to_string()
    }

    async fn store_code(&self, wasm: Vec<u8>) -> Result<u64> {
        TerraClient::store_code(self, wasm).await
    }

    async fn instantiate(
        &self,
        code_id: u64,
        msg: serde_json::Value,
        label: &str,
    ) -> Result<String> {
        self.instantiate_contract(code_id, &msg, label, Some(&self.address))
            .await
    }

    async fn execute(&self, contract: &str, msg: serde_json::Value) -> Result<TxResult> {
        self.execute_contract(contract, &msg).await
    }
}

/// Inputs of one deployment
#[derive(Debug, Clone)]
pub struct DeployPlan {
    pub token_wasm: PathBuf,
    pub faucet_wasm: PathBuf,
    /// Network label written to the artifact
    pub network: String,
    /// Where the artifact JSON goes
    pub output: PathBuf,
}

/// Outcome of a deployment
#[derive(Debug, Clone)]
pub struct DeployResult {
    pub token_code_id: u64,
    pub faucet_code_id: u64,
    pub artifact: DeploymentArtifact,
}

fn read_wasm(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).wrap_err_with(|| format!("Failed to read wasm {}", path.display()))
}

/// Run the deployment and write the artifact
pub async fn deploy<T: DeployTarget>(target: &T, plan: &DeployPlan) -> Result<DeployResult> {
    // Read both up front so a bad path fails before anything is on chain
    let token_wasm = read_wasm(&plan.token_wasm)?;
    let faucet_wasm = read_wasm(&plan.faucet_wasm)?;
    let deployer = target.deployer_address();

    info!(deployer = %deployer, network = %plan.network, "Deploying contracts...");

    let token_code_id = target
        .store_code(token_wasm)
        .await
        .wrap_err("Failed to store token code")?;
    let token = target
        .instantiate(
            token_code_id,
            serde_json::to_value(token_msg::InstantiateMsg {
                minter: Some(deployer.clone()),
                initial_balances: vec![],
            })?,
            TOKEN_LABEL,
        )
        .await
        .wrap_err("Failed to instantiate token")?;
    info!(token = %token, code_id = token_code_id, "Token deployed");

    let faucet_code_id = target
        .store_code(faucet_wasm)
        .await
        .wrap_err("Failed to store faucet code")?;
    let faucet = target
        .instantiate(
            faucet_code_id,
            serde_json::to_value(faucet_msg::InstantiateMsg {
                token: token.clone(),
                owner: None,
            })?,
            FAUCET_LABEL,
        )
        .await
        .wrap_err("Failed to instantiate faucet")?;
    info!(faucet = %faucet, code_id = faucet_code_id, "Faucet deployed");

    let tx = target
        .execute(
            &token,
            serde_json::to_value(Cw20ExecuteMsg::UpdateMinter {
                new_minter: Some(faucet.clone()),
            })?,
        )
        .await
        .wrap_err("Failed to grant minter role to faucet")?;
    info!(txhash = %tx.txhash, "Minter role granted to faucet");

    let artifact = DeploymentArtifact {
        token,
        faucet,
        network: plan.network.clone(),
    };
    artifact.save(&plan.output)?;
    info!(path = %plan.output.display(), "Addresses saved");

    Ok(DeployResult {
        token_code_id,
        faucet_code_id,
        artifact,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use faucet_client::events::{TxEvent, TxEventAttribute};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub(crate) enum Call {
        Store(Vec<u8>),
        Instantiate(u64, serde_json::Value, String),
        Execute(String, serde_json::Value),
    }

    #[derive(Default)]
    pub(crate) struct RecordingTarget {
        pub(crate) calls: Mutex<Vec<Call>>,
        pub(crate) fail_execute: bool,
        /// Execute succeeds without emitting any wasm event
        pub(crate) silent_execute: bool,
    }

    fn attr(key: &str, value: &str) -> TxEventAttribute {
        TxEventAttribute {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// Wasm attributes the real contracts emit for `msg`
    fn emitted(contract: &str, msg: &serde_json::Value) -> Vec<TxEventAttribute> {
        let mut attrs = vec![attr("_contract_address", contract)];
        if let Some(paused) = msg.pointer("/set_paused/paused").and_then(|v| v.as_bool()) {
            attrs.push(attr("action", "faucet_paused"));
            attrs.push(attr("paused", &paused.to_string()));
        } else if msg.get("update_minter").is_some() {
            attrs.push(attr("action", "update_minter"));
        }
        attrs
    }

    #[async_trait]
    impl DeployTarget for RecordingTarget {
        fn deployer_address(&self) -> String {
            "terra1deployer".to_string()
        }

        async fn store_code(&self, wasm: Vec<u8>) -> Result<u64> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call::Store(wasm));
            Ok(calls.len() as u64)
        }

        async fn instantiate(
            &self,
            code_id: u64,
            msg: serde_json::Value,
            label: &str,
        ) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Instantiate(code_id, msg, label.to_string()));
            Ok(format!("terra1{}", label.replace('-', "")))
        }

        async fn execute(&self, contract: &str, msg: serde_json::Value) -> Result<TxResult> {
            if self.fail_execute {
                eyre::bail!("out of gas");
            }
            let events = if self.silent_execute {
                vec![]
            } else {
                vec![TxEvent {
                    event_type: "wasm".to_string(),
                    attributes: emitted(contract, &msg),
                }]
            };
            self.calls
                .lock()
                .unwrap()
                .push(Call::Execute(contract.to_string(), msg));
            Ok(TxResult {
                txhash: "TXHASH".to_string(),
                height: 1,
                events,
            })
        }
    }

    fn plan(dir: &Path) -> DeployPlan {
        let token_wasm = dir.join("faucet_token.wasm");
        let faucet_wasm = dir.join("faucet.wasm");
        std::fs::write(&token_wasm, b"token-wasm").unwrap();
        std::fs::write(&faucet_wasm, b"faucet-wasm").unwrap();

        DeployPlan {
            token_wasm,
            faucet_wasm,
            network: "localterra".to_string(),
            output: dir.join("out").join("addresses.json"),
        }
    }

    #[tokio::test]
    async fn test_deploy_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(dir.path());
        let target = RecordingTarget::default();

        let result = deploy(&target, &plan).await.unwrap();

        let calls = target.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![
                Call::Store(b"token-wasm".to_vec()),
                Call::Instantiate(
                    1,
                    serde_json::json!({ "minter": "terra1deployer", "initial_balances": [] }),
                    TOKEN_LABEL.to_string()
                ),
                Call::Store(b"faucet-wasm".to_vec()),
                Call::Instantiate(
                    3,
                    serde_json::json!({ "token": "terra1fcttoken", "owner": null }),
                    FAUCET_LABEL.to_string()
                ),
                Call::Execute(
                    "terra1fcttoken".to_string(),
                    serde_json::json!({ "update_minter": { "new_minter": "terra1fctfaucet" } })
                ),
            ]
        );

        assert_eq!(result.token_code_id, 1);
        assert_eq!(result.faucet_code_id, 3);
        assert_eq!(
            DeploymentArtifact::load(&plan.output).unwrap(),
            DeploymentArtifact {
                token: "terra1fcttoken".to_string(),
                faucet: "terra1fctfaucet".to_string(),
                network: "localterra".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_missing_wasm_fails_before_any_tx() {
        let dir = tempfile::tempdir().unwrap();
        let mut plan = plan(dir.path());
        plan.faucet_wasm = dir.path().join("missing.wasm");
        let target = RecordingTarget::default();

        let err = deploy(&target, &plan).await.unwrap_err();
        assert!(err.to_string().contains("Failed to read wasm"));
        assert!(target.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_minter_grant_writes_no_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let plan = plan(dir.path());
        let target = RecordingTarget {
            fail_execute: true,
            ..Default::default()
        };

        let err = deploy(&target, &plan).await.unwrap_err();
        assert!(err.to_string().contains("minter role"));
        assert!(!plan.output.exists());
    }
}

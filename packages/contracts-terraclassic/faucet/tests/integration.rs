//! Integration tests for the FCT faucet using cw-multi-test.
//!
//! The token side is the real FCT contract (cw20-base underneath), so minting
//! goes through the same minter check it does on chain.

use cosmwasm_std::{Addr, Uint128};
use cw20::{BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg};
use cw_multi_test::{App, AppResponse, ContractWrapper, Executor};

use faucet::msg::{
    CanClaimResponse, ClaimStatusResponse, ConfigResponse, ExecuteMsg, InstantiateMsg,
    LastClaimAtResponse, PausedResponse, QueryMsg, RemainingAllowanceResponse,
    TotalClaimedResponse,
};

const DAY: u64 = 86_400;
const TOKEN: u128 = 1_000_000_000_000_000_000; // 10^18

// ============================================================================
// Test Setup
// ============================================================================

fn contract_faucet() -> Box<dyn cw_multi_test::Contract<cosmwasm_std::Empty>> {
    let contract = ContractWrapper::new(
        faucet::contract::execute,
        faucet::contract::instantiate,
        faucet::contract::query,
    );
    Box::new(contract)
}

fn contract_token() -> Box<dyn cw_multi_test::Contract<cosmwasm_std::Empty>> {
    let contract = ContractWrapper::new(
        faucet_token::contract::execute,
        faucet_token::contract::instantiate,
        faucet_token::contract::query,
    );
    Box::new(contract)
}

struct TestEnv {
    app: App,
    owner: Addr,
    user: Addr,
    token: Addr,
    faucet: Addr,
}

impl TestEnv {
    fn claim(&mut self, sender: &Addr) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            sender.clone(),
            self.faucet.clone(),
            &ExecuteMsg::RequestTokens {},
            &[],
        )
    }

    fn set_paused(&mut self, sender: &Addr, paused: bool) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            sender.clone(),
            self.faucet.clone(),
            &ExecuteMsg::SetPaused { paused },
            &[],
        )
    }

    fn advance(&mut self, seconds: u64) {
        self.app.update_block(|block| {
            block.time = block.time.plus_seconds(seconds);
            block.height += 1;
        });
    }

    fn balance(&self, addr: &Addr) -> Uint128 {
        let res: BalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.token,
                &Cw20QueryMsg::Balance {
                    address: addr.to_string(),
                },
            )
            .unwrap();
        res.balance
    }

    fn status(&self, addr: &Addr) -> ClaimStatusResponse {
        self.app
            .wrap()
            .query_wasm_smart(
                &self.faucet,
                &QueryMsg::ClaimStatus {
                    address: addr.to_string(),
                },
            )
            .unwrap()
    }

    fn total_claimed(&self, addr: &Addr) -> Uint128 {
        let res: TotalClaimedResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.faucet,
                &QueryMsg::TotalClaimed {
                    address: addr.to_string(),
                },
            )
            .unwrap();
        res.total_claimed
    }

    fn remaining_allowance(&self, addr: &Addr) -> Uint128 {
        let res: RemainingAllowanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.faucet,
                &QueryMsg::RemainingAllowance {
                    address: addr.to_string(),
                },
            )
            .unwrap();
        res.remaining_allowance
    }

    fn can_claim(&self, addr: &Addr) -> bool {
        let res: CanClaimResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                &self.faucet,
                &QueryMsg::CanClaim {
                    address: addr.to_string(),
                },
            )
            .unwrap();
        res.can_claim
    }
}

/// Deploys token and faucet. The minter role is only handed over when
/// `grant_minter` is set, mirroring the deploy sequence.
fn setup_with(grant_minter: bool) -> TestEnv {
    let mut app = App::default();
    let owner = Addr::unchecked("terra1owner");
    let user = Addr::unchecked("terra1user");

    let token_code = app.store_code(contract_token());
    let token = app
        .instantiate_contract(
            token_code,
            owner.clone(),
            &faucet_token::msg::InstantiateMsg {
                minter: Some(owner.to_string()),
                initial_balances: vec![],
            },
            &[],
            "fct-token",
            Some(owner.to_string()),
        )
        .unwrap();

    let faucet_code = app.store_code(contract_faucet());
    let faucet = app
        .instantiate_contract(
            faucet_code,
            owner.clone(),
            &InstantiateMsg {
                token: token.to_string(),
                owner: None,
            },
            &[],
            "fct-faucet",
            Some(owner.to_string()),
        )
        .unwrap();

    if grant_minter {
        app.execute_contract(
            owner.clone(),
            token.clone(),
            &Cw20ExecuteMsg::UpdateMinter {
                new_minter: Some(faucet.to_string()),
            },
            &[],
        )
        .unwrap();
    }

    TestEnv {
        app,
        owner,
        user,
        token,
        faucet,
    }
}

fn setup() -> TestEnv {
    setup_with(true)
}

fn attr<'a>(res: &'a AppResponse, key: &str) -> Option<&'a str> {
    res.events
        .iter()
        .filter(|e| e.ty == "wasm")
        .flat_map(|e| e.attributes.iter())
        .find(|a| a.key == key)
        .map(|a| a.value.as_str())
}

// ============================================================================
// Deployment
// ============================================================================

#[test]
fn test_config_scales_with_token_decimals() {
    let env = setup();
    let config: ConfigResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.faucet, &QueryMsg::Config {})
        .unwrap();

    assert_eq!(config.token, env.token.to_string());
    assert_eq!(config.owner, env.owner.to_string());
    assert_eq!(config.claim_amount, Uint128::from(100 * TOKEN));
    assert_eq!(config.lifetime_cap, Uint128::from(1000 * TOKEN));
    assert_eq!(config.cooldown_seconds, DAY);
}

#[test]
fn test_fresh_account_status() {
    let env = setup();
    let status = env.status(&env.user);

    assert!(status.can_claim);
    assert_eq!(status.next_claim_at, 0);
    assert_eq!(status.remaining_allowance, Uint128::from(1000 * TOKEN));

    let last: LastClaimAtResponse = env
        .app
        .wrap()
        .query_wasm_smart(
            &env.faucet,
            &QueryMsg::LastClaimAt {
                address: env.user.to_string(),
            },
        )
        .unwrap();
    assert_eq!(last.last_claim_at, 0);
    assert_eq!(env.total_claimed(&env.user), Uint128::zero());
}

// ============================================================================
// Claiming
// ============================================================================

#[test]
fn test_fresh_account_can_claim_immediately() {
    let mut env = setup();
    let user = env.user.clone();

    let res = env.claim(&user).unwrap();
    let now = env.app.block_info().time.seconds();

    assert_eq!(attr(&res, "action"), Some("tokens_claimed"));
    assert_eq!(attr(&res, "user"), Some(user.as_str()));
    assert_eq!(attr(&res, "amount"), Some((100 * TOKEN).to_string().as_str()));
    assert_eq!(attr(&res, "timestamp"), Some(now.to_string().as_str()));

    assert_eq!(env.balance(&user), Uint128::from(100 * TOKEN));
    assert_eq!(env.total_claimed(&user), Uint128::from(100 * TOKEN));

    let status = env.status(&user);
    assert!(!status.can_claim);
    assert_eq!(status.next_claim_at, now + DAY);
    assert_eq!(status.remaining_allowance, Uint128::from(900 * TOKEN));
}

#[test]
fn test_cooldown_enforced() {
    let mut env = setup();
    let user = env.user.clone();
    env.claim(&user).unwrap();

    let err_str = env.claim(&user).unwrap_err().root_cause().to_string();
    assert!(
        err_str.contains("Cannot claim tokens"),
        "Expected cooldown error, got: {}",
        err_str
    );

    env.advance(23 * 3600);
    assert!(!env.can_claim(&user));
    assert!(env.claim(&user).is_err());

    // 24h + 1s after the first claim
    env.advance(3600 + 1);
    assert!(env.can_claim(&user));
    env.claim(&user).unwrap();
    assert_eq!(env.total_claimed(&user), Uint128::from(200 * TOKEN));
}

#[test]
fn test_claim_allowed_exactly_at_cooldown_boundary() {
    let mut env = setup();
    let user = env.user.clone();
    env.claim(&user).unwrap();

    env.advance(DAY - 1);
    assert!(env.claim(&user).is_err());

    env.advance(1);
    env.claim(&user).unwrap();
}

#[test]
fn test_lifetime_limit() {
    let mut env = setup();
    let user = env.user.clone();

    for _ in 0..10 {
        env.claim(&user).unwrap();
        env.advance(DAY);
    }
    assert_eq!(env.total_claimed(&user), Uint128::from(1000 * TOKEN));
    assert_eq!(env.remaining_allowance(&user), Uint128::zero());
    assert!(!env.can_claim(&user));

    let err_str = env.claim(&user).unwrap_err().root_cause().to_string();
    assert!(
        err_str.contains("Lifetime limit reached"),
        "Expected lifetime limit error, got: {}",
        err_str
    );

    // Waiting does not help
    env.advance(30 * DAY);
    let err_str = env.claim(&user).unwrap_err().root_cause().to_string();
    assert!(err_str.contains("Lifetime limit reached"));
    assert_eq!(env.balance(&user), Uint128::from(1000 * TOKEN));
}

#[test]
fn test_remaining_allowance_tracks_total_claimed() {
    let mut env = setup();
    let user = env.user.clone();
    let cap = Uint128::from(1000 * TOKEN);

    assert_eq!(env.remaining_allowance(&user), cap);
    for _ in 0..4 {
        env.claim(&user).unwrap();
        assert_eq!(
            env.remaining_allowance(&user),
            cap - env.total_claimed(&user)
        );
        env.advance(DAY);
    }
}

#[test]
fn test_accounts_are_independent() {
    let mut env = setup();
    let user = env.user.clone();
    let other = Addr::unchecked("terra1other");

    env.claim(&user).unwrap();
    env.claim(&other).unwrap();

    assert_eq!(env.balance(&user), Uint128::from(100 * TOKEN));
    assert_eq!(env.balance(&other), Uint128::from(100 * TOKEN));
}

#[test]
fn test_claim_fails_without_minter_role() {
    let mut env = setup_with(false);
    let user = env.user.clone();

    assert!(env.claim(&user).is_err());
    // Nothing recorded when the mint is rejected
    assert_eq!(env.total_claimed(&user), Uint128::zero());
    assert!(env.status(&user).can_claim);
}

// ============================================================================
// Pause
// ============================================================================

#[test]
fn test_owner_can_pause_and_unpause() {
    let mut env = setup();
    let owner = env.owner.clone();
    let user = env.user.clone();

    let res = env.set_paused(&owner, true).unwrap();
    assert_eq!(attr(&res, "action"), Some("faucet_paused"));
    assert_eq!(attr(&res, "paused"), Some("true"));

    let paused: PausedResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.faucet, &QueryMsg::Paused {})
        .unwrap();
    assert!(paused.paused);
    assert!(!env.can_claim(&user));

    let err_str = env.claim(&user).unwrap_err().root_cause().to_string();
    assert!(
        err_str.contains("paused"),
        "Expected paused error, got: {}",
        err_str
    );

    let res = env.set_paused(&owner, false).unwrap();
    assert_eq!(attr(&res, "paused"), Some("false"));
    assert!(env.can_claim(&user));
    env.claim(&user).unwrap();
}

#[test]
fn test_pause_blocks_even_eligible_accounts_after_cooldown() {
    let mut env = setup();
    let owner = env.owner.clone();
    let user = env.user.clone();

    env.claim(&user).unwrap();
    env.set_paused(&owner, true).unwrap();
    env.advance(2 * DAY);

    assert!(env.claim(&user).is_err());
    let status = env.status(&user);
    assert!(!status.can_claim);
    assert_eq!(status.remaining_allowance, Uint128::from(900 * TOKEN));
}

#[test]
fn test_non_owner_cannot_pause() {
    let mut env = setup();
    let user = env.user.clone();

    let err_str = env.set_paused(&user, true).unwrap_err().root_cause().to_string();
    assert!(
        err_str.contains("Unauthorized"),
        "Expected unauthorized error, got: {}",
        err_str
    );
}

#[test]
fn test_explicit_owner() {
    let mut app = App::default();
    let deployer = Addr::unchecked("terra1deployer");
    let owner = Addr::unchecked("terra1owner");

    let token_code = app.store_code(contract_token());
    let token = app
        .instantiate_contract(
            token_code,
            deployer.clone(),
            &faucet_token::msg::InstantiateMsg {
                minter: Some(deployer.to_string()),
                initial_balances: vec![],
            },
            &[],
            "fct-token",
            None,
        )
        .unwrap();

    let faucet_code = app.store_code(contract_faucet());
    let faucet = app
        .instantiate_contract(
            faucet_code,
            deployer.clone(),
            &InstantiateMsg {
                token: token.to_string(),
                owner: Some(owner.to_string()),
            },
            &[],
            "fct-faucet",
            None,
        )
        .unwrap();

    assert!(app
        .execute_contract(
            deployer,
            faucet.clone(),
            &ExecuteMsg::SetPaused { paused: true },
            &[]
        )
        .is_err());
    app.execute_contract(owner, faucet, &ExecuteMsg::SetPaused { paused: true }, &[])
        .unwrap();
}

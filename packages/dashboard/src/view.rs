//! Page rendering and display formatting

use std::fmt::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use cosmwasm_std::Uint128;
use faucet_client::token_msg::TOKEN_SYMBOL;
use faucet_client::{AccountSnapshot, DeploymentArtifact};

pub fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// `"Ready"` once `next_claim_at` has passed (or is 0), else `"{h}h {m}m"`.
pub fn format_time_remaining(next_claim_at: u64, now: u64) -> String {
    if next_claim_at == 0 || next_claim_at <= now {
        return "Ready".to_string();
    }

    let remaining = next_claim_at - now;
    format!("{}h {}m", remaining / 3600, (remaining % 3600) / 60)
}

/// Whole tokens, fractions dropped
pub fn format_balance(amount: Uint128, decimals: u8) -> String {
    10u128
        .checked_pow(decimals as u32)
        .map(|unit| amount.u128() / unit)
        .unwrap_or(0)
        .to_string()
}

pub fn claim_enabled(snapshot: &AccountSnapshot, claim_in_flight: bool) -> bool {
    !snapshot.paused && snapshot.can_claim && !claim_in_flight
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Everything needed to render the page
#[derive(Debug, Clone)]
pub struct PageModel<'a> {
    pub contracts: &'a DeploymentArtifact,
    pub wallet: Option<&'a str>,
    pub snapshot: Option<&'a AccountSnapshot>,
    pub decimals: u8,
    pub claim_in_flight: bool,
    pub message: Option<&'a str>,
    pub last_error: Option<&'a str>,
    pub refresh_secs: u64,
    pub now: u64,
}

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem}\
.warning{background:#fff3cd;border:1px solid #e0a800;padding:.75rem}\
.error{color:#b00020}.message{background:#eef;padding:.75rem}\
dl{display:grid;grid-template-columns:max-content auto;gap:.25rem 1rem}\
button{padding:.5rem 1.5rem;font-size:1rem}";

pub fn render_page(page: &PageModel<'_>) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\">\
         <meta http-equiv=\"refresh\" content=\"{}\">\
         <title>{} Faucet</title><style>{}</style></head><body>\
         <h1>{} Faucet</h1><p>Network: {}</p>",
        page.refresh_secs,
        TOKEN_SYMBOL,
        STYLE,
        TOKEN_SYMBOL,
        escape(&page.contracts.network),
    );

    if let Some(message) = page.message {
        let _ = write!(html, "<p class=\"message\">{}</p>", escape(message));
    }

    match page.wallet {
        None => render_connect(&mut html),
        Some(address) => render_account(&mut html, page, address),
    }

    let _ = write!(
        html,
        "<footer><small>Faucet {} &middot; Token {}</small></footer></body></html>",
        escape(&page.contracts.faucet),
        escape(&page.contracts.token),
    );
    html
}

fn render_connect(html: &mut String) {
    let _ = write!(
        html,
        "<section id=\"connect\"><p>Connect a wallet to claim {}.</p>\
         <form method=\"post\" action=\"/connect\">\
         <textarea name=\"mnemonic\" rows=\"3\" cols=\"60\" placeholder=\"Wallet mnemonic\"></textarea>\
         <p><button type=\"submit\">Connect Wallet</button></p></form></section>",
        TOKEN_SYMBOL
    );
}

fn render_account(html: &mut String, page: &PageModel<'_>, address: &str) {
    let _ = write!(
        html,
        "<section id=\"account\"><dl><dt>Address</dt><dd>{}</dd>",
        escape(address)
    );

    let Some(snapshot) = page.snapshot else {
        html.push_str("</dl><p>Loading account...</p>");
        render_error(html, page.last_error);
        html.push_str("</section>");
        return;
    };

    let _ = write!(
        html,
        "<dt>Balance</dt><dd>{} {}</dd>",
        format_balance(snapshot.balance, page.decimals),
        TOKEN_SYMBOL
    );

    if snapshot.paused {
        html.push_str("</dl><p class=\"warning\">The faucet is paused. Claims are disabled until it is resumed.</p>");
    } else {
        let _ = write!(
            html,
            "<dt>Next claim</dt><dd>{}</dd>\
             <dt>Claimed</dt><dd>{} {sym}</dd>\
             <dt>Remaining</dt><dd>{} {sym}</dd></dl>",
            format_time_remaining(snapshot.next_claim_at, page.now),
            format_balance(snapshot.total_claimed, page.decimals),
            format_balance(snapshot.remaining_allowance, page.decimals),
            sym = TOKEN_SYMBOL,
        );
    }

    let disabled = if claim_enabled(snapshot, page.claim_in_flight) {
        ""
    } else {
        " disabled"
    };
    let label = if page.claim_in_flight {
        "Claiming..."
    } else {
        "Claim Tokens"
    };
    let _ = write!(
        html,
        "<form method=\"post\" action=\"/claim\"><button type=\"submit\"{}>{}</button></form>",
        disabled, label
    );

    render_error(html, page.last_error);
    html.push_str("</section>");
}

fn render_error(html: &mut String, error: Option<&str>) {
    if let Some(error) = error {
        let _ = write!(
            html,
            "<p class=\"error\">Could not refresh: {}</p>",
            escape(error)
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const E18: u128 = 1_000_000_000_000_000_000;

    fn contracts() -> DeploymentArtifact {
        DeploymentArtifact {
            token: "terra1token".to_string(),
            faucet: "terra1faucet".to_string(),
            network: "localterra".to_string(),
        }
    }

    fn snapshot() -> AccountSnapshot {
        AccountSnapshot {
            address: "terra1user".to_string(),
            balance: Uint128::new(300 * E18 + 5),
            paused: false,
            can_claim: true,
            next_claim_at: 0,
            last_claim_at: 0,
            remaining_allowance: Uint128::new(700 * E18),
            total_claimed: Uint128::new(300 * E18),
        }
    }

    fn page<'a>(
        contracts: &'a DeploymentArtifact,
        snapshot: Option<&'a AccountSnapshot>,
    ) -> PageModel<'a> {
        PageModel {
            contracts,
            wallet: Some("terra1user"),
            snapshot,
            decimals: 18,
            claim_in_flight: false,
            message: None,
            last_error: None,
            refresh_secs: 30,
            now: 1_700_000_000,
        }
    }

    #[test]
    fn test_format_time_remaining() {
        let now = 1_700_000_000;
        assert_eq!(format_time_remaining(0, now), "Ready");
        assert_eq!(format_time_remaining(now, now), "Ready");
        assert_eq!(format_time_remaining(now - 10, now), "Ready");
        assert_eq!(format_time_remaining(now + 59, now), "0h 0m");
        assert_eq!(format_time_remaining(now + 3_600 + 120, now), "1h 2m");
        assert_eq!(format_time_remaining(now + 86_400, now), "24h 0m");
    }

    #[test]
    fn test_format_balance() {
        assert_eq!(format_balance(Uint128::zero(), 18), "0");
        assert_eq!(format_balance(Uint128::new(100 * E18), 18), "100");
        assert_eq!(format_balance(Uint128::new(E18 - 1), 18), "0");
        assert_eq!(format_balance(Uint128::new(42), 0), "42");
    }

    #[test]
    fn test_claim_enabled() {
        let mut s = snapshot();
        assert!(claim_enabled(&s, false));
        assert!(!claim_enabled(&s, true));

        s.can_claim = false;
        assert!(!claim_enabled(&s, false));

        s.can_claim = true;
        s.paused = true;
        assert!(!claim_enabled(&s, false));
    }

    #[test]
    fn test_render_connect_prompt() {
        let contracts = contracts();
        let mut model = page(&contracts, None);
        model.wallet = None;

        let html = render_page(&model);
        assert!(html.contains("Connect Wallet"));
        assert!(html.contains("action=\"/connect\""));
        assert!(!html.contains("action=\"/claim\""));
    }

    #[test]
    fn test_render_account() {
        let contracts = contracts();
        let s = snapshot();
        let html = render_page(&page(&contracts, Some(&s)));

        assert!(html.contains("terra1user"));
        assert!(html.contains("<dd>300 FCT</dd>"));
        assert!(html.contains("<dd>Ready</dd>"));
        assert!(html.contains("<dd>700 FCT</dd>"));
        assert!(html.contains("<button type=\"submit\">Claim Tokens</button>"));
        assert!(!html.contains("warning"));
    }

    #[test]
    fn test_render_paused_and_in_flight() {
        let contracts = contracts();
        let mut s = snapshot();
        s.paused = true;
        let html = render_page(&page(&contracts, Some(&s)));
        assert!(html.contains("The faucet is paused"));
        assert!(!html.contains("Next claim"));
        assert!(html.contains(" disabled>Claim Tokens"));

        let s = snapshot();
        let mut model = page(&contracts, Some(&s));
        model.claim_in_flight = true;
        assert!(render_page(&model).contains(" disabled>Claiming..."));
    }

    #[test]
    fn test_render_escapes_messages() {
        let contracts = contracts();
        let mut model = page(&contracts, None);
        model.message = Some("Claim failed: <script>");
        model.last_error = Some("a & b");

        let html = render_page(&model);
        assert!(html.contains("Claim failed: &lt;script&gt;"));
        assert!(html.contains("Loading account..."));
        assert!(html.contains("Could not refresh: a &amp; b"));
    }
}

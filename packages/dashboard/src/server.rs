//! HTTP server: dashboard page, JSON API, health and metrics
//!
//! State-changing requests (`POST`) from another origin are refused: the
//! `Origin` header, when present, must match `Host`, and a browser-declared
//! `Sec-Fetch-Site: cross-site` is rejected.

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    extract::{Path, Request, State},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use cosmwasm_std::Uint128;
use eyre::eyre;
use faucet_client::{AccountSnapshot, DeploymentArtifact};
use prometheus::{Encoder, TextEncoder};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::claim::ClaimError;
use crate::state::SharedDashboard;
use crate::view::{claim_enabled, format_time_remaining, now_secs, render_page, PageModel};

#[derive(Deserialize)]
pub struct ConnectRequest {
    pub mnemonic: String,
}

#[derive(Serialize)]
pub struct ConnectResponse {
    pub address: String,
}

/// Connected wallet state
#[derive(Serialize)]
pub struct StatusResponse {
    pub connected: bool,
    pub address: Option<String>,
    pub snapshot: Option<AccountSnapshot>,
    pub time_remaining: Option<String>,
    pub claim_enabled: bool,
    pub claim_in_flight: bool,
    pub message: Option<String>,
    pub last_error: Option<String>,
    pub refreshed_at: Option<u64>,
}

/// Faucet view of an arbitrary address
#[derive(Serialize)]
pub struct AccountResponse {
    pub address: String,
    pub balance: Uint128,
    pub can_claim: bool,
    pub remaining_allowance: Uint128,
    pub next_claim_at: u64,
    pub paused: bool,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

async fn index(State(dashboard): State<SharedDashboard>) -> Html<String> {
    let wallet = dashboard.wallet_address().await;
    let view = dashboard.view().await;

    Html(render_page(&PageModel {
        contracts: dashboard.contracts(),
        wallet: wallet.as_deref(),
        snapshot: view.snapshot.as_ref(),
        decimals: dashboard.decimals(),
        claim_in_flight: dashboard.claim_in_flight(),
        message: view.message.as_deref(),
        last_error: view.last_error.as_deref(),
        refresh_secs: dashboard.poll_interval_secs(),
        now: now_secs(),
    }))
}

/// Liveness check
async fn health() -> &'static str {
    "OK"
}

async fn prometheus_metrics(State(dashboard): State<SharedDashboard>) -> Response {
    let encoder = TextEncoder::new();
    let metric_families = dashboard.metrics.registry.gather();
    let mut buffer = Vec::new();

    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response();
    }

    ([(header::CONTENT_TYPE, encoder.format_type().to_string())], buffer).into_response()
}

async fn addresses(State(dashboard): State<SharedDashboard>) -> Json<DeploymentArtifact> {
    Json(dashboard.contracts().clone())
}

async fn status(State(dashboard): State<SharedDashboard>) -> Json<StatusResponse> {
    let address = dashboard.wallet_address().await;
    let view = dashboard.view().await;
    let in_flight = dashboard.claim_in_flight();

    Json(StatusResponse {
        connected: address.is_some(),
        address,
        time_remaining: view
            .snapshot
            .as_ref()
            .map(|s| format_time_remaining(s.next_claim_at, now_secs())),
        claim_enabled: view
            .snapshot
            .as_ref()
            .is_some_and(|s| claim_enabled(s, in_flight)),
        claim_in_flight: in_flight,
        snapshot: view.snapshot,
        message: view.message,
        last_error: view.last_error,
        refreshed_at: view.refreshed_at,
    })
}

async fn account(
    State(dashboard): State<SharedDashboard>,
    Path(address): Path<String>,
) -> Response {
    match dashboard.lookup(&address).await {
        Ok(s) => Json(AccountResponse {
            address: s.address,
            balance: s.balance,
            can_claim: s.can_claim,
            remaining_allowance: s.remaining_allowance,
            next_claim_at: s.next_claim_at,
            paused: s.paused,
        })
        .into_response(),
        Err(e) => {
            warn!(address = %address, error = %e, "Account lookup failed");
            error_response(StatusCode::BAD_GATEWAY, format!("{:#}", e))
        }
    }
}

async fn api_connect(
    State(dashboard): State<SharedDashboard>,
    Json(req): Json<ConnectRequest>,
) -> Response {
    match dashboard.connect(req.mnemonic.trim()).await {
        Ok(address) => Json(ConnectResponse { address }).into_response(),
        Err(e) => error_response(StatusCode::BAD_REQUEST, format!("Connect failed: {}", e)),
    }
}

async fn form_connect(
    State(dashboard): State<SharedDashboard>,
    Form(req): Form<ConnectRequest>,
) -> Redirect {
    if let Err(e) = dashboard.connect(req.mnemonic.trim()).await {
        dashboard
            .set_message(format!("Connect failed: {}", e))
            .await;
    }
    Redirect::to("/")
}

fn claim_status_code(err: &ClaimError) -> StatusCode {
    match err {
        ClaimError::NotConnected => StatusCode::BAD_REQUEST,
        ClaimError::InFlight => StatusCode::CONFLICT,
        ClaimError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

async fn api_claim(State(dashboard): State<SharedDashboard>) -> Response {
    match dashboard.claim().await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => error_response(claim_status_code(&e), e.user_message()),
    }
}

/// The outcome lands in the view message; the page shows it after redirect
async fn form_claim(State(dashboard): State<SharedDashboard>) -> Redirect {
    let _ = dashboard.claim().await;
    Redirect::to("/")
}

fn is_cross_origin(headers: &HeaderMap) -> bool {
    let header = |name| headers.get(name).and_then(|v| v.to_str().ok());

    if header("sec-fetch-site") == Some("cross-site") {
        return true;
    }

    match header(header::ORIGIN.as_str()) {
        None => false,
        Some(origin) => {
            let Some(host) = header(header::HOST.as_str()) else {
                return true;
            };
            origin != format!("http://{}", host) && origin != format!("https://{}", host)
        }
    }
}

async fn reject_cross_origin(request: Request, next: Next) -> Response {
    let safe = matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS);
    if !safe && is_cross_origin(request.headers()) {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rejected cross-origin request"
        );
        return error_response(StatusCode::FORBIDDEN, "Cross-origin request rejected");
    }
    next.run(request).await
}

pub fn router(dashboard: SharedDashboard) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .route("/connect", post(form_connect))
        .route("/claim", post(form_claim))
        .route("/api/addresses", get(addresses))
        .route("/api/status", get(status))
        .route("/api/accounts/{address}", get(account))
        .route("/api/connect", post(api_connect))
        .route("/api/claim", post(api_claim))
        .layer(middleware::from_fn(reject_cross_origin))
        .with_state(dashboard)
}

/// Serve until `shutdown` resolves
pub async fn start_server(
    bind_address: &str,
    port: u16,
    dashboard: SharedDashboard,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> eyre::Result<()> {
    let addr: SocketAddr = format!("{}:{}", bind_address, port)
        .parse()
        .map_err(|e| eyre!("Invalid bind address {}:{}: {}", bind_address, port, e))?;
    info!("Dashboard listening on http://{}", addr);
    info!("  /        - Faucet dashboard");
    info!("  /health  - Liveness check");
    info!("  /metrics - Prometheus metrics");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(dashboard))
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}

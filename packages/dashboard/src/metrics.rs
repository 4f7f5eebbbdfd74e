//! Prometheus metrics

use prometheus::{IntCounter, IntGauge, Registry};

pub struct Metrics {
    pub polls_total: IntCounter,
    pub poll_errors_total: IntCounter,
    pub claims_submitted_total: IntCounter,
    pub claims_succeeded_total: IntCounter,
    pub claims_failed_total: IntCounter,
    pub claim_in_flight: IntGauge,
    pub wallet_connected: IntGauge,
    /// Unix time of the last successful refresh
    pub last_refresh_timestamp: IntGauge,
    pub registry: Registry,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

fn counter(registry: &Registry, name: &str, help: &str) -> IntCounter {
    let metric = IntCounter::new(name, help).expect("constant metric name is valid");
    registry
        .register(Box::new(metric.clone()))
        .expect("metric registration must not be called twice");
    metric
}

fn gauge(registry: &Registry, name: &str, help: &str) -> IntGauge {
    let metric = IntGauge::new(name, help).expect("constant metric name is valid");
    registry
        .register(Box::new(metric.clone()))
        .expect("metric registration must not be called twice");
    metric
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        Self {
            polls_total: counter(
                &registry,
                "dashboard_polls_total",
                "Total number of snapshot refreshes attempted",
            ),
            poll_errors_total: counter(
                &registry,
                "dashboard_poll_errors_total",
                "Total number of snapshot refreshes that failed",
            ),
            claims_submitted_total: counter(
                &registry,
                "dashboard_claims_submitted_total",
                "Total number of claim transactions submitted",
            ),
            claims_succeeded_total: counter(
                &registry,
                "dashboard_claims_succeeded_total",
                "Total number of claims confirmed on chain",
            ),
            claims_failed_total: counter(
                &registry,
                "dashboard_claims_failed_total",
                "Total number of claims rejected or failed",
            ),
            claim_in_flight: gauge(
                &registry,
                "dashboard_claim_in_flight",
                "1 while a claim is awaiting confirmation",
            ),
            wallet_connected: gauge(
                &registry,
                "dashboard_wallet_connected",
                "1 when a wallet is connected",
            ),
            last_refresh_timestamp: gauge(
                &registry,
                "dashboard_last_refresh_timestamp_seconds",
                "Unix time of the last successful snapshot refresh",
            ),
            registry,
        }
    }
}

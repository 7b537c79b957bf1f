//! Metrics collection and exposition.
//!
//! # Metrics
//! - `domain_resolve_total` (counter): lookups by cache result and outcome
//! - `domain_reload_total` (counter): reload attempts by result
//! - `domain_rules_loaded` (gauge): rules in the current snapshot
//! - `domain_snapshot_version` (gauge): version of the current snapshot
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op
//! - The Prometheus exporter is only installed by the `watch` command

use std::net::SocketAddr;

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one hostname resolution.
pub fn record_resolve(cache_hit: bool, matched: bool) {
    counter!(
        "domain_resolve_total",
        "cache" => if cache_hit { "hit" } else { "miss" },
        "outcome" => if matched { "matched" } else { "no_match" }
    )
    .increment(1);
}

/// Record a reload attempt (`applied`, `unchanged` or `rejected`).
pub fn record_reload(result: &'static str) {
    counter!("domain_reload_total", "result" => result).increment(1);
}

/// Publish the shape of the active snapshot.
pub fn record_snapshot(version: u64, rules: usize) {
    gauge!("domain_snapshot_version").set(version as f64);
    gauge!("domain_rules_loaded").set(rules as f64);
}

//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::IpAddr;

/// Root configuration for the domain router.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Upstream DNS servers (`ip:port`) used when no rule applies.
    pub fallback_dns: Vec<String>,

    /// Per-domain settings keyed by domain pattern.
    pub domain_configs: HashMap<String, DomainConfig>,

    /// Resolution cache settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            fallback_dns: vec!["8.8.8.8:53".to_string(), "1.1.1.1:53".to_string()],
            domain_configs: HashMap::new(),
            cache: CacheConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Special handling applied to domains matching a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DomainConfig {
    /// Send SNI in the upstream TLS handshake.
    pub tls_sni: bool,

    /// Custom SNI value; `{domain}` expands to the requested host.
    pub tls_sni_pattern: Option<String>,

    /// Accept upstream certificates whose names do not match.
    pub tls_ignore_name_mismatch: bool,

    /// Fixed upstream address instead of DNS resolution.
    pub ip_address: Option<IpAddr>,

    /// Upstream request timeout in seconds.
    pub timeout_secs: Option<u64>,

    /// Rewrite requests to this absolute URL.
    pub destination: Option<String>,

    /// Answer locally instead of forwarding.
    pub response: Option<ResponseConfig>,
}

/// Canned local response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResponseConfig {
    pub status_code: u16,

    #[serde(default = "default_content_type")]
    pub content_type: String,

    #[serde(default)]
    pub content_value: Option<String>,
}

fn default_content_type() -> String {
    "text/plain; charset=utf-8".to_string()
}

/// Resolution cache configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached hostnames per snapshot (0 = unbounded).
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_entries: 100_000 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

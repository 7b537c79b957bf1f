//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, status codes)
//! - Check that rewrite destinations are absolute http(s) URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Duplicate patterns are detected when the rule table is compiled

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{DomainConfig, RouterConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Check a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut patterns: Vec<&String> = config.domain_configs.keys().collect();
    patterns.sort();
    for pattern in patterns {
        validate_domain(pattern, &config.domain_configs[pattern], &mut errors);
    }

    let observability = &config.observability;
    if observability.metrics_enabled && observability.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_domain(pattern: &str, domain: &DomainConfig, errors: &mut Vec<ValidationError>) {
    let field = |name: &str| format!("domain_configs.\"{}\".{}", pattern, name);

    if pattern.trim().is_empty() {
        errors.push(ValidationError::new("domain_configs", "empty domain pattern"));
    }

    if domain.timeout_secs == Some(0) {
        errors.push(ValidationError::new(field("timeout_secs"), "must be greater than 0"));
    }

    if domain.tls_sni_pattern.is_some() && !domain.tls_sni {
        errors.push(ValidationError::new(
            field("tls_sni_pattern"),
            "requires tls_sni = true",
        ));
    }

    if let Some(destination) = &domain.destination {
        match url::Url::parse(destination) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::new(
                field("destination"),
                format!("unsupported scheme `{}`", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new(
                field("destination"),
                format!("invalid URL `{}`: {}", destination, e),
            )),
        }
    }

    if let Some(response) = &domain.response {
        if !(100..=599).contains(&response.status_code) {
            errors.push(ValidationError::new(
                field("response.status_code"),
                format!("{} is not an HTTP status code", response.status_code),
            ));
        }
    }
}

//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Initialize logging with the configured level
//! - Compile the initial resolver snapshot
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal (unlike reloads, which keep the
//!   previous snapshot)
//! - A log level given on the command line overrides the config file

use std::path::Path;
use std::sync::Arc;

use crate::config::{load_config, ConfigError, DomainConfig, RouterConfig};
use crate::observability::logging::init_logging;
use crate::resolver::DomainResolver;

const DEFAULT_LOG_LEVEL: &str = "info";

/// Load `path`, start logging and build the initial resolver.
pub fn start(
    path: &Path,
    log_level: Option<&str>,
) -> Result<(RouterConfig, Arc<DomainResolver<DomainConfig>>), ConfigError> {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            init_logging(log_level.unwrap_or(DEFAULT_LOG_LEVEL));
            tracing::error!(path = ?path, error = %e, "Failed to load configuration");
            return Err(e);
        }
    };

    init_logging(log_level.unwrap_or(config.observability.log_level.as_str()));

    tracing::info!(
        path = ?path,
        patterns = config.domain_configs.len(),
        "Configuration loaded"
    );

    let resolver = DomainResolver::from_config(&config).map_err(|e| {
        tracing::error!(error = %e, "Failed to compile domain rules");
        e
    })?;

    Ok((config, Arc::new(resolver)))
}

/// Reload `path` into an existing resolver, logging instead of failing.
///
/// Returns true if the resolver now reflects the file.
pub fn reload_from_file(path: &Path, resolver: &DomainResolver<DomainConfig>) -> bool {
    let applied = load_config(path).and_then(|config| resolver.on_configuration_changed(&config));
    match applied {
        Ok(outcome) => {
            tracing::debug!(?outcome, "Reload from file finished");
            true
        }
        Err(e) => {
            tracing::error!(path = ?path, error = %e, "Reload failed. Keeping current configuration.");
            false
        }
    }
}

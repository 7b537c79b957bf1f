//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading and rule compilation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Duplicate domain pattern `{pattern}` (declared as `{first}` and `{second}`)")]
    DuplicatePattern {
        pattern: String,
        first: String,
        second: String,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    let config: RouterConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            fallback_dns = ["114.114.114.114:53"]

            [cache]
            max_entries = 10

            [domain_configs."github.com"]
            tls_sni = true

            [domain_configs."*.github.com"]
            ip_address = "140.82.112.3"
            timeout_secs = 5
            destination = "https://github.com/"

            [domain_configs."*.githubusercontent.com".response]
            status_code = 404
            "#,
        )
        .unwrap();

        assert_eq!(config.fallback_dns, vec!["114.114.114.114:53"]);
        assert_eq!(config.cache.max_entries, 10);
        assert_eq!(config.domain_configs.len(), 3);
        assert!(config.domain_configs["github.com"].tls_sni);

        let wildcard = &config.domain_configs["*.github.com"];
        assert_eq!(wildcard.ip_address, Some("140.82.112.3".parse().unwrap()));
        assert_eq!(wildcard.timeout_secs, Some(5));

        let response = config.domain_configs["*.githubusercontent.com"].response.as_ref().unwrap();
        assert_eq!(response.status_code, 404);
        assert_eq!(response.content_type, "text/plain; charset=utf-8");
    }

    #[test]
    fn test_defaults_for_empty_config() {
        let config = parse_config("").unwrap();
        assert_eq!(config, RouterConfig::default());
        assert!(config.domain_configs.is_empty());
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("fallback_dns = 53").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error() {
        let err = parse_config(
            r#"
            [domain_configs."github.com"]
            timeout_secs = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/domain-router.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

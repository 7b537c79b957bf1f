//! Domain rule resolution with hot reload.
//!
//! Maps hostnames to per-domain settings using wildcard patterns, picking the
//! most specific pattern when several overlap, and swaps the entire rule set
//! atomically when the configuration changes.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resolver;
pub mod routing;

pub use config::{ConfigError, DomainConfig, RouterConfig};
pub use lifecycle::Shutdown;
pub use resolver::{DomainResolver, ReloadOutcome, RuleSource};
pub use routing::{DomainPattern, RuleTable};

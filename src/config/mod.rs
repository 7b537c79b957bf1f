//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → handed to the DomainResolver
//!
//! On change:
//!     watcher.rs detects change (or SIGHUP)
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → DomainResolver compiles rules and swaps the snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A config that fails to load or compile is never applied

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{CacheConfig, DomainConfig, ObservabilityConfig, ResponseConfig, RouterConfig};
pub use validation::ValidationError;
pub use watcher::ConfigWatcher;

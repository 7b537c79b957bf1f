//! Resolution subsystem.
//!
//! # Data Flow
//! ```text
//! resolve(hostname)
//!     → controller.rs (load current snapshot once)
//!     → snapshot.rs (consult cache.rs)
//!         hit  → stored rule index or NoMatch
//!         miss → RuleTable::position → store in cache
//!     → Return: payload or None
//!
//! Reload (config change):
//!     RouterConfig
//!     → RuleSource
//!     → snapshot.rs (new table + new empty cache + fallback DNS)
//!     → controller.rs (atomic swap, or keep current on error)
//! ```
//!
//! # Design Decisions
//! - Table and cache are swapped together; a cache never outlives its table
//! - Readers never block; the single writer is serialized by a mutex
//! - Duplicate concurrent cache fills are harmless (same value)
//! - Cache keys are the hostname exactly as supplied

pub mod cache;
pub mod controller;
pub mod snapshot;

pub use cache::{Resolution, ResolutionCache};
pub use controller::{DomainResolver, ReloadOutcome};
pub use snapshot::{parse_fallback_dns, MatchedRule, RuleSource, Snapshot};

//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Rule Compilation (startup and every reload):
//!     (pattern text, payload)[]
//!     → pattern.rs (parse into DomainPattern)
//!     → Sort by specificity, then text
//!     → Reject duplicates
//!     → Freeze as immutable RuleTable
//!
//! Lookup:
//!     hostname
//!     → table.rs (scan in priority order)
//!     → pattern.rs (evaluate match)
//!     → Return: first matching rule or NoMatch
//! ```
//!
//! # Design Decisions
//! - Tables compiled on load, immutable at runtime
//! - No regex in hot path (label comparison only)
//! - Deterministic: same input always matches same rule
//! - First match wins (ordered by specificity)

pub mod pattern;
pub mod table;

pub use pattern::DomainPattern;
pub use table::{Rule, RuleTable};

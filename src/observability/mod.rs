//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Resolver and reload path produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stderr)
//!     → Metrics endpoint (Prometheus scrape, `watch` mode only)
//! ```
//!
//! # Design Decisions
//! - Structured logging with key/value fields
//! - Cache hits are logged at trace level only (hot path)
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;

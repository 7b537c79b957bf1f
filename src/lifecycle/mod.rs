//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Compile initial snapshot
//!
//! Signals (signals.rs):
//!     SIGINT → Trigger shutdown (shutdown.rs)
//!     SIGHUP → Reload config from disk
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop watch loop and stdin reader → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then resolver, then watchers
//! - Startup errors are fatal; reload errors are logged and ignored

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use signals::{SignalEvent, Signals};

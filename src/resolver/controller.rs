//! Hot-reloadable domain resolver.
//!
//! Lookups load the current [`Snapshot`] from an `ArcSwap` once per call and
//! run entirely against it. Reloads compile a complete new snapshot off to the
//! side and publish it with a single atomic store; in-flight lookups keep the
//! old snapshot alive until they finish.
//!
//! ```text
//! Lookup  -> DomainResolver::resolve() -> ArcSwap::load() -> Snapshot (table + cache)
//! Reload  -> DomainResolver::reload()  -> Snapshot::build() -> ArcSwap::swap()
//!                                          (error: current snapshot kept)
//! ```

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;

use crate::config::{ConfigError, DomainConfig, RouterConfig};
use crate::observability::metrics;
use crate::resolver::snapshot::{MatchedRule, RuleSource, Snapshot};

/// Result of a successful reload request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// A new snapshot was published.
    Applied { version: u64 },
    /// The new configuration was identical; the current snapshot was kept.
    Unchanged { version: u64 },
}

impl ReloadOutcome {
    pub fn version(self) -> u64 {
        match self {
            ReloadOutcome::Applied { version } | ReloadOutcome::Unchanged { version } => version,
        }
    }
}

/// Resolves hostnames against the current rule snapshot.
///
/// # Thread Safety
///
/// Share it behind an `Arc`. Reads are lock-free; reloads are serialized with
/// a mutex that readers never touch.
pub struct DomainResolver<P> {
    current: ArcSwap<Snapshot<P>>,
    reload_lock: Mutex<()>,
}

impl<P> DomainResolver<P> {
    /// Build the initial snapshot (version 1).
    pub fn new(source: RuleSource<P>) -> Result<Self, ConfigError> {
        let snapshot = Snapshot::build(1, source)?;
        tracing::info!(
            version = snapshot.version(),
            rules = snapshot.table().len(),
            fallback_dns = snapshot.fallback_dns().len(),
            "Domain rules loaded"
        );
        metrics::record_snapshot(snapshot.version(), snapshot.table().len());
        Ok(Self::from_snapshot(snapshot))
    }

    /// A resolver with no rules; every lookup is a miss until the first reload.
    pub fn empty() -> Self {
        Self::from_snapshot(Snapshot::empty(0))
    }

    fn from_snapshot(snapshot: Snapshot<P>) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
            reload_lock: Mutex::new(()),
        }
    }

    /// The current snapshot, for callers needing several consistent reads.
    pub fn snapshot(&self) -> Arc<Snapshot<P>> {
        self.current.load_full()
    }

    /// Payload of the most specific rule matching `hostname`.
    pub fn resolve(&self, hostname: &str) -> Option<Arc<P>> {
        self.current.load().resolve(hostname).cloned()
    }

    /// Matching pattern and payload for `hostname`.
    pub fn resolve_rule(&self, hostname: &str) -> Option<MatchedRule<P>> {
        let snapshot = self.current.load();
        snapshot.resolve_rule(hostname).map(|rule| MatchedRule {
            pattern: rule.pattern.as_str().to_string(),
            payload: Arc::clone(&rule.payload),
        })
    }

    pub fn matches(&self, hostname: &str) -> bool {
        self.current.load().matches(hostname)
    }

    /// Loaded patterns in match-priority order.
    pub fn list_patterns(&self) -> Vec<String> {
        self.current.load().list_patterns()
    }

    pub fn fallback_dns(&self) -> Vec<SocketAddr> {
        self.current.load().fallback_dns().to_vec()
    }

    pub fn version(&self) -> u64 {
        self.current.load().version()
    }

    /// Replace the whole rule set.
    ///
    /// On error nothing changes and the current snapshot keeps serving.
    pub fn reload(&self, source: RuleSource<P>) -> Result<u64, ConfigError> {
        let _guard = self.lock_reload();
        let next_version = self.current.load().version() + 1;
        let snapshot = self.build_next(next_version, source)?;
        Ok(self.publish(snapshot))
    }

    fn lock_reload(&self) -> MutexGuard<'_, ()> {
        self.reload_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn build_next(&self, version: u64, source: RuleSource<P>) -> Result<Snapshot<P>, ConfigError> {
        Snapshot::build(version, source).map_err(|e| {
            tracing::error!(
                error = %e,
                current_version = version - 1,
                "Rejected domain rule reload, keeping current rules"
            );
            metrics::record_reload("rejected");
            e
        })
    }

    fn publish(&self, snapshot: Snapshot<P>) -> u64 {
        let version = snapshot.version();
        let rules = snapshot.table().len();
        let fallback_dns = snapshot.fallback_dns().len();

        let retired = self.current.swap(Arc::new(snapshot));
        let (cached_matches, cached_misses) = retired.cache().summary();

        tracing::info!(version, rules, fallback_dns, "Domain rules reloaded");
        tracing::debug!(
            retired_version = retired.version(),
            cached_matches,
            cached_misses,
            "Dropped resolution cache of previous rules"
        );
        metrics::record_reload("applied");
        metrics::record_snapshot(version, rules);
        version
    }
}

impl<P: PartialEq> DomainResolver<P> {
    /// Like [`reload`](Self::reload), but keeps the current snapshot and its
    /// warm cache when the new rule set is identical.
    pub fn reload_if_changed(&self, source: RuleSource<P>) -> Result<ReloadOutcome, ConfigError> {
        let _guard = self.lock_reload();
        let current = self.current.load_full();
        let candidate = self.build_next(current.version() + 1, source)?;

        if candidate.same_content(&current) {
            tracing::debug!(version = current.version(), "Domain rules unchanged");
            metrics::record_reload("unchanged");
            return Ok(ReloadOutcome::Unchanged {
                version: current.version(),
            });
        }

        Ok(ReloadOutcome::Applied {
            version: self.publish(candidate),
        })
    }
}

impl DomainResolver<DomainConfig> {
    /// Build a resolver from a loaded configuration.
    pub fn from_config(config: &RouterConfig) -> Result<Self, ConfigError> {
        Self::new(RuleSource::from(config))
    }

    /// Apply a changed configuration. Applying the same record twice is a no-op.
    pub fn on_configuration_changed(&self, config: &RouterConfig) -> Result<ReloadOutcome, ConfigError> {
        self.reload_if_changed(RuleSource::from(config))
    }
}

impl<P> std::fmt::Debug for DomainResolver<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.current.load();
        f.debug_struct("DomainResolver")
            .field("version", &snapshot.version())
            .field("rules", &snapshot.table().len())
            .field("cached", &snapshot.cache().len())
            .finish()
    }
}

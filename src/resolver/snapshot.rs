//! Immutable resolution snapshot.
//!
//! # Responsibilities
//! - Pair one rule table with the cache built for it
//! - Carry the fallback DNS list of the same configuration version
//! - Answer lookups, consulting and populating the cache
//!
//! # Design Decisions
//! - Built once per configuration version, never mutated except for cache fills
//! - Cache entries reference rules by index, valid only for the paired table
//! - Invalid fallback DNS endpoints are dropped, not fatal

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::{ConfigError, DomainConfig, RouterConfig};
use crate::observability::metrics;
use crate::resolver::cache::{Resolution, ResolutionCache};
use crate::routing::{Rule, RuleTable};

/// Everything needed to build a snapshot.
#[derive(Debug, Clone)]
pub struct RuleSource<P> {
    /// `(pattern text, payload)` pairs.
    pub rules: Vec<(String, P)>,

    /// Fallback DNS endpoints as `ip:port` strings.
    pub fallback_dns: Vec<String>,

    /// Cache ceiling for the snapshot (0 = unbounded).
    pub max_cache_entries: usize,
}

impl<P> RuleSource<P> {
    pub fn new(rules: Vec<(String, P)>) -> Self {
        Self {
            rules,
            fallback_dns: Vec::new(),
            max_cache_entries: 0,
        }
    }

    pub fn with_fallback_dns(mut self, fallback_dns: Vec<String>) -> Self {
        self.fallback_dns = fallback_dns;
        self
    }

    pub fn with_max_cache_entries(mut self, max_cache_entries: usize) -> Self {
        self.max_cache_entries = max_cache_entries;
        self
    }
}

impl From<&RouterConfig> for RuleSource<DomainConfig> {
    fn from(config: &RouterConfig) -> Self {
        RuleSource {
            rules: config
                .domain_configs
                .iter()
                .map(|(pattern, domain)| (pattern.clone(), domain.clone()))
                .collect(),
            fallback_dns: config.fallback_dns.clone(),
            max_cache_entries: config.cache.max_entries,
        }
    }
}

/// A matched rule as seen by consumers.
#[derive(Debug, Clone)]
pub struct MatchedRule<P> {
    /// Pattern text as configured.
    pub pattern: String,
    pub payload: Arc<P>,
}

/// One configuration version: rule table, its cache and fallback DNS.
#[derive(Debug)]
pub struct Snapshot<P> {
    version: u64,
    table: RuleTable<P>,
    cache: ResolutionCache,
    fallback_dns: Vec<SocketAddr>,
}

impl<P> Snapshot<P> {
    /// Compile a snapshot. Fails only if the rule table cannot be built.
    pub fn build(version: u64, source: RuleSource<P>) -> Result<Self, ConfigError> {
        let table = RuleTable::build(source.rules)?;
        let fallback_dns = parse_fallback_dns(&source.fallback_dns);

        Ok(Self {
            version,
            table,
            cache: ResolutionCache::new(source.max_cache_entries),
            fallback_dns,
        })
    }

    /// An empty snapshot that never matches.
    pub fn empty(version: u64) -> Self {
        Self {
            version,
            table: RuleTable::empty(),
            cache: ResolutionCache::new(0),
            fallback_dns: Vec::new(),
        }
    }

    /// Resolve `hostname` to its matching rule, using the cache.
    pub fn resolve_rule(&self, hostname: &str) -> Option<&Rule<P>> {
        let resolution = match self.cache.get(hostname) {
            Some(cached) => {
                tracing::trace!(hostname, ?cached, "Resolution cache hit");
                metrics::record_resolve(true, cached.index().is_some());
                cached
            }
            None => {
                let computed = Resolution::from_position(self.table.position(hostname));
                self.cache.insert(hostname, computed);
                tracing::trace!(hostname, ?computed, "Resolution cache miss");
                metrics::record_resolve(false, computed.index().is_some());
                computed
            }
        };

        resolution.index().and_then(|i| self.table.rule(i))
    }

    /// Payload of the rule matching `hostname`.
    pub fn resolve(&self, hostname: &str) -> Option<&Arc<P>> {
        self.resolve_rule(hostname).map(|r| &r.payload)
    }

    pub fn matches(&self, hostname: &str) -> bool {
        self.resolve_rule(hostname).is_some()
    }

    /// Pattern text in match-priority order.
    pub fn list_patterns(&self) -> Vec<String> {
        self.table.patterns()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn table(&self) -> &RuleTable<P> {
        &self.table
    }

    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }

    pub fn fallback_dns(&self) -> &[SocketAddr] {
        &self.fallback_dns
    }
}

impl<P: PartialEq> Snapshot<P> {
    /// True if `other` would answer every lookup identically.
    pub fn same_content(&self, other: &Self) -> bool {
        self.fallback_dns == other.fallback_dns && self.table.same_rules(&other.table)
    }
}

/// Parse `ip:port` strings, skipping invalid entries.
pub fn parse_fallback_dns(endpoints: &[String]) -> Vec<SocketAddr> {
    endpoints
        .iter()
        .filter_map(|endpoint| match endpoint.trim().parse::<SocketAddr>() {
            Ok(addr) => Some(addr),
            Err(_) => {
                tracing::warn!(endpoint = %endpoint, "Invalid fallback DNS endpoint, skipping");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> RuleSource<&'static str> {
        RuleSource::new(vec![
            ("github.com".to_string(), "exact"),
            ("*.github.com".to_string(), "wildcard"),
        ])
    }

    #[test]
    fn test_resolve_populates_cache() {
        let snapshot = Snapshot::build(1, source()).unwrap();
        assert!(snapshot.cache().is_empty());

        assert_eq!(snapshot.resolve("raw.github.com").map(|p| **p), Some("wildcard"));
        assert_eq!(snapshot.cache().get("raw.github.com"), Some(Resolution::Matched(0)));

        // Second lookup is served from the cache with the same answer.
        assert_eq!(snapshot.resolve("raw.github.com").map(|p| **p), Some("wildcard"));
        assert_eq!(snapshot.cache().len(), 1);
    }

    #[test]
    fn test_no_match_is_cached() {
        let snapshot = Snapshot::build(1, source()).unwrap();
        assert!(!snapshot.matches("example.org"));
        assert_eq!(snapshot.cache().get("example.org"), Some(Resolution::NoMatch));
        assert!(snapshot.resolve("example.org").is_none());
    }

    #[test]
    fn test_cache_ceiling_still_answers() {
        let snapshot = Snapshot::build(1, source().with_max_cache_entries(1)).unwrap();
        assert!(snapshot.matches("raw.github.com"));
        assert!(!snapshot.matches("example.org"));
        assert!(snapshot.matches("api.github.com"));
        assert_eq!(snapshot.cache().len(), 1);
        assert_eq!(snapshot.cache().get("example.org"), None);
    }

    #[test]
    fn test_cache_keys_are_not_normalized() {
        let snapshot = Snapshot::build(1, source()).unwrap();
        assert!(snapshot.matches("github.com"));
        assert!(snapshot.matches("GITHUB.COM"));
        assert_eq!(snapshot.cache().len(), 2);
    }

    #[test]
    fn test_resolve_rule_reports_pattern() {
        let snapshot = Snapshot::build(1, source()).unwrap();
        let rule = snapshot.resolve_rule("a.b.github.com").unwrap();
        assert_eq!(rule.pattern.as_str(), "*.github.com");
        assert_eq!(*rule.payload, "wildcard");
    }

    #[test]
    fn test_fallback_dns_skips_invalid() {
        let parsed = parse_fallback_dns(&[
            "8.8.8.8:53".to_string(),
            "not-an-endpoint".to_string(),
            "1.1.1.1".to_string(),
            "[2001:4860:4860::8888]:53".to_string(),
        ]);
        assert_eq!(
            parsed,
            vec![
                "8.8.8.8:53".parse::<SocketAddr>().unwrap(),
                "[2001:4860:4860::8888]:53".parse::<SocketAddr>().unwrap(),
            ]
        );
    }

    #[test]
    fn test_same_content() {
        let a = Snapshot::build(1, source().with_fallback_dns(vec!["8.8.8.8:53".into()])).unwrap();
        let b = Snapshot::build(2, source().with_fallback_dns(vec!["8.8.8.8:53".into()])).unwrap();
        let c = Snapshot::build(3, source()).unwrap();
        assert!(a.same_content(&b));
        assert!(!a.same_content(&c));
    }

    #[test]
    fn test_source_from_router_config() {
        let mut config = RouterConfig::default();
        config.domain_configs.insert("github.com".into(), DomainConfig::default());
        config.cache.max_entries = 7;

        let source = RuleSource::from(&config);
        assert_eq!(source.rules.len(), 1);
        assert_eq!(source.fallback_dns, config.fallback_dns);
        assert_eq!(source.max_cache_entries, 7);
    }
}

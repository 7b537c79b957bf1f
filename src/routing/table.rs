//! Sorted rule table.
//!
//! # Responsibilities
//! - Compile pattern text into `DomainPattern`s
//! - Reject rule sets with duplicate patterns
//! - Look up the first (most specific) rule matching a hostname
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in priority order (repeat lookups are served by the cache)
//! - Explicit no-match rather than silent default

use std::sync::Arc;

use crate::config::ConfigError;
use crate::routing::pattern::{DomainPattern, Hostname};

/// A pattern and the payload it resolves to.
#[derive(Debug)]
pub struct Rule<P> {
    pub pattern: DomainPattern,
    pub payload: Arc<P>,
}

/// Immutable rule set ordered by match priority.
#[derive(Debug)]
pub struct RuleTable<P> {
    rules: Vec<Rule<P>>,
}

impl<P> RuleTable<P> {
    /// Build a table from `(pattern text, payload)` pairs.
    ///
    /// Fails if two keys normalize to the same pattern.
    pub fn build<I, S>(rules: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
    {
        let mut rules: Vec<Rule<P>> = rules
            .into_iter()
            .map(|(text, payload)| Rule {
                pattern: DomainPattern::parse(text),
                payload: Arc::new(payload),
            })
            .collect();

        rules.sort_by(|a, b| a.pattern.cmp(&b.pattern));

        if let Some(pair) = rules.windows(2).find(|w| w[0].pattern == w[1].pattern) {
            let (mut first, mut second) = (pair[0].pattern.as_str(), pair[1].pattern.as_str());
            if second < first {
                std::mem::swap(&mut first, &mut second);
            }
            return Err(ConfigError::DuplicatePattern {
                pattern: pair[0].pattern.normalized().to_string(),
                first: first.to_string(),
                second: second.to_string(),
            });
        }

        for rule in rules.iter().filter(|r| r.pattern.is_literal_fallback()) {
            tracing::warn!(
                pattern = %rule.pattern,
                "Malformed wildcard pattern, treating it as an exact domain"
            );
        }

        Ok(Self { rules })
    }

    /// An empty table that never matches.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Payload of the most specific rule matching `hostname`.
    pub fn lookup(&self, hostname: &str) -> Option<&P> {
        self.position(hostname).map(|i| self.rules[i].payload.as_ref())
    }

    /// Index of the most specific rule matching `hostname`.
    pub fn position(&self, hostname: &str) -> Option<usize> {
        let host = Hostname::parse(hostname)?;
        self.rules.iter().position(|r| r.pattern.matches_host(&host))
    }

    /// Rule at `index` in priority order.
    pub fn rule(&self, index: usize) -> Option<&Rule<P>> {
        self.rules.get(index)
    }

    /// Raw pattern text in priority order.
    pub fn patterns(&self) -> Vec<String> {
        self.rules.iter().map(|r| r.pattern.as_str().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<P: PartialEq> RuleTable<P> {
    /// True if both tables hold the same pattern text and payloads in the same order.
    pub fn same_rules(&self, other: &Self) -> bool {
        self.rules.len() == other.rules.len()
            && self.rules.iter().zip(&other.rules).all(|(a, b)| {
                a.pattern.as_str() == b.pattern.as_str() && a.payload == b.payload
            })
    }
}

impl<P> Default for RuleTable<P> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(rules: &[(&str, &'static str)]) -> RuleTable<&'static str> {
        RuleTable::build(rules.iter().map(|(k, v)| (*k, *v))).unwrap()
    }

    #[test]
    fn test_specific_rule_wins() {
        let table = table(&[("*.b.com", "general"), ("a.b.com", "specific")]);
        assert_eq!(table.lookup("a.b.com"), Some(&"specific"));
        assert_eq!(table.lookup("x.b.com"), Some(&"general"));
        assert_eq!(table.lookup("b.com"), None);
    }

    #[test]
    fn test_narrower_wildcard_wins_over_broader() {
        let table = table(&[("*.example.com", "general"), ("cdn.*.example.com", "cdn")]);
        assert_eq!(table.patterns(), vec!["cdn.*.example.com", "*.example.com"]);
        assert_eq!(table.lookup("cdn.eu.example.com"), Some(&"cdn"));
        assert_eq!(table.lookup("img.eu.example.com"), Some(&"general"));

        let table = self::table(&[("*.*.com", "general"), ("a.*.com", "specific")]);
        assert_eq!(table.patterns(), vec!["a.*.com", "*.*.com"]);
        assert_eq!(table.lookup("a.b.com"), Some(&"specific"));
        assert_eq!(table.lookup("c.b.com"), Some(&"general"));
        assert_eq!(table.lookup("b.com"), None);
    }

    #[test]
    fn test_exact_and_wildcard() {
        let table = table(&[("github.com", "exact"), ("*.github.com", "wildcard")]);
        assert_eq!(table.lookup("github.com"), Some(&"exact"));
        assert_eq!(table.lookup("GITHUB.COM"), Some(&"exact"));
        assert_eq!(table.lookup("raw.github.com"), Some(&"wildcard"));
        assert_eq!(table.lookup("a.b.github.com"), Some(&"wildcard"));
        assert_eq!(table.lookup("example.org"), None);
    }

    #[test]
    fn test_patterns_in_priority_order() {
        let table = table(&[
            ("*", "any"),
            ("*.githubusercontent.com", "content"),
            ("raw.githubusercontent.com", "raw"),
            ("*.github.com", "github"),
        ]);
        assert_eq!(
            table.patterns(),
            vec![
                "raw.githubusercontent.com",
                "*.github.com",
                "*.githubusercontent.com",
                "*",
            ]
        );
        assert_eq!(table.position("raw.githubusercontent.com"), Some(0));
        assert_eq!(table.lookup("example.org"), Some(&"any"));
    }

    #[test]
    fn test_duplicate_pattern_rejected() {
        let result = RuleTable::build(vec![("GitHub.com", 1), ("github.com.", 2)]);
        match result {
            Err(ConfigError::DuplicatePattern { pattern, first, second }) => {
                assert_eq!(pattern, "github.com");
                assert_eq!(first, "GitHub.com");
                assert_eq!(second, "github.com.");
            }
            other => panic!("expected duplicate pattern error, got {:?}", other.map(|t| t.len())),
        }
    }

    #[test]
    fn test_empty_and_malformed_hostnames() {
        let table = table(&[("*", "any")]);
        assert_eq!(table.lookup(""), None);
        assert_eq!(table.lookup("a..b"), None);
        assert!(RuleTable::<u8>::empty().lookup("github.com").is_none());
    }

    #[test]
    fn test_same_rules() {
        let a = table(&[("github.com", "x"), ("*.github.com", "y")]);
        let b = table(&[("*.github.com", "y"), ("github.com", "x")]);
        let c = table(&[("github.com", "x"), ("*.github.com", "z")]);
        let d = table(&[("GitHub.com", "x"), ("*.github.com", "y")]);
        assert!(a.same_rules(&b));
        assert!(!a.same_rules(&c));
        assert!(!a.same_rules(&d));
    }
}

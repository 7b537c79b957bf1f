//! Domain pattern parsing, matching and ordering.
//!
//! # Responsibilities
//! - Parse pattern text (`github.com`, `*.github.com`, `cdn.*.example.com`)
//! - Match hostnames against a pattern (case-insensitive, trailing dot ignored)
//! - Rank patterns so the most specific one is tried first
//!
//! # Design Decisions
//! - Parsing never fails: malformed wildcards degrade to exact-match literals
//! - A `*` segment absorbs one or more labels, never zero
//! - Equality, hashing and ordering all use the normalized text
//! - No regex; matching is O(segments x labels) for any pattern

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

const WILDCARD: &str = "*";

/// One dot-separated piece of a wildcard pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Label(String),
    Any,
}

#[derive(Debug, Clone)]
enum PatternKind {
    /// Compare the whole normalized hostname.
    Exact,
    /// Right-aligned segment match.
    Wildcard(Vec<Segment>),
}

/// A parsed domain-matching rule.
#[derive(Debug, Clone)]
pub struct DomainPattern {
    raw: String,
    normalized: String,
    kind: PatternKind,
    specificity: usize,
    /// All literal labels, anchored or not.
    literal_labels: usize,
    wildcards: usize,
    literal_fallback: bool,
}

impl DomainPattern {
    /// Parse pattern text. Never fails.
    ///
    /// Text with an empty label (`a..com`) or a segment that mixes `*` with
    /// other characters (`gi*hub.com`) is kept as a literal exact-match pattern.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);

        let labels: Vec<&str> = normalized.split('.').collect();
        let malformed = normalized.is_empty()
            || labels.iter().any(|l| l.is_empty() || (l.contains('*') && *l != WILDCARD));

        if malformed || !labels.contains(&WILDCARD) {
            let specificity = if normalized.is_empty() { 0 } else { labels.len() };
            let literal_fallback = normalized.contains('*');
            return Self {
                raw,
                normalized,
                kind: PatternKind::Exact,
                specificity,
                literal_labels: specificity,
                wildcards: 0,
                literal_fallback,
            };
        }

        let segments: Vec<Segment> = labels
            .iter()
            .map(|l| {
                if *l == WILDCARD {
                    Segment::Any
                } else {
                    Segment::Label((*l).to_string())
                }
            })
            .collect();

        // Literal labels anchored at the right-hand end, up to the first wildcard.
        let specificity = segments
            .iter()
            .rev()
            .take_while(|s| matches!(s, Segment::Label(_)))
            .count();
        let wildcards = segments.iter().filter(|s| **s == Segment::Any).count();

        Self {
            raw,
            normalized,
            literal_labels: segments.len() - wildcards,
            wildcards,
            kind: PatternKind::Wildcard(segments),
            specificity,
            literal_fallback: false,
        }
    }

    /// The pattern text exactly as configured.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Lower-cased text without surrounding whitespace or trailing dot.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Number of literal labels anchored at the right-hand end.
    pub fn specificity(&self) -> usize {
        self.specificity
    }

    /// True if the pattern contains at least one wildcard segment.
    pub fn is_wildcard(&self) -> bool {
        matches!(self.kind, PatternKind::Wildcard(_))
    }

    /// True if the text looked like a wildcard but was kept as a literal.
    pub fn is_literal_fallback(&self) -> bool {
        self.literal_fallback
    }

    /// Returns true if `candidate` matches this pattern.
    pub fn matches(&self, candidate: &str) -> bool {
        match Hostname::parse(candidate) {
            Some(host) => self.matches_host(&host),
            None => false,
        }
    }

    /// Match an already normalized hostname.
    pub(crate) fn matches_host(&self, host: &Hostname) -> bool {
        match &self.kind {
            PatternKind::Exact => !self.normalized.is_empty() && host.as_str() == self.normalized,
            PatternKind::Wildcard(segments) => match_segments(segments, &host.labels()),
        }
    }
}

/// Match segments against labels, both right-aligned.
///
/// `consumed[k]` is true when the segments seen so far can absorb exactly the
/// last `k` labels. One pass per segment keeps the cost at segments x labels.
fn match_segments(segments: &[Segment], labels: &[&str]) -> bool {
    let n = labels.len();
    let mut consumed = vec![false; n + 1];
    consumed[0] = true;

    for segment in segments.iter().rev() {
        let mut next = vec![false; n + 1];
        match segment {
            Segment::Label(expected) => {
                for k in 0..n {
                    next[k + 1] = consumed[k] && labels[n - 1 - k] == expected.as_str();
                }
            }
            Segment::Any => {
                // One or more labels: reachable from any strictly shorter suffix.
                let mut reachable = false;
                for k in 1..=n {
                    reachable |= consumed[k - 1];
                    next[k] = reachable;
                }
            }
        }
        if !next.contains(&true) {
            return false;
        }
        consumed = next;
    }

    consumed[n]
}

fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    trimmed.to_ascii_lowercase()
}

impl PartialEq for DomainPattern {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
    }
}

impl Eq for DomainPattern {}

impl Hash for DomainPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
    }
}

impl Ord for DomainPattern {
    /// More specific patterns sort first. Equal right-anchored specificity
    /// falls back to more literal labels, then fewer wildcards, then text.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .specificity
            .cmp(&self.specificity)
            .then_with(|| other.literal_labels.cmp(&self.literal_labels))
            .then_with(|| self.wildcards.cmp(&other.wildcards))
            .then_with(|| self.normalized.cmp(&other.normalized))
    }
}

impl PartialOrd for DomainPattern {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DomainPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl From<&str> for DomainPattern {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

/// A lookup hostname, normalized once and matched against many patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Hostname(String);

impl Hostname {
    /// Returns `None` for empty or malformed hostnames (empty labels).
    pub(crate) fn parse(candidate: &str) -> Option<Self> {
        let normalized = normalize(candidate);
        if normalized.is_empty() || normalized.split('.').any(str::is_empty) {
            return None;
        }
        Some(Self(normalized))
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn labels(&self) -> Vec<&str> {
        self.0.split('.').collect()
    }
}

//! Per-snapshot resolution cache.

use dashmap::DashMap;

/// Outcome stored for a hostname.
///
/// A hostname absent from the cache has not been resolved yet. `NoMatch` is
/// stored explicitly so repeated misses do not rescan the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Index of the matching rule in the paired `RuleTable`.
    Matched(usize),
    NoMatch,
}

impl Resolution {
    pub fn from_position(position: Option<usize>) -> Self {
        match position {
            Some(index) => Resolution::Matched(index),
            None => Resolution::NoMatch,
        }
    }

    pub fn index(self) -> Option<usize> {
        match self {
            Resolution::Matched(index) => Some(index),
            Resolution::NoMatch => None,
        }
    }
}

/// A thread-safe memo of hostname → resolution.
///
/// Keys are hostnames exactly as supplied; `GitHub.com` and `github.com`
/// occupy separate entries. A cache is only meaningful together with the
/// rule table it was created for, so it is never reused across reloads.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    inner: DashMap<String, Resolution>,
    /// 0 means unbounded.
    max_entries: usize,
}

impl ResolutionCache {
    /// Create an empty cache holding at most `max_entries` hostnames.
    pub fn new(max_entries: usize) -> Self {
        Self {
            inner: DashMap::new(),
            max_entries,
        }
    }

    /// Cached resolution for `hostname`, if any.
    pub fn get(&self, hostname: &str) -> Option<Resolution> {
        self.inner.get(hostname).map(|r| *r.value())
    }

    /// Store a resolution. Returns false if the cache is full and the entry
    /// was not stored.
    ///
    /// Concurrent inserts for the same hostname always carry the same value,
    /// so last-write-wins is harmless.
    pub fn insert(&self, hostname: &str, resolution: Resolution) -> bool {
        if self.max_entries > 0
            && self.inner.len() >= self.max_entries
            && !self.inner.contains_key(hostname)
        {
            return false;
        }
        self.inner.insert(hostname.to_string(), resolution);
        true
    }

    /// Number of cached hostnames.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Count of (matched, no-match) entries.
    pub fn summary(&self) -> (usize, usize) {
        let mut matched = 0;
        let mut no_match = 0;
        for r in self.inner.iter() {
            match r.value() {
                Resolution::Matched(_) => matched += 1,
                Resolution::NoMatch => no_match += 1,
            }
        }
        (matched, no_match)
    }
}

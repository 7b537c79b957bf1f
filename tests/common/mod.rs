//! Shared utilities for integration tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use domain_router::RuleSource;

static NEXT_FILE: AtomicU32 = AtomicU32::new(0);

/// A config file path unique to this test process.
#[allow(dead_code)]
pub fn temp_config_path(name: &str) -> PathBuf {
    let n = NEXT_FILE.fetch_add(1, Ordering::SeqCst);
    std::env::temp_dir().join(format!(
        "domain-router-{}-{}-{}.toml",
        name,
        std::process::id(),
        n
    ))
}

/// Write `content` to `path`, replacing any previous file.
#[allow(dead_code)]
pub fn write_config(path: &PathBuf, content: &str) {
    std::fs::write(path, content).unwrap();
}

/// A rule source mapping every pattern to the same payload.
#[allow(dead_code)]
pub fn uniform_source<P: Clone>(patterns: &[&str], payload: P) -> RuleSource<P> {
    RuleSource::new(
        patterns
            .iter()
            .map(|p| (p.to_string(), payload.clone()))
            .collect(),
    )
}

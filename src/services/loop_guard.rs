//! Loop guard
//!
//! The write-back engine commits to README.md, which re-triggers the
//! webhook. This service breaks the cycle with two checks: a per-PR
//! suppression window, and a doc-only heuristic for synchronize events.
//! State is in-memory only and purged on access.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;

const DOC_PATH_PATTERNS: &[&str] = &[
    "readme.md",
    "readme.rst",
    "readme.txt",
    "docs/",
    "documentation/",
];

#[derive(Debug, Clone, Copy)]
pub struct LoopGuardConfig {
    /// Events for the same PR within this window are dropped.
    pub suppress_window: Duration,
    /// Entries older than this are purged outright.
    pub entry_ttl: Duration,
}

impl Default for LoopGuardConfig {
    fn default() -> Self {
        Self {
            suppress_window: Duration::seconds(180),
            entry_ttl: Duration::seconds(600),
        }
    }
}

/// True when every changed filename looks like documentation. An empty
/// listing is not doc-only: with no evidence, process the event.
pub fn doc_only_change(filenames: &[String]) -> bool {
    if filenames.is_empty() {
        return false;
    }
    filenames.iter().all(|name| {
        let lower = name.to_lowercase();
        lower.ends_with(".md") || DOC_PATH_PATTERNS.iter().any(|p| lower.contains(p))
    })
}

#[derive(Clone)]
pub struct LoopGuard {
    config: LoopGuardConfig,
    entries: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl LoopGuard {
    pub fn new(config: LoopGuardConfig) -> Self {
        Self {
            config,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn key(repo_full_name: &str, pr_number: u64) -> String {
        format!("{repo_full_name}/{pr_number}")
    }

    /// Cheap read-only check, safe to call before any network I/O.
    pub fn recently_processed(&self, repo_full_name: &str, pr_number: u64) -> bool {
        let key = Self::key(repo_full_name, pr_number);
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        match entries.get(&key) {
            Some(seen) => Utc::now() - *seen < self.config.suppress_window,
            None => false,
        }
    }

    /// Purge expired entries, re-check the window, and record this PR as
    /// processed. Returns false if another event won the window first.
    /// Check and record happen under one write lock, so of two racing
    /// events for the same PR at most one proceeds.
    pub fn try_begin(&self, repo_full_name: &str, pr_number: u64) -> bool {
        let key = Self::key(repo_full_name, pr_number);
        let now = Utc::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        entries.retain(|_, seen| now - *seen < self.config.entry_ttl);

        if let Some(seen) = entries.get(&key) {
            if now - *seen < self.config.suppress_window {
                debug!(key, "event suppressed by loop guard");
                return false;
            }
        }
        entries.insert(key, now);
        true
    }

    #[cfg(test)]
    fn entry_count(&self) -> usize {
        self.entries.read().unwrap().len()
    }
}

impl Default for LoopGuard {
    fn default() -> Self {
        Self::new(LoopGuardConfig::default())
    }
}

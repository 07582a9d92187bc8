//! Cycle-exhaustion tracking
//!
//! The rotation log lists the keys picked automatically since the last
//! reset. Once every non-inactive candidate has been picked, the log is
//! cleared and a new cycle starts.

use serde::{Deserialize, Serialize};

use super::status::StatusStore;
use crate::models::Catalog;

/// Ordered set of keys selected in the current cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RotationLog {
    keys: Vec<String>,
}

impl RotationLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Log over previously persisted keys, dropping duplicates
    pub fn from_keys(keys: impl IntoIterator<Item = String>) -> Self {
        let mut log = Self::new();
        for key in keys {
            log.record(&key);
        }
        log
    }

    /// Keys eligible for automatic selection, in catalog order
    ///
    /// A key is eligible iff it is not in the log and its status is not
    /// inactive.
    pub fn filter_eligible(&self, candidates: &Catalog, statuses: &StatusStore) -> Vec<String> {
        candidates
            .keys()
            .filter(|key| !self.contains(key) && !statuses.is_inactive(key))
            .cloned()
            .collect()
    }

    /// Clear the log when nothing is eligible
    ///
    /// Returns whether the log was modified.
    pub fn reset_if_exhausted(&mut self, candidates: &Catalog, statuses: &StatusStore) -> bool {
        if !self.filter_eligible(candidates, statuses).is_empty() {
            return false;
        }

        let had_entries = !self.keys.is_empty();
        self.keys.clear();
        if had_entries {
            tracing::info!("Rotation cycle exhausted, starting a new cycle");
        }
        had_entries
    }

    /// Drop keys no longer in the catalog, returning how many were removed
    pub fn retain_known(&mut self, candidates: &Catalog) -> usize {
        let before = self.keys.len();
        self.keys.retain(|key| candidates.contains_key(key));
        before - self.keys.len()
    }

    /// Append a key picked by automatic selection
    pub fn record(&mut self, key: &str) {
        if !self.contains(key) {
            self.keys.push(key.to_string());
        }
    }

    /// Whether `key` was already picked this cycle
    pub fn contains(&self, key: &str) -> bool {
        self.keys.iter().any(|k| k == key)
    }

    /// Number of keys picked this cycle
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the cycle has just started
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in pick order
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

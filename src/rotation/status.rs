//! Per-entry reliability counters
//!
//! The store owns a snapshot of `status.json`. Every mutation goes through
//! [`StatusRecord::after_probe`]: read the current record (or the default),
//! compute the next one, write it back.

use crate::models::{StatusMap, StatusRecord, MAX_FAILURE_COUNT};

/// Result of applying one probe outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeUpdate {
    /// Whether the stored record changed
    pub changed: bool,

    /// The probe outcome, passed through
    pub is_ok: bool,
}

/// In-memory status set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusStore {
    records: StatusMap,
    max_failure_count: u32,
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new(MAX_FAILURE_COUNT)
    }
}

impl StatusStore {
    /// Empty store with the given inactivity threshold
    pub fn new(max_failure_count: u32) -> Self {
        Self {
            records: StatusMap::new(),
            max_failure_count,
        }
    }

    /// Store over previously persisted records
    pub fn from_records(records: StatusMap, max_failure_count: u32) -> Self {
        Self {
            records,
            max_failure_count,
        }
    }

    /// Inactivity threshold
    pub fn max_failure_count(&self) -> u32 {
        self.max_failure_count
    }

    /// Create the default record for `key` if missing
    ///
    /// Returns whether a record was created.
    pub fn ensure(&mut self, key: &str) -> bool {
        if self.records.contains_key(key) {
            return false;
        }
        self.records.insert(key.to_string(), StatusRecord::default());
        true
    }

    /// Current record, or the default for unknown keys
    pub fn get(&self, key: &str) -> StatusRecord {
        self.records.get(key).copied().unwrap_or_default()
    }

    /// Whether `key` is excluded from automatic rotation
    pub fn is_inactive(&self, key: &str) -> bool {
        self.get(key).is_inactive()
    }

    /// Apply a probe outcome to `key`
    pub fn update(&mut self, key: &str, probe_succeeded: bool) -> ProbeUpdate {
        let current = self.get(key);
        let (next, changed) = current.after_probe(probe_succeeded, self.max_failure_count);

        if changed {
            self.records.insert(key.to_string(), next);
            tracing::debug!(
                key = %key,
                status = %next.status,
                failure_count = next.failure_count,
                "Status updated"
            );
        }

        ProbeUpdate {
            changed,
            is_ok: probe_succeeded,
        }
    }

    /// Force `key` back to `{active, 0}`
    ///
    /// Returns `false` if the key has no record.
    pub fn reset(&mut self, key: &str) -> bool {
        match self.records.get_mut(key) {
            Some(record) => {
                *record = StatusRecord::default();
                true
            }
            None => false,
        }
    }

    /// Force every record back to `{active, 0}`, returning how many exist
    pub fn reset_all(&mut self) -> usize {
        for record in self.records.values_mut() {
            *record = StatusRecord::default();
        }
        self.records.len()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no records are stored
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow the records
    pub fn records(&self) -> &StatusMap {
        &self.records
    }

    /// Consume the store, returning the records for persistence
    pub fn into_records(self) -> StatusMap {
        self.records
    }
}

//! One rotation run: load state, select, persist
//!
//! State is read once at the start and written once at the end. The status
//! file is written only when a record was created or changed. The rotation
//! log is written only in automatic mode, after an acceptance or a reset.

use super::selector::{IndexSource, Selection, SelectionReport, Selector};
use super::status::StatusStore;
use crate::liveness::Prober;
use crate::models::CandidateEntry;
use crate::storage::{DataStore, StoreResult};

/// How a run was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Pick from the rotation
    Automatic,
    /// Pick this key
    Manual(String),
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: SelectionReport,
    /// The accepted entry, or the manual entry that failed its probe
    pub entry: Option<CandidateEntry>,
}

/// Drives a [`Selector`] over a [`DataStore`]
pub struct RotationEngine<P> {
    store: DataStore,
    selector: Selector<P>,
    max_failure_count: u32,
}

impl<P: Prober> RotationEngine<P> {
    pub fn new(store: DataStore, selector: Selector<P>, max_failure_count: u32) -> Self {
        Self {
            store,
            selector,
            max_failure_count,
        }
    }

    /// Borrow the selector
    pub fn selector(&self) -> &Selector<P> {
        &self.selector
    }

    /// Run one selection and persist what changed
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if any file cannot be read or written. Nothing
    /// is written when loading fails.
    pub async fn run<D: IndexSource>(
        &self,
        mode: &RunMode,
        draws: &mut D,
    ) -> StoreResult<RunOutcome> {
        let catalog = self.store.load_catalog()?;
        let mut statuses =
            StatusStore::from_records(self.store.load_statuses()?, self.max_failure_count);

        let mut rotation = None;
        let report = match mode {
            RunMode::Manual(key) => {
                self.selector
                    .select_manual(key, &catalog, &mut statuses)
                    .await
            }
            RunMode::Automatic => {
                let mut log = self.store.load_rotation()?;
                let report = self
                    .selector
                    .select_auto(&catalog, &mut statuses, &mut log, draws)
                    .await;
                rotation = Some(log);
                report
            }
        };

        if report.status_changed {
            self.store.save_statuses(statuses.records())?;
            tracing::debug!(records = statuses.len(), "Status file saved");
        }

        if let Some(log) = rotation.filter(|_| report.log_changed) {
            self.store.save_rotation(&log)?;
            tracing::debug!(cycle_len = log.len(), "Rotation log saved");
        }

        let entry = match &report.selection {
            Selection::Selected { key, .. } | Selection::Unreachable(key) => {
                catalog.get(key).cloned()
            }
            Selection::Nothing | Selection::NotFound(_) => None,
        };

        Ok(RunOutcome { report, entry })
    }
}

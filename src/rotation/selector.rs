//! Manual and automatic selection
//!
//! Automatic selection draws from a working pool of eligible keys. The pool
//! only shrinks when a candidate crosses the inactivity threshold, so a key
//! that fails without crossing it can be drawn again in the same run.
//! Attempts are capped at `min(|eligible|, max_attempts)`.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

use super::log::RotationLog;
use super::status::StatusStore;
use crate::config::MAX_ATTEMPTS;
use crate::liveness::{ProbePolicy, Prober};
use crate::models::Catalog;

// ============================================================================
// Index Sources
// ============================================================================

/// Source of uniform draws over the working pool
pub trait IndexSource {
    /// An index in `0..len`; callers never pass `len == 0`
    fn next_index(&mut self, len: usize) -> usize;
}

/// RNG-backed draws
#[derive(Debug, Clone)]
pub struct RandomIndex<R> {
    rng: R,
}

impl RandomIndex<ChaCha8Rng> {
    /// Reproducible draws for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draws seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl<R: Rng> IndexSource for RandomIndex<R> {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Replays a fixed sequence of draws, wrapping each into range
///
/// Once the sequence runs out every draw is `0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedIndex {
    draws: VecDeque<usize>,
}

impl ScriptedIndex {
    pub fn new(draws: impl IntoIterator<Item = usize>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
        }
    }
}

impl IndexSource for ScriptedIndex {
    fn next_index(&mut self, len: usize) -> usize {
        self.draws.pop_front().unwrap_or(0) % len
    }
}

// ============================================================================
// Selection Results
// ============================================================================

/// How the run was invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// No key supplied
    Automatic,
    /// Explicit key supplied
    Manual,
}

/// Outcome of one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A candidate was accepted
    Selected {
        key: String,
        /// `false` for out-of-band URLs accepted without a probe
        probed: bool,
    },
    /// Automatic run found nothing eligible or nothing reachable
    Nothing,
    /// Manual key is not in the catalog
    NotFound(String),
    /// Manual key failed its probe
    Unreachable(String),
}

/// Selection outcome plus what the caller must persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionReport {
    pub mode: SelectionMode,
    pub selection: Selection,
    /// Status set must be written back
    pub status_changed: bool,
    /// Rotation log must be written back
    pub log_changed: bool,
    /// Draws made from the working pool
    pub attempts: usize,
}

impl SelectionReport {
    fn new(mode: SelectionMode, selection: Selection) -> Self {
        Self {
            mode,
            selection,
            status_changed: false,
            log_changed: false,
            attempts: 0,
        }
    }

    /// Key of the accepted candidate
    pub fn selected_key(&self) -> Option<&str> {
        match &self.selection {
            Selection::Selected { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Whether the run must end unsuccessfully
    pub fn should_exit(&self) -> bool {
        matches!(
            self.selection,
            Selection::NotFound(_) | Selection::Unreachable(_)
        )
    }
}

// ============================================================================
// Selector
// ============================================================================

/// Picks one candidate per run
pub struct Selector<P> {
    prober: P,
    policy: ProbePolicy,
    max_attempts: usize,
}

impl<P: Prober> Selector<P> {
    /// Create a selector with the default attempt cap
    pub fn new(prober: P, policy: ProbePolicy) -> Self {
        Self {
            prober,
            policy,
            max_attempts: MAX_ATTEMPTS,
        }
    }

    /// Override the attempt cap
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Borrow the prober
    pub fn prober(&self) -> &P {
        &self.prober
    }

    /// Select an explicitly requested key
    ///
    /// Never touches the rotation log and never falls back to automatic
    /// selection.
    pub async fn select_manual(
        &self,
        key: &str,
        candidates: &Catalog,
        statuses: &mut StatusStore,
    ) -> SelectionReport {
        let Some(entry) = candidates.get(key) else {
            tracing::warn!(key = %key, "Requested bookmark not found");
            return SelectionReport::new(SelectionMode::Manual, Selection::NotFound(key.into()));
        };

        let mut report = SelectionReport::new(SelectionMode::Manual, Selection::Nothing);
        report.status_changed = statuses.ensure(key);

        if self.policy.is_out_of_band(&entry.url) {
            tracing::info!(key = %key, url = %entry.url, "Out-of-band URL, skipping probe");
            report.selection = Selection::Selected {
                key: key.to_string(),
                probed: false,
            };
            return report;
        }

        report.attempts = 1;
        let ok = self.prober.probe(&entry.url).await;
        let update = statuses.update(key, ok);
        report.status_changed |= update.changed;

        report.selection = if update.is_ok {
            Selection::Selected {
                key: key.to_string(),
                probed: true,
            }
        } else {
            let record = statuses.get(key);
            tracing::warn!(
                key = %key,
                url = %entry.url,
                failure_count = record.failure_count,
                status = %record.status,
                "Requested bookmark is unreachable"
            );
            Selection::Unreachable(key.to_string())
        };

        report
    }

    /// Select a key from the rotation
    pub async fn select_auto<D: IndexSource>(
        &self,
        candidates: &Catalog,
        statuses: &mut StatusStore,
        log: &mut RotationLog,
        draws: &mut D,
    ) -> SelectionReport {
        let mut report = SelectionReport::new(SelectionMode::Automatic, Selection::Nothing);

        // deleted bookmarks must not count toward the cycle
        let stale = log.retain_known(candidates);
        if stale > 0 {
            tracing::debug!(stale, "Dropped rotation entries missing from the catalog");
        }

        let mut pool = log.filter_eligible(candidates, statuses);
        if pool.is_empty() {
            report.log_changed = log.reset_if_exhausted(candidates, statuses);
            pool = log.filter_eligible(candidates, statuses);
        }

        if pool.is_empty() {
            tracing::info!(
                candidates = candidates.len(),
                "No eligible bookmarks, every candidate is inactive"
            );
            return report;
        }

        let max_attempts = pool.len().min(self.max_attempts);
        tracing::debug!(
            eligible = pool.len(),
            max_attempts,
            cycle_position = log.len(),
            "Starting automatic selection"
        );

        let mut chosen = None;
        while report.attempts < max_attempts && !pool.is_empty() {
            report.attempts += 1;
            let index = draws.next_index(pool.len()).min(pool.len() - 1);
            let key = pool[index].clone();

            let Some(entry) = candidates.get(&key) else {
                pool.remove(index);
                continue;
            };

            report.status_changed |= statuses.ensure(&key);

            if self.policy.is_out_of_band(&entry.url) {
                tracing::info!(key = %key, url = %entry.url, "Out-of-band URL, skipping probe");
                chosen = Some((key, false));
                break;
            }

            let ok = self.prober.probe(&entry.url).await;
            let update = statuses.update(&key, ok);
            report.status_changed |= update.changed;

            if update.is_ok {
                chosen = Some((key, true));
                break;
            }

            let record = statuses.get(&key);
            tracing::info!(
                attempt = report.attempts,
                key = %key,
                url = %entry.url,
                failure_count = record.failure_count,
                "Bookmark failed liveness probe"
            );

            if record.failure_count >= statuses.max_failure_count() {
                tracing::warn!(key = %key, "Bookmark marked inactive");
                pool.remove(index);
            }
        }

        match chosen {
            Some((key, probed)) => {
                log.record(&key);
                report.log_changed = true;
                report.selection = Selection::Selected { key, probed };
            }
            None => {
                tracing::warn!(
                    attempts = report.attempts,
                    "No reachable bookmark found within the attempt budget"
                );
            }
        }

        report
    }
}

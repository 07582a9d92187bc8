//! Rotation-and-liveness engine
//!
//! This module implements the selection policy that ensures:
//! - Every non-inactive bookmark is picked once per cycle before any repeats
//! - Unreachable bookmarks accumulate failures and drop out after
//!   `max_failure_count` consecutive failures
//! - A successful probe immediately restores a bookmark
//!
//! # Components
//!
//! - [`status`] - per-entry reliability counters
//! - [`log`] - cycle-exhaustion tracking
//! - [`selector`] - manual/automatic selection state machine
//! - [`engine`] - load → select → persist for one invocation

pub mod engine;
pub mod log;
pub mod selector;
pub mod status;

pub use engine::{RotationEngine, RunMode, RunOutcome};
pub use log::RotationLog;
pub use selector::{
    IndexSource, RandomIndex, ScriptedIndex, Selection, SelectionMode, SelectionReport, Selector,
};
pub use status::{ProbeUpdate, StatusStore};

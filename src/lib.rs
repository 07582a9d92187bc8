//! iroiro - bookmark rotation with liveness tracking
//!
//! Picks one bookmarked site per invocation for publication, making sure
//! the pick is still reachable and that every site gets its turn before
//! any site repeats.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures and types
//! - [`liveness`] - URL probing with exempt-host and out-of-band rules
//! - [`rotation`] - Status tracking, rotation log and selection
//! - [`storage`] - JSON persistence of catalog, statuses and rotation log
//! - [`publish`] - Hand-off of the selected bookmark
//! - [`bookmarks`] - Catalog editing (add/edit/delete/check)
//! - [`utils`] - Common utilities and helpers
//!
//! # Example
//!
//! ```no_run
//! use iroiro::config::Config;
//! use iroiro::liveness::{LivenessChecker, ProbePolicy};
//! use iroiro::rotation::{RandomIndex, RotationEngine, RunMode, Selector};
//! use iroiro::storage::DataStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let checker = LivenessChecker::from_config(&config.probe)?;
//!     let selector = Selector::new(checker, ProbePolicy::from_config(&config.probe));
//!     let engine = RotationEngine::new(
//!         DataStore::from_config(&config.data),
//!         selector,
//!         config.selection.max_failure_count,
//!     );
//!     let outcome = engine
//!         .run(&RunMode::Automatic, &mut RandomIndex::from_entropy())
//!         .await?;
//!     if let Some(entry) = outcome.entry {
//!         println!("{}", entry.content());
//!     }
//!     Ok(())
//! }
//! ```

pub mod bookmarks;
pub mod config;
pub mod error;
pub mod liveness;
pub mod models;
pub mod publish;
pub mod rotation;
pub mod storage;
pub mod utils;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::liveness::{LivenessChecker, ProbePolicy, Prober};
    pub use crate::models::{CandidateEntry, Catalog, SiteStatus, StatusRecord};
    pub use crate::publish::{NoteDraft, Publisher};
    pub use crate::rotation::{
        RotationEngine, RotationLog, RunMode, Selection, Selector, StatusStore,
    };
    pub use crate::storage::DataStore;
}

// Direct re-exports for convenience
pub use models::{CandidateEntry, Catalog, SiteStatus, StatusRecord, MAX_FAILURE_COUNT};

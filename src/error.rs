//! Unified error handling for the iroiro crate
//!
//! This module provides a unified error type that consolidates all domain-specific
//! errors into a single `Error` enum, while maintaining the ability to use
//! domain-specific errors when needed.
//!
//! # Architecture
//!
//! - [`ErrorCategory`] - Classification of errors for handling strategies
//! - [`Error`] - Unified error enum wrapping all domain-specific errors
//!
//! Probe failures never show up here: they are absorbed into failure
//! counts by the selector. Only a missing or unreachable manual bookmark,
//! persistence faults, and hand-off faults end a run unsuccessfully.

use thiserror::Error;

pub use crate::publish::PublishError;
pub use crate::utils::error::{BookmarkError, ProbeError, StoreError};

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Requested bookmark missing or unreachable
    Selection,
    /// Network-related errors (HTTP, timeout)
    Network,
    /// Storage and I/O errors
    Storage,
    /// Catalog edit rejected
    Catalog,
    /// Configuration and validation errors
    Config,
}

impl ErrorCategory {
    /// Short label for log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::Network => "network",
            Self::Storage => "storage",
            Self::Catalog => "catalog",
            Self::Config => "config",
        }
    }
}

/// Unified error type for the iroiro crate
#[derive(Error, Debug)]
pub enum Error {
    /// Manually requested key is not in the catalog
    #[error("Bookmark {0} not found")]
    NotFound(String),

    /// Manually requested bookmark failed its liveness probe
    #[error("Bookmark {key} is unreachable ({url})")]
    Unreachable { key: String, url: String },

    /// Persisted state could not be read or written
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Catalog edit rejected
    #[error("Bookmark error: {0}")]
    Bookmark(#[from] BookmarkError),

    /// Liveness checker could not be built
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Draft hand-off failed
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Check if a later run could succeed without intervention
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Unreachable { .. } => true,
            Self::Probe(e) => e.is_recoverable(),
            Self::Publish(PublishError::Http(_)) => true,
            Self::Publish(PublishError::Rejected { status, .. }) => *status >= 500,
            Self::NotFound(_)
            | Self::Store(_)
            | Self::Bookmark(_)
            | Self::Publish(_)
            | Self::Config(_) => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound(_) | Self::Unreachable { .. } => ErrorCategory::Selection,
            Self::Probe(_) => ErrorCategory::Network,
            Self::Publish(PublishError::InvalidConfig(_)) => ErrorCategory::Config,
            Self::Publish(_) => ErrorCategory::Network,
            Self::Store(_) => ErrorCategory::Storage,
            Self::Bookmark(_) => ErrorCategory::Catalog,
            Self::Config(_) => ErrorCategory::Config,
        }
    }
}

/// Find the crate error behind an `anyhow` chain, if there is one
pub fn find_in_chain(err: &anyhow::Error) -> Option<&Error> {
    err.chain().find_map(|cause| cause.downcast_ref::<Error>())
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the rotation engine
//!
//! This module defines the domain error types used throughout the crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while probing a candidate URL
///
/// These never escape [`crate::liveness::Prober::probe`]; they are
/// logged and folded into a failed probe.
#[derive(Error, Debug)]
pub enum ProbeError {
    /// HTTP transport error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status code
    #[error("Unexpected status: {0}")]
    Status(u16),

    /// Probe deadline expired
    #[error("Probe timed out after {0} ms")]
    Timeout(u64),

    /// URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ProbeError {
    /// Whether a later probe could plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) => true,
            Self::Status(code) => *code >= 500,
            Self::InvalidUrl(_) => false,
        }
    }
}

/// Errors that can occur while reading or writing persisted state
#[derive(Error, Debug)]
pub enum StoreError {
    /// File could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File could not be written or replaced
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not the expected JSON shape
    #[error("Malformed JSON in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be serialized
    #[error("Failed to serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors raised by bookmark catalog edits
#[derive(Error, Debug, PartialEq, Eq)]
pub enum BookmarkError {
    /// No entry with this id
    #[error("Bookmark {0} not found")]
    NotFound(String),

    /// Required field is empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Title or URL collides with existing entries
    #[error("Duplicate bookmark: {}", .0.join(", "))]
    Duplicate(Vec<String>),

    /// Edit request changed nothing
    #[error("No changes")]
    Unchanged,
}

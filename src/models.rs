//! Core data structures shared across the rotation engine
//!
//! - [`CandidateEntry`] - a bookmarked site eligible for rotation
//! - [`StatusRecord`] - long-term reliability counters for one entry
//! - [`SiteStatus`] - active/inactive flag persisted in `status.json`

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Consecutive probe failures after which an entry is marked inactive
pub const MAX_FAILURE_COUNT: u32 = 5;

/// Default `kind` tag for web bookmark events
pub const DEFAULT_BOOKMARK_KIND: u32 = 39701;

/// Candidate set keyed by stable entry id
pub type Catalog = BTreeMap<String, CandidateEntry>;

/// Status set keyed by entry id
pub type StatusMap = BTreeMap<String, StatusRecord>;

/// A bookmarked site
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEntry {
    /// Free-form category label (may be empty)
    #[serde(default)]
    pub category: String,

    /// Display title
    pub title: String,

    /// Target URL
    pub url: String,

    /// Description text, may contain newlines
    #[serde(default)]
    pub description: String,

    /// Optional integer tag carried into the published note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<u32>,
}

impl CandidateEntry {
    /// Create an entry with empty category and description
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Default::default()
        }
    }

    /// Builder: set category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Builder: set description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builder: set kind
    pub fn with_kind(mut self, kind: u32) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Human-readable payload handed to the publisher
    ///
    /// Title, URL and description on their own lines, followed by a
    /// `kind:` line when a kind is set and a `category:` line when the
    /// category is non-empty.
    pub fn content(&self) -> String {
        let mut lines = vec![
            self.title.clone(),
            self.url.clone(),
            self.description.clone(),
        ];

        if let Some(kind) = self.kind {
            lines.push(format!("kind: {kind}"));
        }

        if !self.category.is_empty() {
            lines.push(format!("category: {}", self.category));
        }

        lines.join("\n")
    }
}

/// Persisted liveness flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    /// Eligible for rotation
    #[default]
    Active,
    /// Failed too many consecutive probes
    Inactive,
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}

/// Reliability counters for one entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRecord {
    #[serde(default)]
    pub status: SiteStatus,

    #[serde(default)]
    pub failure_count: u32,
}

impl StatusRecord {
    /// Record with `status == inactive` and the given count
    pub fn inactive(failure_count: u32) -> Self {
        Self {
            status: SiteStatus::Inactive,
            failure_count,
        }
    }

    /// Whether this is the pristine `{active, 0}` record
    pub fn is_healthy(&self) -> bool {
        self.status == SiteStatus::Active && self.failure_count == 0
    }

    /// Whether the entry is excluded from automatic rotation
    pub fn is_inactive(&self) -> bool {
        self.status == SiteStatus::Inactive
    }

    /// Apply one probe outcome, returning the next record and whether it differs
    ///
    /// A success always yields `{active, 0}`. A failure increments the
    /// count (saturating at `max_failures`) and flips the status to
    /// inactive once the threshold is reached; failures always report a
    /// change.
    pub fn after_probe(self, succeeded: bool, max_failures: u32) -> (Self, bool) {
        if succeeded {
            if self.is_healthy() {
                return (self, false);
            }
            return (Self::default(), true);
        }

        let failure_count = self.failure_count.saturating_add(1).min(max_failures);
        let status = if failure_count >= max_failures {
            SiteStatus::Inactive
        } else {
            self.status
        };

        (
            Self {
                status,
                failure_count,
            },
            true,
        )
    }
}

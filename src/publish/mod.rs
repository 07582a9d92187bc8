//! Hand-off of the selected bookmark to an external publisher
//!
//! Signing and relay broadcast happen outside this crate. A run produces a
//! [`NoteDraft`] and passes it to a [`Publisher`]:
//!
//! - [`StdoutPublisher`] - prints the draft as JSON for a downstream signer
//! - [`webhook::WebhookPublisher`] - POSTs the draft to an HTTP endpoint

pub mod webhook;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{PublishConfig, PublishMode};
use crate::models::CandidateEntry;

pub use webhook::WebhookPublisher;

/// Result type for publish operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Errors that can occur while handing off a draft
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("Publisher rejected draft with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// Invalid publisher configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Unsigned note ready for an external signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    /// Unique id of this hand-off
    pub draft_id: Uuid,

    /// Catalog key of the selected bookmark
    pub key: String,

    /// Event kind
    pub kind: u32,

    /// Unix timestamp in seconds
    pub created_at: i64,

    /// Event tags
    pub tags: Vec<Vec<String>>,

    /// Note body
    pub content: String,
}

impl NoteDraft {
    /// Build a draft for the selected entry
    pub fn from_entry(key: &str, entry: &CandidateEntry, kind: u32) -> Self {
        Self {
            draft_id: Uuid::new_v4(),
            key: key.to_string(),
            kind,
            created_at: Utc::now().timestamp(),
            tags: Vec::new(),
            content: entry.content(),
        }
    }
}

/// Destination for note drafts
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publisher name for logs
    fn name(&self) -> &str;

    /// Hand off a draft
    async fn publish(&self, draft: &NoteDraft) -> PublishResult<()>;
}

/// Prints drafts as pretty JSON on stdout
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutPublisher;

#[async_trait]
impl Publisher for StdoutPublisher {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn publish(&self, draft: &NoteDraft) -> PublishResult<()> {
        let json = serde_json::to_string_pretty(draft)?;
        println!("{json}");
        Ok(())
    }
}

/// Build the configured publisher, or `None` when publishing is disabled
///
/// # Errors
///
/// Returns `PublishError::InvalidConfig` if webhook mode lacks a URL
pub fn from_config(config: &PublishConfig) -> PublishResult<Option<Box<dyn Publisher>>> {
    match config.mode {
        PublishMode::None => Ok(None),
        PublishMode::Stdout => Ok(Some(Box::new(StdoutPublisher))),
        PublishMode::Webhook => {
            let url = config.webhook_url.as_deref().ok_or_else(|| {
                PublishError::InvalidConfig("webhook mode requires webhook_url".to_string())
            })?;
            let mut publisher = WebhookPublisher::new(url)?;
            if let Some(token) = &config.auth_token {
                publisher = publisher.with_auth_token(token);
            }
            Ok(Some(Box::new(publisher)))
        }
    }
}

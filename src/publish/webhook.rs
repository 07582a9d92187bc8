//! Webhook publisher
//!
//! Sends note drafts as JSON via HTTP POST. The draft id doubles as an
//! `Idempotency-Key` header so a retried delivery can be deduplicated by
//! the receiver.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use super::{NoteDraft, PublishError, PublishResult, Publisher};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_RETRIES: u32 = 2;

/// Webhook publisher
pub struct WebhookPublisher {
    url: String,
    auth_token: Option<String>,
    max_retries: u32,
    base_delay_ms: u64,
    client: Client,
}

impl WebhookPublisher {
    /// Create a publisher for `url`
    ///
    /// # Errors
    ///
    /// Returns `PublishError::InvalidConfig` for a non-HTTP URL and
    /// `PublishError::Http` if the client cannot be built
    pub fn new(url: impl Into<String>) -> PublishResult<Self> {
        let url = url.into();
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PublishError::InvalidConfig(
                "Webhook URL must start with http:// or https://".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            url,
            auth_token: None,
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: 1000,
            client,
        })
    }

    /// Send a bearer token with every request
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Override retry count and base backoff delay
    pub fn with_retries(mut self, max_retries: u32, base_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.base_delay_ms = base_delay_ms;
        self
    }

    /// Endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }

    async fn send_with_retry(&self, draft: &NoteDraft) -> PublishResult<()> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay_ms * 2_u64.pow(attempt - 1);
                tokio::time::sleep(Duration::from_millis(delay)).await;
                tracing::debug!(
                    attempt = attempt + 1,
                    max = self.max_retries + 1,
                    "Retrying webhook delivery"
                );
            }

            let mut request = self
                .client
                .post(&self.url)
                .header("Idempotency-Key", draft.draft_id.to_string());

            if let Some(token) = &self.auth_token {
                request = request.bearer_auth(token);
            }

            match request.json(draft).send().await {
                Ok(response) if response.status().is_success() => {
                    tracing::info!(
                        url = %self.url,
                        status = %response.status(),
                        "Webhook delivered"
                    );
                    return Ok(());
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unable to read response body".to_string());

                    last_error = Some(PublishError::Rejected {
                        status: status.as_u16(),
                        body,
                    });

                    // client errors will not go away on retry
                    if status.is_client_error() {
                        break;
                    }
                }
                Err(e) => {
                    last_error = Some(PublishError::Http(e));
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            PublishError::InvalidConfig("webhook retries exhausted".to_string())
        }))
    }
}

#[async_trait]
impl Publisher for WebhookPublisher {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn publish(&self, draft: &NoteDraft) -> PublishResult<()> {
        self.send_with_retry(draft).await.inspect_err(|e| {
            tracing::error!(url = %self.url, error = %e, "Failed to deliver webhook");
        })
    }
}

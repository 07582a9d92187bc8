//! HTTP liveness checker
//!
//! Confirms that a candidate URL still resolves to something, using:
//! - A HEAD request first, to avoid downloading the page
//! - A single GET fallback when the server rejects HEAD with 405
//! - One deadline covering both requests
//!
//! Servers that answer 403 or 429 are counted as reachable: the page
//! exists, the server just refuses automated clients.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use super::policy::{ProbePolicy, Verdict};
use super::Prober;
use crate::config::ProbeConfig;
use crate::utils::error::ProbeError;

/// Probe deadline in milliseconds
pub const TIMEOUT_MS: u64 = 8000;

/// How a HEAD response status is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadOutcome {
    /// 2xx
    Reachable,
    /// 403 / 429: the resource exists but the client is refused
    Blocked,
    /// 405: HEAD not allowed, retry with GET
    RetryWithGet,
    /// Anything else
    Unreachable,
}

impl HeadOutcome {
    /// Classify a HEAD response status
    pub fn classify(status: StatusCode) -> Self {
        match status {
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => Self::Blocked,
            StatusCode::METHOD_NOT_ALLOWED => Self::RetryWithGet,
            s if s.is_success() => Self::Reachable,
            _ => Self::Unreachable,
        }
    }
}

/// Why a probe counted as a success
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeSuccess {
    /// Matched a short-circuit rule, no request sent
    Exempt(Verdict),
    /// Success status from HEAD or the GET fallback
    Reachable(u16),
    /// Refused with 403/429
    Blocked(u16),
}

/// Network liveness checker
pub struct LivenessChecker {
    /// HTTP client, without a client-level timeout
    client: Client,

    /// Short-circuit rules
    policy: ProbePolicy,

    /// Budget shared by HEAD and the GET fallback
    timeout: Duration,
}

impl LivenessChecker {
    /// Create a checker with the default timeout and user agent
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Http` if the HTTP client cannot be created
    pub fn new(policy: ProbePolicy) -> Result<Self, ProbeError> {
        Self::with_config(
            policy,
            Duration::from_millis(TIMEOUT_MS),
            &format!("iroiro/{}", env!("CARGO_PKG_VERSION")),
        )
    }

    /// Create a checker with a custom timeout and user agent
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Http` if the HTTP client cannot be created
    pub fn with_config(
        policy: ProbePolicy,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ProbeError> {
        let client = Client::builder().user_agent(user_agent).gzip(true).build()?;

        Ok(Self {
            client,
            policy,
            timeout,
        })
    }

    /// Create a checker from the `[probe]` config section
    ///
    /// # Errors
    ///
    /// Returns `ProbeError::Http` if the HTTP client cannot be created
    pub fn from_config(config: &ProbeConfig) -> Result<Self, ProbeError> {
        Self::with_config(
            ProbePolicy::from_config(config),
            Duration::from_millis(config.timeout_ms),
            &config.user_agent,
        )
    }

    /// Probe budget
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check a URL and report why it passed or failed
    ///
    /// # Errors
    ///
    /// - `ProbeError::InvalidUrl` if the URL cannot be parsed
    /// - `ProbeError::Timeout` if the deadline expires
    /// - `ProbeError::Status` on a failing status code
    /// - `ProbeError::Http` on transport faults
    pub async fn check(&self, url: &str) -> Result<ProbeSuccess, ProbeError> {
        if let Some(verdict) = self.policy.evaluate(url) {
            return Ok(ProbeSuccess::Exempt(verdict));
        }

        let parsed = Url::parse(url).map_err(|_| ProbeError::InvalidUrl(url.to_string()))?;

        // Dropping the request future on expiry cancels the in-flight request
        let deadline = Instant::now() + self.timeout;
        match tokio::time::timeout_at(deadline, self.request(parsed)).await {
            Ok(result) => result,
            Err(_) => Err(ProbeError::Timeout(self.timeout.as_millis() as u64)),
        }
    }

    async fn request(&self, url: Url) -> Result<ProbeSuccess, ProbeError> {
        let response = self.client.head(url.clone()).send().await?;
        let status = response.status();

        match HeadOutcome::classify(status) {
            HeadOutcome::Reachable => Ok(ProbeSuccess::Reachable(status.as_u16())),
            HeadOutcome::Blocked => Ok(ProbeSuccess::Blocked(status.as_u16())),
            HeadOutcome::Unreachable => Err(ProbeError::Status(status.as_u16())),
            HeadOutcome::RetryWithGet => {
                tracing::debug!(url = %url, "HEAD not allowed, retrying with GET");
                let response = self.client.get(url).send().await?;
                let status = response.status();
                if status.is_success() {
                    Ok(ProbeSuccess::Reachable(status.as_u16()))
                } else {
                    Err(ProbeError::Status(status.as_u16()))
                }
            }
        }
    }
}

#[async_trait]
impl Prober for LivenessChecker {
    async fn probe(&self, url: &str) -> bool {
        match self.check(url).await {
            Ok(outcome) => {
                tracing::debug!(url = %url, outcome = ?outcome, "Probe succeeded");
                true
            }
            Err(e) => {
                tracing::warn!(
                    url = %url,
                    error = %e,
                    recoverable = e.is_recoverable(),
                    "Probe failed"
                );
                false
            }
        }
    }
}

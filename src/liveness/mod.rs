//! Liveness probing for candidate URLs
//!
//! - [`policy`] - ordered short-circuit rules (exempt hosts, out-of-band schemes)
//! - [`checker`] - HTTP HEAD/GET probe with a single deadline

pub mod checker;
pub mod policy;

use async_trait::async_trait;

pub use checker::{HeadOutcome, LivenessChecker, ProbeSuccess, TIMEOUT_MS};
pub use policy::{ProbePolicy, ProbeRule, Verdict};

/// Anything that can tell whether a URL is reachable
///
/// Implementations absorb every fault: a timeout or transport error is
/// simply `false`.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe a URL once
    async fn probe(&self, url: &str) -> bool;
}

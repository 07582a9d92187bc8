//! Short-circuit rules evaluated before any network probe
//!
//! Rules are checked in insertion order and the first match wins. Exempt
//! hosts are always registered ahead of out-of-band schemes.

use crate::config::ProbeConfig;
use crate::utils::{extract_host, extract_scheme};

/// Outcome of a matching rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Not subject to probing at all; the selector accepts the candidate
    /// without touching its status record
    Bypass,
    /// Counts as a successful probe, but no request is sent
    Reachable,
}

/// A single predicate → verdict rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeRule {
    /// Host known to answer automated probes with misleading status codes
    ExemptHost(String),
    /// URL scheme that is never probed over HTTP (e.g. `nostr`)
    OutOfBandScheme(String),
}

impl ProbeRule {
    /// Whether this rule applies to `url`
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::ExemptHost(host) => {
                extract_host(url).is_some_and(|h| h.eq_ignore_ascii_case(host))
            }
            Self::OutOfBandScheme(scheme) => {
                extract_scheme(url).is_some_and(|s| s.eq_ignore_ascii_case(scheme))
            }
        }
    }

    /// Verdict produced on a match
    pub fn verdict(&self) -> Verdict {
        match self {
            Self::ExemptHost(_) => Verdict::Reachable,
            Self::OutOfBandScheme(_) => Verdict::Bypass,
        }
    }
}

/// Ordered rule list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbePolicy {
    rules: Vec<ProbeRule>,
}

impl ProbePolicy {
    /// Empty policy: every URL is probed
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the policy from configuration
    pub fn from_config(config: &ProbeConfig) -> Self {
        let mut policy = Self::new();
        for host in &config.exempt_hosts {
            policy = policy.with_rule(ProbeRule::ExemptHost(host.to_ascii_lowercase()));
        }
        for scheme in &config.out_of_band_schemes {
            policy = policy.with_rule(ProbeRule::OutOfBandScheme(scheme.to_ascii_lowercase()));
        }
        policy
    }

    /// Append a rule
    pub fn with_rule(mut self, rule: ProbeRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// First matching verdict, if any
    pub fn evaluate(&self, url: &str) -> Option<Verdict> {
        self.rules
            .iter()
            .find(|rule| rule.matches(url))
            .map(ProbeRule::verdict)
    }

    /// Whether the selector should skip probing `url` entirely
    pub fn is_out_of_band(&self, url: &str) -> bool {
        self.evaluate(url) == Some(Verdict::Bypass)
    }

    /// Registered rules in evaluation order
    pub fn rules(&self) -> &[ProbeRule] {
        &self.rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ProbePolicy {
        ProbePolicy::new()
            .with_rule(ProbeRule::ExemptHost("x.com".into()))
            .with_rule(ProbeRule::OutOfBandScheme("nostr".into()))
    }

    #[test]
    fn test_exempt_host_is_reachable() {
        assert_eq!(
            policy().evaluate("https://x.com/someone"),
            Some(Verdict::Reachable)
        );
        assert_eq!(
            policy().evaluate("https://X.COM/someone"),
            Some(Verdict::Reachable)
        );
    }

    #[test]
    fn test_subdomain_is_not_exempt() {
        assert_eq!(policy().evaluate("https://api.x.com/"), None);
    }

    #[test]
    fn test_out_of_band_scheme_bypasses() {
        let policy = policy();
        assert_eq!(policy.evaluate("nostr:abc"), Some(Verdict::Bypass));
        assert!(policy.is_out_of_band("nostr:npub1xyz"));
        assert!(!policy.is_out_of_band("https://x.com/"));
    }

    #[test]
    fn test_unmatched_url() {
        assert_eq!(policy().evaluate("https://example.com/"), None);
        assert_eq!(policy().evaluate("garbage"), None);
    }

    #[test]
    fn test_from_config_orders_hosts_first() {
        let config = ProbeConfig {
            exempt_hosts: vec!["Twitter.com".into()],
            out_of_band_schemes: vec!["nostr".into()],
            ..ProbeConfig::default()
        };
        let policy = ProbePolicy::from_config(&config);
        assert_eq!(
            policy.rules(),
            &[
                ProbeRule::ExemptHost("twitter.com".into()),
                ProbeRule::OutOfBandScheme("nostr".into()),
            ]
        );
    }
}

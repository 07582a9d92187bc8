//! Common utilities and helper functions
//!
//! This module provides shared utilities used across the application.

pub mod error;

use url::Url;

/// Extract the lowercase host from a URL, if it has one
pub fn extract_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(|s| s.to_ascii_lowercase())
}

/// Extract the scheme from a URL (`nostr:abc` → `nostr`)
pub fn extract_scheme(url: &str) -> Option<String> {
    Url::parse(url).ok().map(|u| u.scheme().to_string())
}

/// Turn literal `\n` sequences typed on a command line into newlines
pub fn unescape_newlines(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Truncate text to a maximum number of characters
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{truncated}...")
    }
}

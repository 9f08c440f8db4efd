//! URL gate: static rules deciding whether a URL is worth visiting at all,
//! before any rendering or LLM spend.

use std::time::Duration;

/// Path/keyword tokens marking informational, legal, navigational, or
/// community pages. Case-insensitive substring match.
///
/// Deliberately does not carry a bare `about` token: self-description pages
/// are still visited and left to the phrase filter, which sees the rendered
/// text instead of guessing from the path.
const EXCLUDED_URL_TOKENS: &[&str] = &[
    "intro",
    "greeting",
    "history",
    "privacy",
    "terms",
    "login",
    "logout",
    "qna",
    "faq",
    "contact",
    "notice",
    "news",
    "community",
    "gallery",
    "forum",
    "bbs",
    "comment",
    "photo",
    "webzine",
    "video",
    "popup",
    "/board/",
];

/// Deny-list gate over URLs.
///
/// Pure, no I/O. Evaluated both before enqueueing a discovered link and
/// before visiting a dequeued one; the token list may grow between releases
/// and queued URLs predate the change.
#[derive(Debug, Clone)]
pub struct UrlGate {
    tokens: Vec<String>,
}

impl Default for UrlGate {
    fn default() -> Self {
        Self::new()
    }
}

impl UrlGate {
    /// Gate with the built-in token list.
    pub fn new() -> Self {
        Self {
            tokens: EXCLUDED_URL_TOKENS.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// Gate with a custom token list.
    pub fn with_tokens(tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tokens: tokens.into_iter().map(|t| t.into().to_lowercase()).collect(),
        }
    }

    /// Add a token to the deny-list.
    pub fn block_token(mut self, token: impl Into<String>) -> Self {
        self.tokens.push(token.into().to_lowercase());
        self
    }

    /// Whether the URL matches any deny-list token.
    pub fn is_excluded(&self, url: &str) -> bool {
        let lower = url.to_lowercase();
        self.tokens.iter().any(|t| lower.contains(t.as_str()))
    }
}

/// Lightweight liveness probe used to prune dead links before spending a
/// full render cycle.
#[derive(Debug, Clone)]
pub struct ReachabilityProbe {
    client: reqwest::Client,
}

impl ReachabilityProbe {
    /// Probe with the default short timeout.
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(2))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        // Client build can only fail on TLS/proxy settings we never pass.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Whether the URL answers a HEAD request with a success status.
    ///
    /// Timeouts, connection errors, and non-2xx statuses all mean "not
    /// reachable"; never an error.
    pub async fn is_reachable(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(url = %url, error = %e, "reachability probe failed");
                false
            }
        }
    }
}

impl Default for ReachabilityProbe {
    fn default() -> Self {
        Self::new()
    }
}

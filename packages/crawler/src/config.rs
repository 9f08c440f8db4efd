//! Configuration for crawl and render operations.

use std::time::Duration;

/// Configuration for one crawl invocation.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Hard cap on pages visited. Exhaustion is a normal terminal state
    /// reported on the crawl result, not an error.
    pub max_pages: usize,

    /// Optional wall-clock deadline for the whole walk.
    pub deadline: Option<Duration>,

    /// Delay budget between page visits, in milliseconds. Enforced through
    /// one shared rate limiter so the budget stays global if workers are
    /// ever added.
    pub delay_ms: u64,

    /// Probe links with a HEAD request before rendering them.
    pub probe_reachability: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: 60,
            deadline: None,
            delay_ms: 300,
            probe_reachability: false,
        }
    }
}

impl CrawlConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hard page cap.
    pub fn with_max_pages(mut self, max: usize) -> Self {
        self.max_pages = max;
        self
    }

    /// Set a wall-clock deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Set the inter-request delay.
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Enable the HEAD reachability probe for dequeued URLs.
    pub fn with_reachability_probe(mut self) -> Self {
        self.probe_reachability = true;
        self
    }
}

/// Configuration for the browser-backed page renderer.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Per-navigation timeout. The same budget applies to the relaxed
    /// fallback attempt.
    pub nav_timeout: Duration,

    /// Settle time after the load event, to let late XHR content land.
    pub settle: Duration,

    /// Minimum stripped text length for a content-container candidate to be
    /// accepted.
    pub min_content_len: usize,

    /// Maximum excerpt length in characters.
    pub max_excerpt_len: usize,

    /// User agent sent by the browser.
    pub user_agent: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            nav_timeout: Duration::from_secs(15),
            settle: Duration::from_millis(1500),
            min_content_len: 100,
            max_excerpt_len: 1500,
            user_agent: "WelfareBeaconBot/1.1".to_string(),
        }
    }
}

impl RenderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_nav_timeout(mut self, timeout: Duration) -> Self {
        self.nav_timeout = timeout;
        self
    }

    pub fn with_max_excerpt_len(mut self, len: usize) -> Self {
        self.max_excerpt_len = len;
        self
    }

    pub fn with_min_content_len(mut self, len: usize) -> Self {
        self.min_content_len = len;
        self
    }

    pub fn with_user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }
}

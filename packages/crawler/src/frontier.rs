//! Breadth-first frontier walker.
//!
//! Owns the visited set, the pending queue, the depth bound, and
//! same-origin link discovery. One logical worker: a page is fully
//! processed (rendered, filtered, children queued) before the next is
//! dequeued.

use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use tokio::time::Instant;
use url::Url;

use crate::config::CrawlConfig;
use crate::error::CrawlError;
use crate::gate::{ReachabilityProbe, UrlGate};
use crate::render::Renderer;
use crate::types::{CrawlReport, CrawlTarget, PageRecord, StopReason};

type DirectRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Breadth-first crawler over one site.
pub struct FrontierWalker<R: Renderer> {
    renderer: R,
    gate: UrlGate,
    probe: ReachabilityProbe,
    config: CrawlConfig,
}

impl<R: Renderer> FrontierWalker<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            gate: UrlGate::new(),
            probe: ReachabilityProbe::new(),
            config: CrawlConfig::default(),
        }
    }

    pub fn with_gate(mut self, gate: UrlGate) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_config(mut self, config: CrawlConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_probe(mut self, probe: ReachabilityProbe) -> Self {
        self.probe = probe;
        self
    }

    /// Give the renderer back so the caller can release it (browser
    /// renderers own an OS process that must be closed on every exit path).
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Walk the site breadth-first from `seed_url` down to `max_depth`.
    ///
    /// Always returns a best-effort report: per-page failures become error
    /// records, and cap/deadline exhaustion is a reported terminal state.
    pub async fn crawl(&self, seed_url: &str, max_depth: usize) -> Result<CrawlReport, CrawlError> {
        let seed = Url::parse(seed_url).map_err(|source| CrawlError::InvalidSeed {
            url: seed_url.to_string(),
            source,
        })?;

        let limiter = delay_limiter(self.config.delay_ms);
        let started = Instant::now();

        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<CrawlTarget> = VecDeque::new();
        let mut records: Vec<PageRecord> = Vec::new();
        let mut truncated: Option<StopReason> = None;

        queue.push_back(CrawlTarget::new(normalize(seed.clone()), 0));

        tracing::info!(
            seed = %seed,
            max_depth = max_depth,
            max_pages = self.config.max_pages,
            "starting crawl"
        );

        while let Some(target) = queue.pop_front() {
            if visited.contains(&target.url) || target.depth > max_depth {
                continue;
            }

            if records.len() >= self.config.max_pages {
                tracing::info!(pages = records.len(), "page cap reached, stopping");
                truncated = Some(StopReason::PageCap);
                break;
            }
            if let Some(deadline) = self.config.deadline {
                if started.elapsed() >= deadline {
                    tracing::info!(elapsed = ?started.elapsed(), "deadline reached, stopping");
                    truncated = Some(StopReason::Deadline);
                    break;
                }
            }

            visited.insert(target.url.clone());

            // Gate again at dequeue: the deny-list may have grown since the
            // link was queued.
            if self.gate.is_excluded(&target.url) {
                tracing::debug!(url = %target.url, "excluded by URL gate");
                continue;
            }

            if self.config.probe_reachability && !self.probe.is_reachable(&target.url).await {
                tracing::debug!(url = %target.url, "unreachable, skipping");
                continue;
            }

            match self.renderer.render(&target.url).await {
                Ok(page) => {
                    for link in &page.links {
                        if let Some(normalized) = self.eligible_child(link, &seed, &visited) {
                            queue.push_back(CrawlTarget::new(normalized, target.depth + 1));
                        }
                    }
                    records.push(PageRecord::rendered(target.url, page.title, page.excerpt));
                }
                Err(e) => {
                    tracing::warn!(url = %target.url, error = %e, "render failed");
                    records.push(PageRecord::failed(target.url, e.to_string()));
                }
            }

            if let Some(limiter) = &limiter {
                limiter.until_ready().await;
            }
        }

        tracing::info!(
            pages = records.len(),
            discovered = visited.len(),
            truncated = ?truncated,
            "crawl finished"
        );

        Ok(CrawlReport::new(records, truncated))
    }

    /// Normalize a discovered link and decide whether it may be queued:
    /// same origin as the seed, not yet visited, not gate-excluded.
    fn eligible_child(&self, link: &str, seed: &Url, visited: &HashSet<String>) -> Option<String> {
        let parsed = Url::parse(link).ok()?;
        if !same_origin(&parsed, seed) {
            return None;
        }
        let normalized = normalize(parsed);
        if visited.contains(&normalized) || self.gate.is_excluded(&normalized) {
            return None;
        }
        Some(normalized)
    }
}

/// Strip the fragment; everything else is kept as-is.
fn normalize(mut url: Url) -> String {
    url.set_fragment(None);
    url.to_string()
}

/// Scheme + host + port must match the seed exactly.
fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}

fn delay_limiter(delay_ms: u64) -> Option<DirectRateLimiter> {
    let period = Duration::from_millis(delay_ms);
    if period.is_zero() {
        return None;
    }
    Quota::with_period(period).map(|quota| RateLimiter::direct(quota.allow_burst(nonzero!(1u32))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockRenderer;

    fn fast_config() -> CrawlConfig {
        CrawlConfig::new().with_delay_ms(0)
    }

    fn make_walker(renderer: MockRenderer) -> FrontierWalker<MockRenderer> {
        FrontierWalker::new(renderer).with_config(fast_config())
    }

    #[tokio::test]
    async fn test_depth_bound_respected() {
        let renderer = MockRenderer::new()
            .with_page(
                "https://example.org/",
                "Home",
                "Welcome to the scholarship foundation programs overview page",
                ["https://example.org/apply"],
            )
            .with_page(
                "https://example.org/apply",
                "Apply",
                "scholarship application period: March 1-31",
                ["https://example.org/apply/details"],
            )
            .with_page(
                "https://example.org/apply/details",
                "Details",
                "full eligibility details for the scholarship program here",
                Vec::<String>::new(),
            );

        let walker = make_walker(renderer);
        let report = walker.crawl("https://example.org/", 1).await.unwrap();

        let urls: Vec<_> = report.data.iter().map(|r| r.url.as_str()).collect();
        assert!(urls.contains(&"https://example.org/"));
        assert!(urls.contains(&"https://example.org/apply"));
        assert!(!urls.contains(&"https://example.org/apply/details"));
    }

    #[tokio::test]
    async fn test_no_duplicate_visits() {
        // Both pages link back to each other and to themselves.
        let renderer = MockRenderer::new()
            .with_page(
                "https://example.org/",
                "Home",
                "Welcome to the scholarship foundation programs overview page",
                ["https://example.org/apply", "https://example.org/"],
            )
            .with_page(
                "https://example.org/apply",
                "Apply",
                "scholarship application period: March 1-31",
                ["https://example.org/", "https://example.org/apply"],
            );

        let renderer_calls = {
            let walker = make_walker(renderer);
            let report = walker.crawl("https://example.org/", 3).await.unwrap();
            assert_eq!(report.count, 2);
            walker.renderer.rendered()
        };

        let unique: HashSet<_> = renderer_calls.iter().collect();
        assert_eq!(renderer_calls.len(), unique.len());
    }

    #[tokio::test]
    async fn test_cross_origin_links_never_followed() {
        let renderer = MockRenderer::new().with_page(
            "https://example.org/",
            "Home",
            "Welcome to the scholarship foundation programs overview page",
            [
                "https://other.org/apply",
                "http://example.org/apply",
                "https://example.org/apply",
            ],
        )
        .with_page(
            "https://example.org/apply",
            "Apply",
            "scholarship application period: March 1-31",
            Vec::<String>::new(),
        );

        let walker = make_walker(renderer);
        let report = walker.crawl("https://example.org/", 2).await.unwrap();

        let urls: Vec<_> = report.data.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["https://example.org/", "https://example.org/apply"]);
    }

    #[tokio::test]
    async fn test_fragments_stripped_before_dedup() {
        let renderer = MockRenderer::new()
            .with_page(
                "https://example.org/",
                "Home",
                "Welcome to the scholarship foundation programs overview page",
                [
                    "https://example.org/apply#section-1",
                    "https://example.org/apply#section-2",
                ],
            )
            .with_page(
                "https://example.org/apply",
                "Apply",
                "scholarship application period: March 1-31",
                Vec::<String>::new(),
            );

        let walker = make_walker(renderer);
        let report = walker.crawl("https://example.org/", 1).await.unwrap();
        assert_eq!(report.count, 2);
    }

    #[tokio::test]
    async fn test_render_failure_becomes_error_record() {
        let renderer = MockRenderer::new()
            .with_page(
                "https://example.org/",
                "Home",
                "Welcome to the scholarship foundation programs overview page",
                ["https://example.org/apply", "https://example.org/broken"],
            )
            .with_page(
                "https://example.org/apply",
                "Apply",
                "scholarship application period: March 1-31",
                Vec::<String>::new(),
            )
            .with_failure("https://example.org/broken", "connection reset");

        let walker = make_walker(renderer);
        let report = walker.crawl("https://example.org/", 1).await.unwrap();

        assert_eq!(report.count, 3);
        let broken = report
            .data
            .iter()
            .find(|r| r.url == "https://example.org/broken")
            .unwrap();
        assert!(broken.error.as_deref().unwrap().contains("connection reset"));
        assert!(broken.excerpt.is_empty());
    }

    #[tokio::test]
    async fn test_gate_excluded_links_not_visited() {
        let renderer = MockRenderer::new().with_page(
            "https://example.org/",
            "Home",
            "Welcome to the scholarship foundation programs overview page",
            ["https://example.org/privacy", "https://example.org/apply"],
        )
        .with_page(
            "https://example.org/apply",
            "Apply",
            "scholarship application period: March 1-31",
            Vec::<String>::new(),
        );

        let walker = make_walker(renderer);
        let report = walker.crawl("https://example.org/", 1).await.unwrap();

        assert!(report.data.iter().all(|r| r.url != "https://example.org/privacy"));
    }

    #[tokio::test]
    async fn test_page_cap_is_reported_terminal_state() {
        let renderer = MockRenderer::new()
            .with_page(
                "https://example.org/",
                "Home",
                "Welcome to the scholarship foundation programs overview page",
                ["https://example.org/a", "https://example.org/b"],
            )
            .with_page(
                "https://example.org/a",
                "A",
                "scholarship application period: March 1-31",
                Vec::<String>::new(),
            )
            .with_page(
                "https://example.org/b",
                "B",
                "another welfare program accepting applications this spring",
                Vec::<String>::new(),
            );

        let config = fast_config().with_max_pages(2);
        let walker = FrontierWalker::new(renderer).with_config(config);
        let report = walker.crawl("https://example.org/", 2).await.unwrap();

        assert_eq!(report.count, 2);
        assert_eq!(report.truncated, Some(StopReason::PageCap));
    }

    #[tokio::test]
    async fn test_invalid_seed_is_an_error() {
        let walker = make_walker(MockRenderer::new());
        assert!(walker.crawl("not a url", 1).await.is_err());
    }

    #[test]
    fn test_same_origin() {
        let a = Url::parse("https://example.org/x").unwrap();
        assert!(same_origin(&Url::parse("https://example.org/y#z").unwrap(), &a));
        assert!(!same_origin(&Url::parse("http://example.org/y").unwrap(), &a));
        assert!(!same_origin(&Url::parse("https://sub.example.org/").unwrap(), &a));
        assert!(!same_origin(&Url::parse("https://example.org:8443/").unwrap(), &a));
    }
}

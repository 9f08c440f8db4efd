//! Headless-browser renderer built on chromiumoxide.
//!
//! Foundation sites widely render announcements client-side, so a plain
//! HTTP fetch misses content; all text extraction here happens inside the
//! page after stripping non-content regions.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::boilerplate::BoilerplateFilter;
use crate::config::RenderConfig;
use crate::error::{CrawlError, RenderError};
use crate::render::{compose_excerpt, Renderer, RenderedPage};

/// Content-container selectors probed in priority order. Landmark elements
/// first, then common CMS content classes.
const CONTENT_SELECTORS: &[&str] = &[
    "main",
    "article",
    "#content",
    ".content",
    ".post",
    ".program",
    ".board-view",
    "#container",
];

const STRIP_CHROME_JS: &str = r#"() => {
    document.querySelectorAll("header, footer, script, style, noscript").forEach(el => el.remove());
    return true;
}"#;

const BODY_TEXT_JS: &str = r#"() => {
    const body = document.body;
    if (!body) return "";
    body.querySelectorAll("nav, aside, .menu, .sidebar").forEach(el => el.remove());
    return body.innerText || "";
}"#;

const COLLECT_LINKS_JS: &str =
    r#"() => Array.from(document.querySelectorAll("a[href]")).map(a => a.href)"#;

fn candidate_text_js(selector: &str) -> String {
    format!(
        r#"() => {{
    const node = document.querySelector("{selector}");
    if (!node) return "";
    node.querySelectorAll("nav, aside, .menu, .sidebar").forEach(el => el.remove());
    return node.innerText || "";
}}"#
    )
}

/// Renderer that owns one headless Chromium instance.
///
/// Owned by a single crawl invocation; call [`BrowserRenderer::close`] when
/// the crawl ends so the OS-level browser process is released.
pub struct BrowserRenderer {
    browser: Browser,
    handler_task: JoinHandle<()>,
    filter: BoilerplateFilter,
    config: RenderConfig,
}

impl BrowserRenderer {
    /// Launch a headless browser with the given render configuration.
    pub async fn launch(config: RenderConfig) -> Result<Self, CrawlError> {
        let browser_config = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg(format!("--user-agent={}", config.user_agent))
            .build()
            .map_err(CrawlError::Browser)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| CrawlError::Browser(e.to_string()))?;

        let handler_task = tokio::spawn(async move { while handler.next().await.is_some() {} });

        Ok(Self {
            browser,
            handler_task,
            filter: BoilerplateFilter::new(),
            config,
        })
    }

    /// Close the browser and release its process.
    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!(error = %e, "browser close error");
        }
        self.handler_task.abort();
    }

    /// Navigate with the primary wait condition; on timeout retry once with
    /// the weaker DOM-ready condition and the same budget.
    async fn navigate(&self, page: &Page, url: &str) -> Result<(), RenderError> {
        let primary = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<(), CdpError>(())
        };

        match timeout(self.config.nav_timeout, primary).await {
            Ok(Ok(())) => {
                // Settle time for late XHR-driven content.
                tokio::time::sleep(self.config.settle).await;
                return Ok(());
            }
            Ok(Err(e)) => {
                return Err(RenderError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                tracing::debug!(url = %url, "full load timed out, retrying with DOM-ready wait");
            }
        }

        let fallback = async { page.goto(url).await.map(|_| ()) };
        match timeout(self.config.nav_timeout, fallback).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(RenderError::Timeout {
                url: url.to_string(),
            }),
        }
    }

    async fn eval<T: serde::de::DeserializeOwned>(
        &self,
        page: &Page,
        url: &str,
        js: &str,
    ) -> Result<T, RenderError> {
        page.evaluate(js)
            .await
            .map_err(|e| RenderError::Evaluation {
                url: url.to_string(),
                message: e.to_string(),
            })?
            .into_value()
            .map_err(|e| RenderError::Evaluation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    async fn render_on(&self, page: &Page, url: &str) -> Result<RenderedPage, RenderError> {
        self.navigate(page, url).await?;

        self.eval::<bool>(page, url, STRIP_CHROME_JS).await?;

        // Probe content containers in priority order; accept the first
        // candidate whose stripped text clears the length threshold.
        let mut text = String::new();
        for selector in CONTENT_SELECTORS {
            let candidate: String = match self.eval(page, url, &candidate_text_js(selector)).await {
                Ok(t) => t,
                Err(e) => {
                    tracing::debug!(url = %url, selector = %selector, error = %e, "selector probe failed");
                    continue;
                }
            };
            if candidate.trim().len() > self.config.min_content_len {
                text = candidate;
                break;
            }
        }

        if text.trim().is_empty() {
            text = self
                .eval::<String>(page, url, BODY_TEXT_JS)
                .await
                .unwrap_or_default();
        }

        let title = page
            .get_title()
            .await
            .ok()
            .flatten()
            .unwrap_or_default()
            .trim()
            .to_string();

        // Anchor-extraction failure means "no links found", not a render error.
        let links: Vec<String> = self
            .eval(page, url, COLLECT_LINKS_JS)
            .await
            .unwrap_or_default();

        let excerpt = compose_excerpt(&text, &self.filter, self.config.max_excerpt_len);

        if excerpt.is_empty() {
            tracing::debug!(url = %url, text_len = text.len(), "page yielded no usable excerpt");
        } else {
            tracing::debug!(url = %url, excerpt_len = excerpt.len(), links = links.len(), "page collected");
        }

        Ok(RenderedPage {
            title,
            excerpt,
            links,
        })
    }
}

#[async_trait]
impl Renderer for BrowserRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage, RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let result = self.render_on(&page, url).await;

        if let Err(e) = page.close().await {
            tracing::debug!(url = %url, error = %e, "page close error (tab leak)");
        }

        result
    }
}

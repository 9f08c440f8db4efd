//! Page rendering seam.
//!
//! The walker talks to a [`Renderer`] trait so crawl logic can be tested
//! against scripted pages; the production implementation drives a headless
//! browser (see [`crate::browser`]).

use async_trait::async_trait;

use crate::boilerplate::BoilerplateFilter;
use crate::error::RenderError;

/// A rendered page: title, bounded plain-text excerpt, and the absolute
/// links found in the rendered DOM.
#[derive(Debug, Clone, Default)]
pub struct RenderedPage {
    pub title: String,
    pub excerpt: String,
    pub links: Vec<String>,
}

/// Renders a URL into text and discovered links.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<RenderedPage, RenderError>;
}

/// Collapse all whitespace runs (newlines, tabs, repeats) to single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        text.chars().take(max).collect()
    }
}

/// Turn raw extracted page text into the final excerpt: collapse whitespace,
/// suppress boilerplate, truncate.
///
/// Returns an empty string for boilerplate pages ("rendered but
/// content-free", distinct from a render error).
pub fn compose_excerpt(raw_text: &str, filter: &BoilerplateFilter, max_len: usize) -> String {
    let text = collapse_whitespace(raw_text);

    let matched = filter.matches(&text);
    if !matched.is_empty() {
        tracing::debug!(phrases = ?matched, "boilerplate page suppressed");
        return String::new();
    }

    truncate_chars(&text, max_len)
}

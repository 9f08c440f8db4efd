//! Mock implementations for testing crawl and pipeline logic without a
//! browser or a live model.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::boilerplate::BoilerplateFilter;
use crate::error::{CompletionError, RenderError};
use crate::llm::TextCompleter;
use crate::render::{compose_excerpt, Renderer, RenderedPage};

/// Scripted page content served by [`MockRenderer`].
#[derive(Debug, Clone)]
struct ScriptedPage {
    title: String,
    raw_text: String,
    links: Vec<String>,
}

/// A renderer backed by scripted pages.
///
/// Runs raw text through the same excerpt composition as the browser
/// renderer (whitespace collapse, boilerplate suppression, truncation), so
/// walker tests exercise the real filtering path.
pub struct MockRenderer {
    pages: RwLock<HashMap<String, ScriptedPage>>,
    failures: RwLock<HashMap<String, String>>,
    rendered: Arc<RwLock<Vec<String>>>,
    max_excerpt_len: usize,
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            pages: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashMap::new()),
            rendered: Arc::new(RwLock::new(Vec::new())),
            max_excerpt_len: 1500,
        }
    }

    /// Script a page: title, raw text (pre-filter), and discovered links.
    pub fn with_page(
        self,
        url: impl Into<String>,
        title: impl Into<String>,
        raw_text: impl Into<String>,
        links: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.pages.write().unwrap().insert(
            url.into(),
            ScriptedPage {
                title: title.into(),
                raw_text: raw_text.into(),
                links: links.into_iter().map(|l| l.into()).collect(),
            },
        );
        self
    }

    /// Script a render failure for a URL.
    pub fn with_failure(self, url: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(url.into(), message.into());
        self
    }

    /// Override the excerpt cap.
    pub fn with_max_excerpt_len(mut self, len: usize) -> Self {
        self.max_excerpt_len = len;
        self
    }

    /// URLs rendered so far, in order.
    pub fn rendered(&self) -> Vec<String> {
        self.rendered.read().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for MockRenderer {
    async fn render(&self, url: &str) -> Result<RenderedPage, RenderError> {
        self.rendered.write().unwrap().push(url.to_string());

        if let Some(message) = self.failures.read().unwrap().get(url) {
            return Err(RenderError::Navigation {
                url: url.to_string(),
                message: message.clone(),
            });
        }

        let page = self.pages.read().unwrap().get(url).cloned().ok_or_else(|| {
            RenderError::Navigation {
                url: url.to_string(),
                message: "no scripted page".to_string(),
            }
        })?;

        let filter = BoilerplateFilter::new();
        Ok(RenderedPage {
            title: page.title,
            excerpt: compose_excerpt(&page.raw_text, &filter, self.max_excerpt_len),
            links: page.links,
        })
    }
}

/// A completer returning canned responses, matched by prompt substring.
///
/// The first configured marker found in the prompt wins; unmatched prompts
/// get the default response.
#[derive(Default)]
pub struct MockCompleter {
    responses: RwLock<Vec<(String, String)>>,
    failures: RwLock<Vec<String>>,
    default_response: RwLock<String>,
    prompts: Arc<RwLock<Vec<String>>>,
}

impl MockCompleter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond with `response` to any prompt containing `marker`.
    pub fn with_response(self, marker: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .push((marker.into(), response.into()));
        self
    }

    /// Fail any prompt containing `marker`.
    pub fn with_failure(self, marker: impl Into<String>) -> Self {
        self.failures.write().unwrap().push(marker.into());
        self
    }

    /// Response for prompts no marker matches.
    pub fn with_default(self, response: impl Into<String>) -> Self {
        *self.default_response.write().unwrap() = response.into();
        self
    }

    /// All prompts seen, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }
}

#[async_trait]
impl TextCompleter for MockCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.write().unwrap().push(prompt.to_string());

        if self
            .failures
            .read()
            .unwrap()
            .iter()
            .any(|marker| prompt.contains(marker.as_str()))
        {
            return Err(CompletionError::EmptyResponse);
        }

        for (marker, response) in self.responses.read().unwrap().iter() {
            if prompt.contains(marker.as_str()) {
                return Ok(response.clone());
            }
        }

        Ok(self.default_response.read().unwrap().clone())
    }
}

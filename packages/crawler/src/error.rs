//! Typed errors for the crawler library.
//!
//! Uses `thiserror` for library errors (the server binary wraps these with
//! `anyhow`). Render and completion failures are record-level: they are
//! attached to the affected record and never abort a batch.

use thiserror::Error;

/// Errors that abort a whole crawl invocation.
///
/// Per-page failures are not represented here; they become error records in
/// the crawl report.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// The seed URL could not be parsed.
    #[error("invalid seed URL {url}: {source}")]
    InvalidSeed {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The browser could not be launched or configured.
    #[error("browser setup failed: {0}")]
    Browser(String),
}

/// Errors rendering a single page.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Navigation failed outright (connection refused, bad TLS, ...).
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// Navigation timed out even under the relaxed wait condition.
    #[error("navigation to {url} timed out")]
    Timeout { url: String },

    /// In-page script evaluation failed.
    #[error("script evaluation failed on {url}: {message}")]
    Evaluation { url: String, message: String },
}

/// Errors from the text-completion capability.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("completion response carried no text")]
    EmptyResponse,
}

/// Errors persisting enriched records.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

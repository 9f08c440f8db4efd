//! Core data types for the crawl/filter/classify pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A pending unit of crawl work: a URL plus its traversal distance from the
/// seed. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    pub url: String,
    pub depth: usize,
}

impl CrawlTarget {
    pub fn new(url: impl Into<String>, depth: usize) -> Self {
        Self {
            url: url.into(),
            depth,
        }
    }
}

/// The output of rendering one page.
///
/// `excerpt` is whitespace-collapsed and truncated; an empty excerpt on a
/// successful render means the page was content-free (boilerplate). Records
/// with `error` set carry no excerpt and are excluded from LLM stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub excerpt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageRecord {
    /// A successfully rendered page (possibly with an empty excerpt).
    pub fn rendered(url: impl Into<String>, title: impl Into<String>, excerpt: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            excerpt: excerpt.into(),
            error: None,
        }
    }

    /// A page whose render failed; still reported, never summarized.
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            excerpt: String::new(),
            error: Some(error.into()),
        }
    }

    /// Whether this record carries text worth sending downstream.
    pub fn has_content(&self) -> bool {
        self.error.is_none() && !self.excerpt.trim().is_empty()
    }
}

/// Why a crawl stopped before draining its queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The hard cap on visited pages was reached.
    PageCap,
    /// The wall-clock deadline elapsed.
    Deadline,
}

/// Best-effort result of one crawl invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub count: usize,
    pub data: Vec<PageRecord>,
    /// Set when the crawl ended on a cap rather than an empty queue. A
    /// normal, reportable terminal state, not an error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub truncated: Option<StopReason>,
    pub crawled_at: DateTime<Utc>,
}

impl CrawlReport {
    pub fn new(data: Vec<PageRecord>, truncated: Option<StopReason>) -> Self {
        Self {
            count: data.len(),
            data,
            truncated,
            crawled_at: Utc::now(),
        }
    }
}

/// Outcome of the semantic verification stage.
///
/// `Unknown` carries the raw model text (truncated) when no definite token
/// could be extracted; it is surfaced, never silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "raw", rename_all = "UPPERCASE")]
pub enum Verdict {
    Valid,
    Invalid,
    Unknown(String),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }
}

/// A record that survived verification and was summarized and categorized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub url: String,
    pub generated_title: String,
    pub summary: String,
    /// Drawn from [`CATEGORY_VOCABULARY`] where possible; free-text entries
    /// are tolerated on fallback. Never empty.
    pub categories: Vec<String>,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub note: String,
}

/// Persisted welfare service entity, keyed by a deterministic identifier so
/// that repeated pipeline runs over the same page converge on one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WelfareService {
    pub service_id: String,
    pub policy_name: String,
    pub link: String,
    pub target_audience: String,
    pub note: String,
    pub details: String,
}

impl WelfareService {
    /// Derive the stable identifier from the canonical link.
    ///
    /// `ws-` plus the first 16 hex chars of sha256(link); fits the legacy
    /// 20-char id column.
    pub fn id_for_link(link: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(link.trim().as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("ws-{}", &digest[..16])
    }

    pub fn from_record(record: &EnrichedRecord) -> Self {
        Self {
            service_id: Self::id_for_link(&record.url),
            policy_name: record.generated_title.clone(),
            link: record.url.clone(),
            target_audience: record.target_audience.clone(),
            note: record.note.clone(),
            details: record.summary.clone(),
        }
    }
}

/// A candidate seed site produced by LLM-backed discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedCandidate {
    #[serde(default)]
    pub foundation: String,
    pub url: String,
}

/// Closed category vocabulary: life-stage, demographic, and topical tags.
pub const CATEGORY_VOCABULARY: &[&str] = &[
    "infancy",
    "childhood",
    "youth",
    "middle-age",
    "elderly",
    "low-income",
    "disability",
    "single-parent",
    "multicultural",
    "housing",
    "education",
    "employment",
    "health",
    "culture",
    CATCH_ALL_CATEGORY,
];

/// Fallback category when nothing in the vocabulary matches.
pub const CATCH_ALL_CATEGORY: &str = "other";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_id_is_deterministic() {
        let a = WelfareService::id_for_link("https://example.org/apply");
        let b = WelfareService::id_for_link("https://example.org/apply");
        assert_eq!(a, b);
        assert_ne!(a, WelfareService::id_for_link("https://example.org/other"));
    }

    #[test]
    fn test_service_id_fits_legacy_column() {
        let id = WelfareService::id_for_link("https://example.org/apply");
        assert!(id.len() <= 20);
        assert!(id.starts_with("ws-"));
    }

    #[test]
    fn test_has_content() {
        assert!(PageRecord::rendered("u", "t", "some text").has_content());
        assert!(!PageRecord::rendered("u", "t", "   ").has_content());
        assert!(!PageRecord::failed("u", "boom").has_content());
    }

    #[test]
    fn test_error_field_omitted_when_none() {
        let json = serde_json::to_string(&PageRecord::rendered("u", "t", "x")).unwrap();
        assert!(!json.contains("error"));
    }
}
